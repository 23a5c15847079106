//! `UNWIND expr AS alias`, grounded on the teacher's
//! `open_cypher_parser::unwind_clause`.

use crate::ast::UnwindClause;
use crate::errors::ParseError;
use crate::lexer::Keyword;
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;

pub fn parse_unwind_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<UnwindClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Unwind)?;
    let expr = parse_expression(cursor)?;
    cursor.expect_keyword(Keyword::As)?;
    let (alias, _) = cursor.expect_identifier()?;
    Ok(UnwindClause { expr, alias, pos })
}
