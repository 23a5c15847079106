//! `CREATE`, grounded on the teacher's `open_cypher_parser::create_clause`.

use crate::ast::CreateClause;
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::match_clause::parse_named_pattern;

pub fn parse_create_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<CreateClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Create)?;
    let mut patterns = vec![parse_named_pattern(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        patterns.push(parse_named_pattern(cursor)?);
    }
    Ok(CreateClause { patterns, pos })
}
