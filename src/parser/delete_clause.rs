//! `DELETE` / `DETACH DELETE`, grounded on the teacher's
//! `open_cypher_parser::*_clause` split style (no direct teacher
//! counterpart; `DELETE` is write-clause grammar supplemented from
//! `original_source/` per SPEC_FULL.md §3).

use crate::ast::DeleteClause;
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;

pub fn parse_delete_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<DeleteClause<'a>, ParseError> {
    let pos = cursor.position();
    let detach = cursor.eat_keyword(Keyword::Detach);
    cursor.expect_keyword(Keyword::Delete)?;
    let mut targets = vec![parse_expression(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        targets.push(parse_expression(cursor)?);
    }
    Ok(DeleteClause { detach, targets, pos })
}
