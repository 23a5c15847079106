//! `SET` and `REMOVE`, grounded on the teacher's
//! `open_cypher_parser::*_clause` family; `REMOVE` has no direct
//! counterpart in the teacher (which has no write-clause support) and
//! is modeled after `SET`'s label/property split instead.

use crate::ast::{RemoveClause, RemoveItem, SetClause, SetItem};
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;

pub fn parse_set_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<SetClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Set)?;
    let assignments = parse_set_assignments(cursor)?;
    Ok(SetClause { assignments, pos })
}

/// The comma-separated assignment list shared by `SET` and
/// `MERGE ... ON CREATE/ON MATCH SET`.
pub fn parse_set_assignments<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Vec<SetItem<'a>>, ParseError> {
    let mut items = vec![parse_set_item(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        items.push(parse_set_item(cursor)?);
    }
    Ok(items)
}

fn parse_set_item<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<SetItem<'a>, ParseError> {
    let (variable, _) = cursor.expect_identifier()?;
    if cursor.eat(&TokenKind::Colon) {
        let (first, _) = cursor.expect_identifier()?;
        let mut labels = vec![first];
        while cursor.eat(&TokenKind::Colon) {
            let (next, _) = cursor.expect_identifier()?;
            labels.push(next);
        }
        return Ok(SetItem::Label { variable, labels });
    }
    cursor.expect(TokenKind::Dot)?;
    let (property, _) = cursor.expect_identifier()?;
    cursor.expect(TokenKind::Eq)?;
    let value = parse_expression(cursor)?;
    Ok(SetItem::Property { variable, property, value })
}

pub fn parse_remove_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<RemoveClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Remove)?;
    let mut items = vec![parse_remove_item(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        items.push(parse_remove_item(cursor)?);
    }
    Ok(RemoveClause { items, pos })
}

fn parse_remove_item<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<RemoveItem<'a>, ParseError> {
    let (variable, _) = cursor.expect_identifier()?;
    if cursor.eat(&TokenKind::Colon) {
        let (first, _) = cursor.expect_identifier()?;
        let mut labels = vec![first];
        while cursor.eat(&TokenKind::Colon) {
            let (next, _) = cursor.expect_identifier()?;
            labels.push(next);
        }
        return Ok(RemoveItem::Label { variable, labels });
    }
    cursor.expect(TokenKind::Dot)?;
    let (property, _) = cursor.expect_identifier()?;
    Ok(RemoveItem::Property { variable, property })
}
