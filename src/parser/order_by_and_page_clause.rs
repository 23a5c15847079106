//! `ORDER BY` / `SKIP` / `LIMIT`, always parsed as a suffix of the
//! clause that introduces them (`WITH` or `RETURN`). Named after the
//! teacher's `open_cypher_parser::order_by_and_page_clause`, which
//! groups the same three sub-grammars for the same reason: none of
//! them is ever legal as a standalone top-level clause.

use crate::ast::{LimitClause, OrderByClause, OrderByItem, SkipClause};
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;

pub fn parse_optional_order_by<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
) -> Result<Option<OrderByClause<'a>>, ParseError> {
    if !cursor.at_keyword(Keyword::Order) {
        return Ok(None);
    }
    let pos = cursor.position();
    cursor.advance();
    cursor.expect_keyword(Keyword::By)?;
    let mut items = Vec::new();
    loop {
        let expr = parse_expression(cursor)?;
        let descending = eat_sort_direction(cursor);
        items.push(OrderByItem { expr, descending });
        if !cursor.eat(&TokenKind::Comma) {
            break;
        }
    }
    Ok(Some(OrderByClause { items, pos }))
}

/// `ASC(ENDING)`/`DESC(ENDING)` are not reserved words in the grammar,
/// so they lex as plain identifiers; matched case-insensitively here
/// the way the lexer matches every other keyword.
fn eat_sort_direction<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> bool {
    if let TokenKind::Identifier(s) = cursor.peek_kind() {
        let upper = s.to_ascii_uppercase();
        if upper == "DESC" || upper == "DESCENDING" {
            cursor.advance();
            return true;
        }
        if upper == "ASC" || upper == "ASCENDING" {
            cursor.advance();
            return false;
        }
    }
    false
}

pub fn parse_optional_skip<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
) -> Result<Option<SkipClause<'a>>, ParseError> {
    if !cursor.at_keyword(Keyword::Skip) {
        return Ok(None);
    }
    let pos = cursor.position();
    cursor.advance();
    let value = parse_expression(cursor)?;
    Ok(Some(SkipClause { value, pos }))
}

pub fn parse_optional_limit<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
) -> Result<Option<LimitClause<'a>>, ParseError> {
    if !cursor.at_keyword(Keyword::Limit) {
        return Ok(None);
    }
    let pos = cursor.position();
    cursor.advance();
    let value = parse_expression(cursor)?;
    Ok(Some(LimitClause { value, pos }))
}
