//! `RETURN`, grounded on the teacher's
//! `open_cypher_parser::return_clause`. Owns `parse_projections`,
//! shared with `WITH` since both clauses project the same grammar
//! (`expr [AS alias]`, or a bare `*`).

use crate::ast::{Projection, ReturnClause};
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;
use crate::parser::order_by_and_page_clause::{
    parse_optional_limit, parse_optional_order_by, parse_optional_skip,
};

pub fn parse_return_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<ReturnClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Return)?;
    let distinct = cursor.eat_keyword(Keyword::Distinct);
    let projections = parse_projections(cursor)?;
    let order_by = parse_optional_order_by(cursor)?;
    let skip = parse_optional_skip(cursor)?;
    let limit = parse_optional_limit(cursor)?;
    Ok(ReturnClause { distinct, projections, order_by, skip, limit, pos })
}

pub fn parse_projections<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Vec<Projection<'a>>, ParseError> {
    let mut projections = vec![parse_projection_item(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        projections.push(parse_projection_item(cursor)?);
    }
    Ok(projections)
}

fn parse_projection_item<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Projection<'a>, ParseError> {
    let pos = cursor.position();
    if cursor.eat(&TokenKind::Star) {
        return Ok(Projection::Star);
    }
    let expr = parse_expression(cursor)?;
    let alias = if cursor.eat_keyword(Keyword::As) {
        let (name, _) = cursor.expect_identifier()?;
        Some(name)
    } else {
        None
    };
    Ok(Projection::Item { expr, alias, pos })
}
