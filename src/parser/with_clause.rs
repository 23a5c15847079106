//! `WITH`, grounded on the teacher's `open_cypher_parser::with_clause`.
//! Shares the projection-list grammar with `RETURN`
//! (`parser::return_clause::parse_projections`).

use crate::ast::WithClause;
use crate::errors::ParseError;
use crate::lexer::Keyword;
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;
use crate::parser::order_by_and_page_clause::{
    parse_optional_limit, parse_optional_order_by, parse_optional_skip,
};
use crate::parser::return_clause::parse_projections;

pub fn parse_with_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<WithClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::With)?;
    let distinct = cursor.eat_keyword(Keyword::Distinct);
    let projections = parse_projections(cursor)?;

    let where_clause = if cursor.eat_keyword(Keyword::Where) {
        let where_pos = cursor.position();
        Some(crate::ast::WhereClause { condition: parse_expression(cursor)?, pos: where_pos })
    } else {
        None
    };

    let order_by = parse_optional_order_by(cursor)?;
    let skip = parse_optional_skip(cursor)?;
    let limit = parse_optional_limit(cursor)?;

    Ok(WithClause { distinct, projections, where_clause, order_by, skip, limit, pos })
}
