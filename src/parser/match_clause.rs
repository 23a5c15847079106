//! `MATCH` / `OPTIONAL MATCH`, grounded on the teacher's
//! `open_cypher_parser::match_clause` and `optional_match_clause`
//! (merged into one parser here since the two differ only in the
//! leading `OPTIONAL` keyword).

use crate::ast::MatchClause;
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;
use crate::parser::pattern::parse_pattern;

pub fn parse_match_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<MatchClause<'a>, ParseError> {
    let pos = cursor.position();
    let optional = cursor.eat_keyword(Keyword::Optional);
    cursor.expect_keyword(Keyword::Match)?;

    let mut patterns = vec![parse_named_pattern(cursor)?];
    while cursor.eat(&TokenKind::Comma) {
        patterns.push(parse_named_pattern(cursor)?);
    }

    let where_clause = if cursor.eat_keyword(Keyword::Where) {
        let where_pos = cursor.position();
        Some(crate::ast::WhereClause { condition: parse_expression(cursor)?, pos: where_pos })
    } else {
        None
    };

    Ok(MatchClause { optional, patterns, where_clause, pos })
}

/// A pattern optionally bound to a path variable: `p = (a)-->(b)`.
pub fn parse_named_pattern<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
) -> Result<crate::ast::Pattern<'a>, ParseError> {
    if let TokenKind::Identifier(name) = cursor.peek_kind() {
        let name = *name;
        if matches!(cursor.peek_at(1).kind, TokenKind::Eq) {
            cursor.advance();
            cursor.advance();
            let mut pattern = parse_pattern(cursor)?;
            pattern.path_var = Some(name);
            return Ok(pattern);
        }
    }
    parse_pattern(cursor)
}
