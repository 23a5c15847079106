//! Top-level parser: sequences clauses and enforces clause order.
//!
//! Grounded on the teacher's `open_cypher_parser::mod` (`parse_query_with_nom`),
//! generalized from the teacher's fixed positional clause sequence (the
//! teacher's grammar never needed to diagnose illegal orderings) into a
//! loop that recognizes each clause by its leading keyword, parses it,
//! and checks its legality against everything already seen.

pub mod common;
pub mod create_clause;
pub mod delete_clause;
pub mod expression;
pub mod match_clause;
pub mod merge_clause;
pub mod order_by_and_page_clause;
pub mod pattern;
pub mod return_clause;
pub mod set_clause;
pub mod unwind_clause;
pub mod with_clause;

use crate::ast::{Clause, Query};
use crate::errors::ParseError;
use crate::lexer::{Keyword, Lexer};
use crate::position::Position;
use common::Cursor;

use create_clause::parse_create_clause;
use delete_clause::parse_delete_clause;
use match_clause::parse_match_clause;
use merge_clause::parse_merge_clause;
use return_clause::parse_return_clause;
use set_clause::{parse_remove_clause, parse_set_clause};
use unwind_clause::parse_unwind_clause;
use with_clause::parse_with_clause;

pub fn parse(source: &str) -> Result<Query<'_>, ParseError> {
    let tokens = Lexer::tokenize(source)?;
    let mut cursor = Cursor::new(&tokens);
    parse_query(&mut cursor)
}

/// Open question (spec.md §9): whether `CREATE`/`MERGE` after `RETURN`
/// should be accepted or rejected. The source parser this spec was
/// distilled from accepts them, so this validator does too: only the
/// clauses spec.md explicitly lists (`MATCH`, `WITH`, `UNWIND`,
/// `DELETE`, `SET`) are rejected after a `RETURN`.
fn parse_query<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Query<'a>, ParseError> {
    let mut clauses = Vec::new();
    let mut seen_match = false;
    let mut seen_return = false;

    while !cursor.is_eof() {
        let pos = cursor.position();

        if cursor.at_keyword(Keyword::Match) || cursor.at_keyword(Keyword::Optional) {
            if seen_return {
                return Err(ParseError::MatchAfterReturn { pos });
            }
            seen_match = true;
            clauses.push(Clause::Match(parse_match_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Create) {
            clauses.push(Clause::Create(parse_create_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Merge) {
            clauses.push(Clause::Merge(parse_merge_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::With) {
            if seen_return {
                return Err(ParseError::WithAfterReturn { pos });
            }
            clauses.push(Clause::With(parse_with_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Unwind) {
            if seen_return {
                return Err(ParseError::UnwindAfterReturn { pos });
            }
            clauses.push(Clause::Unwind(parse_unwind_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Set) {
            if seen_return {
                return Err(ParseError::SetAfterReturn { pos });
            }
            clauses.push(Clause::Set(parse_set_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Remove) {
            clauses.push(Clause::Remove(parse_remove_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Delete) || cursor.at_keyword(Keyword::Detach) {
            if seen_return {
                return Err(ParseError::DeleteAfterReturn { pos });
            }
            clauses.push(Clause::Delete(parse_delete_clause(cursor)?));
        } else if cursor.at_keyword(Keyword::Return) {
            if seen_return {
                return Err(ParseError::ReturnAfterReturn { pos });
            }
            let was_first_clause = clauses.is_empty();
            clauses.push(Clause::Return(parse_return_clause(cursor)?));
            seen_return = true;
            if was_first_clause && !cursor.is_eof() {
                return Err(ParseError::ReturnBeforeOtherClauses { pos: cursor.position() });
            }
        } else if cursor.at_keyword(Keyword::Where) {
            return Err(orphaned_where_error(seen_match, seen_return, pos));
        } else if cursor.at_keyword(Keyword::Order) {
            return Err(if seen_return {
                ParseError::InvalidClauseOrder {
                    message: "ORDER BY must immediately follow RETURN or WITH".to_string(),
                    pos,
                }
            } else {
                ParseError::OrderByBeforeReturn { pos }
            });
        } else if cursor.at_keyword(Keyword::Skip) {
            return Err(if seen_return {
                ParseError::InvalidClauseOrder {
                    message: "SKIP must immediately follow RETURN or WITH".to_string(),
                    pos,
                }
            } else {
                ParseError::SkipBeforeReturn { pos }
            });
        } else if cursor.at_keyword(Keyword::Limit) {
            return Err(if seen_return {
                ParseError::InvalidClauseOrder {
                    message: "LIMIT must immediately follow RETURN or WITH".to_string(),
                    pos,
                }
            } else {
                ParseError::LimitBeforeReturn { pos }
            });
        } else if cursor.at_keyword(Keyword::Call) {
            return Err(ParseError::UnsupportedConstruct {
                message: "CALL subqueries and procedure calls are not validated".to_string(),
                pos,
            });
        } else if cursor.at_keyword(Keyword::Union) {
            return Err(ParseError::UnsupportedConstruct {
                message: "UNION is not validated".to_string(),
                pos,
            });
        } else if cursor.at_keyword(Keyword::Use) {
            return Err(ParseError::UnsupportedConstruct {
                message: "USE graph selection is not validated".to_string(),
                pos,
            });
        } else {
            return Err(ParseError::NomParsingError {
                message: format!("unexpected {} at clause position", cursor.peek_kind()),
                pos,
            });
        }
    }

    if clauses.is_empty() {
        return Err(ParseError::MissingRequiredClause {
            message: "query has no clauses".to_string(),
            pos: Position::start(),
        });
    }

    Ok(Query { clauses })
}

/// A `WHERE` the loop sees as a clause head means the preceding clause
/// didn't swallow it as its own suffix — it's orphaned.
fn orphaned_where_error(seen_match: bool, seen_return: bool, pos: Position) -> ParseError {
    if seen_return {
        ParseError::InvalidClauseOrder {
            message: "WHERE cannot follow RETURN".to_string(),
            pos,
        }
    } else if !seen_match {
        ParseError::WhereBeforeMatch { pos }
    } else {
        ParseError::InvalidClauseOrder {
            message: "WHERE must be attached to MATCH or WITH".to_string(),
            pos,
        }
    }
}
