//! `MERGE ... ON CREATE SET ... ON MATCH SET ...`. Not present in the
//! teacher's grammar at all (supplemented from `original_source/` per
//! SPEC_FULL.md §3); modeled after the teacher's `create_clause` for
//! the pattern half and `set_clause` (above) for the `ON ...` half.

use crate::ast::{MergeClause, SetClause, SetItem};
use crate::errors::ParseError;
use crate::lexer::Keyword;
use crate::parser::common::Cursor;
use crate::parser::match_clause::parse_named_pattern;
use crate::parser::set_clause::parse_set_assignments;

pub fn parse_merge_clause<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<MergeClause<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Merge)?;
    let pattern = parse_named_pattern(cursor)?;

    let mut on_create: Option<SetClause> = None;
    let mut on_match: Option<SetClause> = None;

    while cursor.at_keyword(Keyword::On) {
        let on_pos = cursor.position();
        cursor.advance();
        if cursor.eat_keyword(Keyword::Create) {
            cursor.expect_keyword(Keyword::Set)?;
            let assignments = parse_set_assignments(cursor)?;
            merge_set_clause(&mut on_create, assignments, on_pos);
        } else {
            cursor.expect_keyword(Keyword::Match)?;
            cursor.expect_keyword(Keyword::Set)?;
            let assignments = parse_set_assignments(cursor)?;
            merge_set_clause(&mut on_match, assignments, on_pos);
        }
    }

    Ok(MergeClause { pattern, on_create, on_match, pos })
}

/// Real Cypher permits repeated `ON CREATE SET`/`ON MATCH SET`
/// clauses; since the AST keeps only one `SetClause` per branch,
/// repeats are folded together in source order.
fn merge_set_clause<'a>(
    slot: &mut Option<SetClause<'a>>,
    mut assignments: Vec<SetItem<'a>>,
    pos: crate::position::Position,
) {
    match slot {
        Some(existing) => existing.assignments.append(&mut assignments),
        None => *slot = Some(SetClause { assignments, pos }),
    }
}
