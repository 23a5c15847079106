//! The two disjoint error taxonomies: [`ParseError`] (raised, fail-fast)
//! and [`ValidationError`] (collected, one pass surfaces as many as
//! possible). Grounded on the teacher's `graph_catalog/errors.rs`
//! `GraphSchemaError`: a flat `thiserror`-derived enum, `Clone +
//! PartialEq` so tests can assert on error shape directly, with the
//! operational detail (what, where) folded into the `#[error(...)]`
//! message rather than a side-channel context object.

use crate::position::Position;
use thiserror::Error;

/// Errors raised while parsing; parsing is non-recovering, so only one
/// of these is ever produced per `validate`/`check_syntax` call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("NomParsingError: {message} at {pos}")]
    NomParsingError { message: String, pos: Position },

    #[error("UnexpectedEndOfInput: expected {expected} at {pos}")]
    UnexpectedEndOfInput { expected: String, pos: Position },

    #[error("ExpectedToken: expected {expected}, found {found} at {pos}")]
    ExpectedToken { expected: String, found: String, pos: Position },

    #[error("InvalidSyntax: {message} at {pos}")]
    InvalidSyntax { message: String, pos: Position },

    #[error("ParsingUndefinedVariable: `{name}` is not defined at {pos}")]
    ParsingUndefinedVariable { name: String, pos: Position },

    #[error("MissingRequiredClause: {message} at {pos}")]
    MissingRequiredClause { message: String, pos: Position },

    #[error("InvalidClauseOrder: {message} at {pos}")]
    InvalidClauseOrder { message: String, pos: Position },

    #[error("WhereBeforeMatch: WHERE cannot appear before any MATCH at {pos}")]
    WhereBeforeMatch { pos: Position },

    #[error("ReturnAfterReturn: a query can have only one RETURN clause at {pos}")]
    ReturnAfterReturn { pos: Position },

    #[error("OrderByBeforeReturn: ORDER BY must follow RETURN or WITH at {pos}")]
    OrderByBeforeReturn { pos: Position },

    #[error("SkipBeforeReturn: SKIP must follow RETURN or WITH at {pos}")]
    SkipBeforeReturn { pos: Position },

    #[error("LimitBeforeReturn: LIMIT must follow RETURN or WITH at {pos}")]
    LimitBeforeReturn { pos: Position },

    #[error("ReturnBeforeOtherClauses: RETURN must be the last clause at {pos}")]
    ReturnBeforeOtherClauses { pos: Position },

    #[error("MatchAfterReturn: MATCH cannot follow RETURN at {pos}")]
    MatchAfterReturn { pos: Position },

    #[error("CreateAfterReturn: CREATE cannot follow RETURN at {pos}")]
    CreateAfterReturn { pos: Position },

    #[error("MergeAfterReturn: MERGE cannot follow RETURN at {pos}")]
    MergeAfterReturn { pos: Position },

    #[error("DeleteAfterReturn: DELETE cannot follow RETURN at {pos}")]
    DeleteAfterReturn { pos: Position },

    #[error("SetAfterReturn: SET cannot follow RETURN at {pos}")]
    SetAfterReturn { pos: Position },

    #[error("WhereAfterReturn: WHERE cannot follow RETURN at {pos}")]
    WhereAfterReturn { pos: Position },

    #[error("WithAfterReturn: WITH cannot follow RETURN at {pos}")]
    WithAfterReturn { pos: Position },

    #[error("UnwindAfterReturn: UNWIND cannot follow RETURN at {pos}")]
    UnwindAfterReturn { pos: Position },

    #[error("InvalidPattern: {message} at {pos}")]
    InvalidPattern { message: String, pos: Position },

    #[error("InvalidWhereCondition: {message} at {pos}")]
    InvalidWhereCondition { message: String, pos: Position },

    #[error("InvalidExpression: {message} at {pos}")]
    InvalidExpression { message: String, pos: Position },

    /// A construct the grammar recognizes the shape of but does not
    /// validate or execute (e.g. `CALL db.labels()`). Per spec.md §1,
    /// these must be reported rather than silently accepted.
    #[error("UnsupportedConstruct: {message} at {pos}")]
    UnsupportedConstruct { message: String, pos: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::NomParsingError { pos, .. }
            | ParseError::UnexpectedEndOfInput { pos, .. }
            | ParseError::ExpectedToken { pos, .. }
            | ParseError::InvalidSyntax { pos, .. }
            | ParseError::ParsingUndefinedVariable { pos, .. }
            | ParseError::MissingRequiredClause { pos, .. }
            | ParseError::InvalidClauseOrder { pos, .. }
            | ParseError::WhereBeforeMatch { pos }
            | ParseError::ReturnAfterReturn { pos }
            | ParseError::OrderByBeforeReturn { pos }
            | ParseError::SkipBeforeReturn { pos }
            | ParseError::LimitBeforeReturn { pos }
            | ParseError::ReturnBeforeOtherClauses { pos }
            | ParseError::MatchAfterReturn { pos }
            | ParseError::CreateAfterReturn { pos }
            | ParseError::MergeAfterReturn { pos }
            | ParseError::DeleteAfterReturn { pos }
            | ParseError::SetAfterReturn { pos }
            | ParseError::WhereAfterReturn { pos }
            | ParseError::WithAfterReturn { pos }
            | ParseError::UnwindAfterReturn { pos }
            | ParseError::InvalidPattern { pos, .. }
            | ParseError::InvalidWhereCondition { pos, .. }
            | ParseError::InvalidExpression { pos, .. }
            | ParseError::UnsupportedConstruct { pos, .. } => *pos,
        }
    }
}

/// Errors accumulated by the semantic validator. Never raised: a
/// validation pass always runs to completion and returns as many of
/// these as it found.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("InvalidNodeLabel: label `{label}` is not declared in the schema at {pos}")]
    InvalidNodeLabel { label: String, pos: Position },

    #[error("InvalidRelationshipType: relationship type `{rel_type}` is not declared in the schema at {pos}")]
    InvalidRelationshipType { rel_type: String, pos: Position },

    #[error("InvalidNodeProperty: property `{property}` is not declared on label `{label}` at {pos}")]
    InvalidNodeProperty { label: String, property: String, pos: Position },

    #[error("InvalidRelationshipProperty: property `{property}` is not declared on relationship type `{rel_type}` at {pos}")]
    InvalidRelationshipProperty { rel_type: String, property: String, pos: Position },

    #[error("InvalidPropertyAccess: `{variable}.{property}` does not match any label/type bound to `{variable}` at {pos}")]
    InvalidPropertyAccess { variable: String, property: String, pos: Position },

    #[error("InvalidPropertyType: property `{property}` expects {expected}, found {found} at {pos}")]
    InvalidPropertyType { property: String, expected: String, found: String, pos: Position },

    #[error("InvalidRelationshipDirection: relationship type `{rel_type}` is not valid between `{start_label}` and `{end_label}` in the given direction at {pos}")]
    InvalidRelationshipDirection {
        rel_type: String,
        start_label: String,
        end_label: String,
        pos: Position,
    },

    #[error("UndefinedVariable: `{name}` is not bound in the current scope at {pos}")]
    UndefinedVariable { name: String, pos: Position },
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidNodeLabel { .. } => "InvalidNodeLabel",
            ValidationError::InvalidRelationshipType { .. } => "InvalidRelationshipType",
            ValidationError::InvalidNodeProperty { .. } => "InvalidNodeProperty",
            ValidationError::InvalidRelationshipProperty { .. } => "InvalidRelationshipProperty",
            ValidationError::InvalidPropertyAccess { .. } => "InvalidPropertyAccess",
            ValidationError::InvalidPropertyType { .. } => "InvalidPropertyType",
            ValidationError::InvalidRelationshipDirection { .. } => "InvalidRelationshipDirection",
            ValidationError::UndefinedVariable { .. } => "UndefinedVariable",
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ValidationError::InvalidNodeLabel { pos, .. }
            | ValidationError::InvalidRelationshipType { pos, .. }
            | ValidationError::InvalidNodeProperty { pos, .. }
            | ValidationError::InvalidRelationshipProperty { pos, .. }
            | ValidationError::InvalidPropertyAccess { pos, .. }
            | ValidationError::InvalidPropertyType { pos, .. }
            | ValidationError::InvalidRelationshipDirection { pos, .. }
            | ValidationError::UndefinedVariable { pos, .. } => *pos,
        }
    }
}

/// Errors raised while constructing a [`crate::schema::Schema`] from a
/// dictionary that fails the invariants in spec.md §3.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unknown neo4j_type `{type_name}` for property `{property}` on `{owner}`")]
    UnknownPropertyType { owner: String, property: String, type_name: String },

    #[error("duplicate property `{property}` declared twice on `{owner}`")]
    DuplicateProperty { owner: String, property: String },

    #[error("malformed schema dictionary: {message}")]
    Malformed { message: String },
}
