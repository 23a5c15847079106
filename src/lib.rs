//! Static syntax and schema validation for Cypher-compatible graph
//! queries: a hand-written lexer and parser produce a typed AST, which
//! a semantic validator then checks against a [`Schema`] description.
//!
//! Grounded on the teacher's `open_cypher_parser`/`graph_catalog` split
//! (parse once, validate separately against a schema object) and its
//! crate-root re-export style (`pub use` the public surface from
//! `lib.rs` rather than making callers reach into submodules).
//!
//! This crate performs no I/O and holds no state across calls: every
//! entry point is a pure function of its arguments.

pub mod ast;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod schema;
pub mod validator;

pub use config::ValidatorConfig;
pub use errors::{ParseError, SchemaError, ValidationError};
pub use schema::Schema;

/// Parses and validates `query` against `schema`, using
/// [`ValidatorConfig::default`]. Returns the full list of semantic
/// errors found; an empty list means the query is valid. A syntax
/// error short-circuits validation entirely and is raised rather than
/// collected, since a malformed query has no AST to walk.
pub fn validate(query: &str, schema: &Schema) -> Result<Vec<ValidationError>, ParseError> {
    validate_with_config(query, schema, &ValidatorConfig::default())
}

/// Same as [`validate`], but with an explicit [`ValidatorConfig`] for
/// callers that need to raise or lower the relationship-chain/
/// expression-depth bounds.
pub fn validate_with_config(
    query: &str,
    schema: &Schema,
    config: &ValidatorConfig,
) -> Result<Vec<ValidationError>, ParseError> {
    log::debug!("parsing query ({} bytes)", query.len());
    let ast = parser::parse(query)?;
    let errors = validator::validate_query(&ast, schema, config);
    if errors.is_empty() {
        log::debug!("query validated with no errors");
    } else {
        log::debug!("query validated with {} error(s)", errors.len());
    }
    Ok(errors)
}

/// Parses `query` and reports only whether it is syntactically valid,
/// without running the semantic validator.
pub fn check_syntax(query: &str) -> Result<(), ParseError> {
    parser::parse(query).map(|_| ())
}

/// `true` if `query` fails to parse. Never raises.
pub fn has_parser_errors(query: &str) -> bool {
    check_syntax(query).is_err()
}

/// `true` if `query` contains no write clause (`CREATE`, `MERGE`,
/// `SET`, `DELETE`) — i.e. it only reads. A query that fails to parse
/// is reported as write, the conservative answer.
pub fn is_read(query: &str) -> bool {
    !is_write(query)
}

/// `true` if `query` contains at least one write clause (`CREATE`,
/// `MERGE`, `SET`, `DELETE`), or fails to parse (the conservative
/// answer for a caller deciding whether a query is safe to run against
/// a read replica).
pub fn is_write(query: &str) -> bool {
    let Ok(ast) = parser::parse(query) else {
        return true;
    };
    ast.clauses.iter().any(|clause| {
        matches!(
            clause,
            ast::Clause::Create(_) | ast::Clause::Merge(_) | ast::Clause::Set(_) | ast::Clause::Delete(_)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_syntax_accepts_well_formed_query() {
        assert!(check_syntax("MATCH (n:Person) RETURN n.name").is_ok());
    }

    #[test]
    fn check_syntax_rejects_garbage() {
        assert!(check_syntax("RETURN MATCH (((").is_err());
    }

    #[test]
    fn has_parser_errors_matches_check_syntax() {
        assert!(!has_parser_errors("MATCH (n) RETURN n"));
        assert!(has_parser_errors("MATCH RETURN"));
    }

    #[test]
    fn is_write_detects_create() {
        assert!(is_write("CREATE (n:Person {name: 'Ann'})"));
        assert!(is_read("MATCH (n:Person) RETURN n"));
    }

    #[test]
    fn is_write_is_conservative_on_parse_failure() {
        assert!(is_write("not a query"));
        assert!(!is_read("not a query"));
    }

    #[test]
    fn validate_reports_empty_errors_for_valid_query() {
        let mut builder = Schema::builder();
        builder
            .add_node_property("Person", schema::Property::new("name", schema::Neo4jType::String))
            .unwrap();
        let schema = builder.build();
        let errors = validate("MATCH (n:Person) RETURN n.name", &schema).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn validate_reports_unknown_label() {
        let schema = Schema::builder().build();
        let errors = validate("MATCH (n:Ghost) RETURN n", &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), "InvalidNodeLabel");
    }
}
