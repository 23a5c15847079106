//! End-to-end tests: full query text through `validate`/`check_syntax`
//! against a shared schema, covering every representative scenario this
//! crate is required to get right.

use cypher_guard::schema::{Neo4jType, Property, Schema};
use cypher_guard::{check_syntax, validate, ParseError};

/// Person{name:STRING, age:INTEGER, created:BOOLEAN},
/// Movie{title:STRING, year:INTEGER},
/// KNOWS{since:DATE_TIME}: Person->Person,
/// ACTED_IN{role:STRING}: Person->Movie.
fn social_graph_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_node_property("Person", Property::new("name", Neo4jType::String)).unwrap();
    builder.add_node_property("Person", Property::new("age", Neo4jType::Integer)).unwrap();
    builder.add_node_property("Person", Property::new("created", Neo4jType::Boolean)).unwrap();
    builder.add_node_property("Movie", Property::new("title", Neo4jType::String)).unwrap();
    builder.add_node_property("Movie", Property::new("year", Neo4jType::Integer)).unwrap();
    builder.add_rel_property("KNOWS", Property::new("since", Neo4jType::DateTime)).unwrap();
    builder.add_rel_property("ACTED_IN", Property::new("role", Neo4jType::String)).unwrap();
    builder.add_relationship("Person", "KNOWS", "Person");
    builder.add_relationship("Person", "ACTED_IN", "Movie");
    builder.build()
}

#[test]
fn scenario_1_valid_match_returns_no_errors() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:Person)-[r:KNOWS]->(b:Person) RETURN a.name, r.since", &schema).unwrap();
    assert_eq!(errors, vec![]);
}

#[test]
fn scenario_2_unknown_property_is_invalid_property_access() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:Person) RETURN a.height", &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "InvalidPropertyAccess");
}

#[test]
fn scenario_3_unknown_relationship_type() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:Person)-[r:FOLLOWS]->(b:Person) RETURN a.name", &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "InvalidRelationshipType");
}

#[test]
fn scenario_4_unknown_node_label() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:User) RETURN a.name", &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "InvalidNodeLabel");
}

#[test]
fn scenario_5_string_literal_against_integer_property() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:Person) WHERE a.age = '30' RETURN a.name", &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "InvalidPropertyType");
}

#[test]
fn scenario_6_relationship_direction_mismatch() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:Person)<-[r:ACTED_IN]-(b:Movie) RETURN a.name", &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "InvalidRelationshipDirection");
}

#[test]
fn scenario_7_return_before_other_clauses() {
    let err = check_syntax("RETURN n MATCH (n:Person)").unwrap_err();
    assert!(matches!(err, ParseError::ReturnBeforeOtherClauses { .. }));
}

#[test]
fn scenario_8_where_after_return_is_invalid_clause_order() {
    let err = check_syntax("MATCH (n:Person) RETURN n WHERE n.age > 30").unwrap_err();
    assert!(matches!(err, ParseError::InvalidClauseOrder { .. }));
}

#[test]
fn scenario_9_quantified_path_pattern_binds_into_enclosing_scope() {
    let schema = social_graph_schema();
    let errors =
        validate("MATCH ((a:Person)-[r:KNOWS]->(b:Person)){2,4} RETURN a.name, b.name", &schema).unwrap();
    assert_eq!(errors, vec![]);
}

#[test]
fn scenario_10_context_aware_rebinding_flags_only_the_mismatched_property() {
    let schema = social_graph_schema();
    let query = "MATCH (a:Person)-[r:KNOWS]->(b:Person) WITH a,r,b \
                 MATCH (b)-[r2:ACTED_IN]->(m:Movie) \
                 WHERE r.role='friend' AND r2.role='actor' RETURN a.name";
    let errors = validate(query, &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "InvalidPropertyAccess");
    let message = errors[0].to_string();
    assert!(message.contains("r.role"), "expected the error on `r.role`, got: {message}");
}

#[test]
fn clause_order_errors_dominate_over_generic_parse_errors() {
    // Token-malformed *and* clause-order-invalid: the RETURN-then-MATCH
    // ordering is wrong regardless of what garbage trails it.
    let err = check_syntax("RETURN n MATCH (((").unwrap_err();
    assert!(matches!(err, ParseError::ReturnBeforeOtherClauses { .. }));
}

#[test]
fn validate_is_deterministic_and_idempotent() {
    let schema = social_graph_schema();
    let query = "MATCH (a:Person)-[r:KNOWS]->(b:Person) RETURN a.name, r.since";
    let first = validate(query, &schema).unwrap();
    let second = validate(query, &schema).unwrap();
    assert_eq!(first, second);
}

#[test]
fn undeclared_variable_in_where_is_reported() {
    let schema = social_graph_schema();
    let errors = validate("MATCH (a:Person) WHERE ghost.age > 10 RETURN a.name", &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "UndefinedVariable");
}
