//! Integration tests: full `parse` → `validate_query` pipeline behavior
//! across clause ordering, projection scoping, and pattern binding,
//! exercised through the public crate API rather than by constructing
//! AST nodes by hand.

use cypher_guard::schema::{Neo4jType, Property, Schema};
use cypher_guard::{check_syntax, is_read, is_write, validate, validate_with_config, ParseError, ValidatorConfig};

fn movie_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_node_property("Person", Property::new("name", Neo4jType::String)).unwrap();
    builder.add_node_property("Person", Property::new("age", Neo4jType::Integer)).unwrap();
    builder.add_node_property("Movie", Property::new("title", Neo4jType::String)).unwrap();
    builder.add_rel_property("KNOWS", Property::new("since", Neo4jType::DateTime)).unwrap();
    builder.add_rel_property("ACTED_IN", Property::new("role", Neo4jType::String)).unwrap();
    builder.add_relationship("Person", "KNOWS", "Person");
    builder.add_relationship("Person", "ACTED_IN", "Movie");
    builder.build()
}

mod clause_order_tests {
    use super::*;

    #[test]
    fn where_before_any_match_is_rejected() {
        let err = check_syntax("WHERE true RETURN 1").unwrap_err();
        assert!(matches!(err, ParseError::WhereBeforeMatch { .. }));
    }

    #[test]
    fn match_after_return_is_rejected() {
        let err = check_syntax("MATCH (n:Person) RETURN n MATCH (m:Movie) RETURN m").unwrap_err();
        assert!(matches!(err, ParseError::MatchAfterReturn { .. }));
    }

    #[test]
    fn order_by_before_return_is_rejected() {
        let err = check_syntax("ORDER BY n.name MATCH (n:Person) RETURN n").unwrap_err();
        assert!(matches!(err, ParseError::OrderByBeforeReturn { .. }));
    }

    #[test]
    fn second_return_is_rejected() {
        let err = check_syntax("MATCH (n:Person) RETURN n RETURN n").unwrap_err();
        assert!(matches!(err, ParseError::ReturnAfterReturn { .. }));
    }

    #[test]
    fn create_after_return_is_accepted_per_resolved_open_question() {
        // DESIGN.md: CREATE/MERGE after RETURN are accepted, unlike
        // MATCH/WITH/UNWIND/DELETE/SET.
        assert!(check_syntax("MATCH (n:Person) RETURN n CREATE (m:Movie {title: 'X'})").is_ok());
    }

    #[test]
    fn with_clause_chains_correctly() {
        assert!(check_syntax("MATCH (n:Person) WITH n RETURN n.name").is_ok());
    }
}

mod projection_scoping_tests {
    use super::*;

    #[test]
    fn with_replaces_scope_so_unprojected_variables_become_undefined() {
        let schema = movie_schema();
        // `r` is bound by the MATCH but never projected through WITH, so
        // referencing it afterward is an UndefinedVariable.
        let query = "MATCH (a:Person)-[r:KNOWS]->(b:Person) WITH a, b RETURN r.since";
        let errors = validate(query, &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), "UndefinedVariable");
    }

    #[test]
    fn with_star_carries_every_binding_forward() {
        let schema = movie_schema();
        let query = "MATCH (a:Person)-[r:KNOWS]->(b:Person) WITH * RETURN a.name, r.since, b.name";
        let errors = validate(query, &schema).unwrap();
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn with_alias_rebinds_the_projected_variable_name() {
        let schema = movie_schema();
        let query = "MATCH (a:Person) WITH a AS p RETURN p.name";
        let errors = validate(query, &schema).unwrap();
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn return_does_not_mutate_the_scope_visible_to_paging() {
        let schema = movie_schema();
        let query = "MATCH (a:Person) RETURN a.name ORDER BY a.age LIMIT 10";
        let errors = validate(query, &schema).unwrap();
        assert_eq!(errors, vec![]);
    }
}

mod pattern_binding_tests {
    use super::*;

    #[test]
    fn repeated_bare_variable_keeps_its_narrower_label_set() {
        let schema = movie_schema();
        let query = "MATCH (a:Person)-[r:KNOWS]->(b:Person) WITH a, r, b \
                     MATCH (b)-[r2:ACTED_IN]->(m:Movie) RETURN a.name, m.title";
        let errors = validate(query, &schema).unwrap();
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn quantified_path_pattern_variables_survive_into_return() {
        let schema = movie_schema();
        let errors =
            validate("MATCH ((a:Person)-[r:KNOWS]->(b:Person))+ RETURN a.name, b.name", &schema).unwrap();
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn named_path_variable_is_bound_and_usable_in_return() {
        let schema = movie_schema();
        let query = "MATCH p = (a:Person)-[r:KNOWS]->(b:Person) RETURN p";
        let errors = validate(query, &schema).unwrap();
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn pattern_expression_scope_does_not_leak_into_enclosing_query() {
        let schema = movie_schema();
        // `friend` is only bound inside the EXISTS subpattern; referencing
        // it in the outer RETURN must fail.
        let query = "MATCH (a:Person) WHERE EXISTS { (a)-[:KNOWS]->(friend:Person) } RETURN friend.name";
        let errors = validate(query, &schema).unwrap();
        assert!(errors.iter().any(|e| e.kind() == "UndefinedVariable"));
    }

    #[test]
    fn relationship_chain_depth_is_bounded_by_config() {
        let schema = movie_schema();
        let config = ValidatorConfig::new(1, 64);
        let query = "MATCH (a:Person)-[r:KNOWS]->(b:Person)-[r2:KNOWS]->(c:Person) RETURN c.name";
        // With a chain-depth cap of 1 hop, binding stops after the first
        // relationship; this must not panic even though the pattern has
        // two hops.
        let errors = validate_with_config(query, &schema, &config).unwrap();
        let _ = errors;
    }
}

mod classification_tests {
    use super::*;

    #[test]
    fn merge_is_a_write() {
        assert!(is_write("MERGE (n:Person {name: 'Ann'})"));
        assert!(!is_read("MERGE (n:Person {name: 'Ann'})"));
    }

    #[test]
    fn remove_alone_is_not_classified_as_a_write() {
        // spec.md §6.2: write = CREATE | MERGE | SET | DELETE; REMOVE is
        // deliberately excluded from that enumeration.
        assert!(is_read("MATCH (n:Person) REMOVE n.age RETURN n"));
    }

    #[test]
    fn plain_match_return_is_a_read() {
        assert!(is_read("MATCH (n:Person) RETURN n"));
        assert!(!is_write("MATCH (n:Person) RETURN n"));
    }
}
