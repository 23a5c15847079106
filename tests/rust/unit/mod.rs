//! Unit tests for the lower-level pieces: tokenization, expression
//! precedence, pattern/QPP parsing, and schema dictionary round-trips.

use cypher_guard::ast::{BinaryOp, Expression, Literal, PatternElement};
use cypher_guard::lexer::{Keyword, Lexer, TokenKind};
use cypher_guard::parser::common::Cursor;
use cypher_guard::parser::expression::parse_expression;
use cypher_guard::parser::pattern::parse_pattern;
use cypher_guard::schema::{Constraint, EntityType, Index, Neo4jType, Property, RelationshipPattern, Schema};

mod lexer_tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        let tokens = Lexer::tokenize("match Match MATCH mAtCh").unwrap();
        for tok in &tokens[..4] {
            assert_eq!(tok.kind, TokenKind::Keyword(Keyword::Match));
        }
    }

    #[test]
    fn identifiers_preserve_source_casing() {
        let tokens = Lexer::tokenize("MyVar").unwrap();
        match &tokens[0].kind {
            TokenKind::Identifier(name) => assert_eq!(*name, "MyVar"),
            other => panic!("expected identifier, got {other:?}"),
        }
    }

    #[test]
    fn integer_and_float_literals() {
        let tokens = Lexer::tokenize("42 3.14 2e10").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer(42));
        assert_eq!(tokens[1].kind, TokenKind::Float(3.14));
        assert_eq!(tokens[2].kind, TokenKind::Float(2e10));
    }

    #[test]
    fn string_literal_unescapes() {
        let tokens = Lexer::tokenize(r#"'a\'b'"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String("a'b".to_string()));
    }

    #[test]
    fn arrows_and_comparison_operators() {
        let tokens = Lexer::tokenize("-> <- <-> <= >= <> =~").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::ArrowRight);
        assert_eq!(tokens[1].kind, TokenKind::ArrowLeft);
        assert_eq!(tokens[2].kind, TokenKind::ArrowBoth);
        assert_eq!(tokens[3].kind, TokenKind::Le);
        assert_eq!(tokens[4].kind, TokenKind::Ge);
        assert_eq!(tokens[5].kind, TokenKind::Ne);
        assert_eq!(tokens[6].kind, TokenKind::RegexMatch);
    }

    #[test]
    fn line_comments_and_block_comments_are_skipped() {
        let tokens = Lexer::tokenize("RETURN // trailing\n1 /* inline */ + 2").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| &t.kind).collect();
        assert_eq!(kinds[0], &TokenKind::Keyword(Keyword::Return));
        assert_eq!(kinds[1], &TokenKind::Integer(1));
        assert_eq!(kinds[2], &TokenKind::Plus);
        assert_eq!(kinds[3], &TokenKind::Integer(2));
    }

    #[test]
    fn parameter_token() {
        let tokens = Lexer::tokenize("$minAge").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Parameter("minAge"));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Lexer::tokenize("'unterminated").is_err());
    }

    #[test]
    fn line_and_column_advance_across_newlines() {
        let tokens = Lexer::tokenize("MATCH\n(n)").unwrap();
        let lparen = tokens.iter().find(|t| t.kind == TokenKind::LParen).unwrap();
        assert_eq!(lparen.pos.line, 2);
    }
}

mod expression_precedence_tests {
    use super::*;

    fn parse(src: &'static str) -> Expression<'static> {
        let tokens: Vec<_> = Lexer::tokenize(src).unwrap();
        let tokens: &'static [_] = Box::leak(tokens.into_boxed_slice());
        let mut cursor = Cursor::new(tokens);
        parse_expression(&mut cursor).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        // 1 + 2 * 3 must parse as 1 + (2 * 3).
        let expr = parse("1 + 2 * 3");
        match expr {
            Expression::Binary { op: BinaryOp::Add, rhs, .. } => {
                assert!(matches!(*rhs, Expression::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected a top-level Add, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_unary_minus() {
        // -2^2 is -(2^2), not (-2)^2.
        let expr = parse("-2^2");
        match expr {
            Expression::Unary { operand, .. } => {
                assert!(matches!(*operand, Expression::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("expected a top-level unary negation, got {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // a OR b AND c must parse as a OR (b AND c).
        let expr = parse("true OR false AND true");
        match expr {
            Expression::Binary { op: BinaryOp::Or, rhs, .. } => {
                assert!(matches!(*rhs, Expression::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("expected a top-level Or, got {other:?}"),
        }
    }

    #[test]
    fn comparison_binds_tighter_than_and() {
        let expr = parse("a.age > 30 AND a.name = 'Ann'");
        match expr {
            Expression::Binary { op: BinaryOp::And, lhs, rhs, .. } => {
                assert!(matches!(*lhs, Expression::Binary { op: BinaryOp::Gt, .. }));
                assert!(matches!(*rhs, Expression::Binary { op: BinaryOp::Eq, .. }));
            }
            other => panic!("expected a top-level And, got {other:?}"),
        }
    }

    #[test]
    fn in_is_not_negated_by_default() {
        let expr = parse("a.age IN [1, 2, 3]");
        match expr {
            Expression::In { negated, .. } => assert!(!negated),
            other => panic!("expected an In expression, got {other:?}"),
        }
    }

    #[test]
    fn not_in_produces_a_negated_in_expression() {
        let expr = parse("a.age NOT IN [1, 2, 3]");
        match expr {
            Expression::In { negated, .. } => assert!(negated),
            other => panic!("expected a negated In expression, got {other:?}"),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        // (1 + 2) * 3 must parse as Mul(Add(1,2), 3).
        let expr = parse("(1 + 2) * 3");
        match expr {
            Expression::Binary { op: BinaryOp::Mul, lhs, .. } => {
                assert!(matches!(*lhs, Expression::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("expected a top-level Mul, got {other:?}"),
        }
    }

    #[test]
    fn property_access_chains_left_to_right() {
        let expr = parse("a.b.c");
        match expr {
            Expression::PropertyAccess { base, key: "c", .. } => {
                assert!(matches!(*base, Expression::PropertyAccess { key: "b", .. }));
            }
            other => panic!("expected a nested PropertyAccess, got {other:?}"),
        }
    }

    #[test]
    fn literal_kinds() {
        assert!(matches!(parse("1"), Expression::Literal(Literal::Integer(1), _)));
        assert!(matches!(parse("1.5"), Expression::Literal(Literal::Float(_), _)));
        assert!(matches!(parse("'x'"), Expression::Literal(Literal::String("x"), _)));
        assert!(matches!(parse("true"), Expression::Literal(Literal::Boolean(true), _)));
        assert!(matches!(parse("null"), Expression::Literal(Literal::Null, _)));
    }
}

mod pattern_parsing_tests {
    use super::*;

    fn parse(src: &'static str) -> cypher_guard::ast::Pattern<'static> {
        let tokens: Vec<_> = Lexer::tokenize(src).unwrap();
        let tokens: &'static [_] = Box::leak(tokens.into_boxed_slice());
        let mut cursor = Cursor::new(tokens);
        parse_pattern(&mut cursor).unwrap()
    }

    #[test]
    fn simple_node_pattern_has_one_element() {
        let pattern = parse("(n:Person)");
        assert_eq!(pattern.elements.len(), 1);
        match &pattern.elements[0] {
            PatternElement::Node(n) => {
                assert_eq!(n.var, Some("n"));
                assert_eq!(n.labels, vec!["Person"]);
            }
            other => panic!("expected a node element, got {other:?}"),
        }
    }

    #[test]
    fn relationship_chain_has_three_elements() {
        let pattern = parse("(a:Person)-[r:KNOWS]->(b:Person)");
        assert_eq!(pattern.elements.len(), 3);
        assert!(matches!(pattern.elements[0], PatternElement::Node(_)));
        assert!(matches!(pattern.elements[1], PatternElement::Relationship(_)));
        assert!(matches!(pattern.elements[2], PatternElement::Node(_)));
    }

    #[test]
    fn quantified_path_pattern_carries_its_bounds() {
        let pattern = parse("((a:Person)-[r:KNOWS]->(b:Person)){2,4}");
        assert_eq!(pattern.elements.len(), 1);
        match &pattern.elements[0] {
            PatternElement::Quantified(q) => {
                assert_eq!(q.quantifier.min, 2);
                assert_eq!(q.quantifier.max, Some(4));
                assert_eq!(q.inner.elements.len(), 3);
            }
            other => panic!("expected a quantified element, got {other:?}"),
        }
    }

    #[test]
    fn relationship_direction_incoming() {
        let pattern = parse("(a:Movie)<-[r:ACTED_IN]-(b:Person)");
        match &pattern.elements[1] {
            PatternElement::Relationship(r) => {
                assert_eq!(r.direction, cypher_guard::ast::Direction::Incoming);
            }
            other => panic!("expected a relationship element, got {other:?}"),
        }
    }

    #[test]
    fn undirected_relationship() {
        let pattern = parse("(a)-[r:KNOWS]-(b)");
        match &pattern.elements[1] {
            PatternElement::Relationship(r) => {
                assert_eq!(r.direction, cypher_guard::ast::Direction::Either);
            }
            other => panic!("expected a relationship element, got {other:?}"),
        }
    }
}

mod schema_round_trip_tests {
    use super::*;

    #[test]
    fn property_round_trips_through_dict() {
        let mut prop = Property::new("age", Neo4jType::Integer);
        prop.min_value = Some(0.0);
        prop.max_value = Some(130.0);
        let dict = prop.to_dict();
        let back = Property::from_dict("Person", &dict).unwrap();
        assert_eq!(prop, back);
    }

    #[test]
    fn neo4j_type_accepts_datetime_alias() {
        assert_eq!(Neo4jType::parse("DATETIME"), Some(Neo4jType::DateTime));
        assert_eq!(Neo4jType::parse("DATE_TIME"), Some(Neo4jType::DateTime));
        assert_eq!(Neo4jType::parse("date_time"), Some(Neo4jType::DateTime));
    }

    #[test]
    fn unknown_neo4j_type_is_rejected() {
        assert_eq!(Neo4jType::parse("GEOMETRY"), None);
    }

    #[test]
    fn schema_from_dict_to_dict_round_trips() {
        let mut builder = Schema::builder();
        builder.add_node_property("Person", Property::new("name", Neo4jType::String)).unwrap();
        builder.add_rel_property("KNOWS", Property::new("since", Neo4jType::DateTime)).unwrap();
        builder.add_relationship("Person", "KNOWS", "Person");
        let schema = builder.build();

        let dict = schema.to_dict();
        let back = Schema::from_dict(&dict).unwrap();

        assert!(back.has_node_label("Person"));
        assert!(back.has_rel_type("KNOWS"));
        assert_eq!(back.node_property("Person", "name"), schema.node_property("Person", "name"));
        let back_rels: std::collections::HashSet<_> = back.relationships().collect();
        let original_rels: std::collections::HashSet<_> = schema.relationships().collect();
        assert_eq!(back_rels, original_rels);
    }

    #[test]
    fn schema_to_dict_preserves_label_insertion_order() {
        let mut builder = Schema::builder();
        builder.add_node_property("Zebra", Property::new("id", Neo4jType::Integer)).unwrap();
        builder.add_node_property("Antelope", Property::new("id", Neo4jType::Integer)).unwrap();
        builder.add_node_property("Meerkat", Property::new("id", Neo4jType::Integer)).unwrap();
        builder.add_rel_property("CHASES", Property::new("speed", Neo4jType::Float)).unwrap();
        builder.add_rel_property("AVOIDS", Property::new("since", Neo4jType::DateTime)).unwrap();
        let schema = builder.build();

        let expected_labels = vec!["Zebra", "Antelope", "Meerkat"];
        let expected_rel_types = vec!["CHASES", "AVOIDS"];
        assert_eq!(schema.node_labels().collect::<Vec<_>>(), expected_labels);
        assert_eq!(schema.rel_types().collect::<Vec<_>>(), expected_rel_types);

        let dict = schema.to_dict();
        let back = Schema::from_dict(&dict).unwrap();

        assert_eq!(back.node_labels().collect::<Vec<_>>(), expected_labels);
        assert_eq!(back.rel_types().collect::<Vec<_>>(), expected_rel_types);
    }

    #[test]
    fn duplicate_property_on_same_label_is_rejected() {
        let mut builder = Schema::builder();
        builder.add_node_property("Person", Property::new("name", Neo4jType::String)).unwrap();
        let err = builder.add_node_property("Person", Property::new("name", Neo4jType::String));
        assert!(err.is_err());
    }

    #[test]
    fn relationship_pattern_round_trips() {
        let rel = RelationshipPattern { start: "Person".to_string(), end: "Movie".to_string(), rel_type: "ACTED_IN".to_string() };
        let dict = serde_json::to_value(&rel).unwrap();
        let back: RelationshipPattern = serde_json::from_value(dict).unwrap();
        assert_eq!(rel, back);
    }

    #[test]
    fn constraint_and_index_round_trip() {
        let constraint = Constraint {
            id: 1,
            name: "person_name_unique".to_string(),
            constraint_type: "UNIQUENESS".to_string(),
            entity_type: EntityType::Node,
            labels_or_types: vec!["Person".to_string()],
            properties: vec!["name".to_string()],
            owned_index: None,
            property_type: None,
        };
        let dict = serde_json::to_value(&constraint).unwrap();
        let back: Constraint = serde_json::from_value(dict).unwrap();
        assert_eq!(constraint, back);

        let index = Index {
            label: "Person".to_string(),
            properties: vec!["name".to_string()],
            size: 100,
            index_type: "RANGE".to_string(),
            values_selectivity: 1.0,
            distinct_values: 100,
        };
        let dict = serde_json::to_value(&index).unwrap();
        let back: Index = serde_json::from_value(dict).unwrap();
        assert_eq!(index, back);
    }

    #[test]
    fn labels_with_property_inverse_index_is_precomputed() {
        let mut builder = Schema::builder();
        builder.add_node_property("Person", Property::new("name", Neo4jType::String)).unwrap();
        builder.add_node_property("Movie", Property::new("name", Neo4jType::String)).unwrap();
        let schema = builder.build();
        let owners = schema.labels_with_property("name").unwrap();
        assert_eq!(owners.len(), 2);
        assert!(owners.contains("Person"));
        assert!(owners.contains("Movie"));
    }
}
