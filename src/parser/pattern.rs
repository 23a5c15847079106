//! Node/relationship/quantified-path-pattern grammar (spec.md §3, §4.2).
//! Grounded on the teacher's `open_cypher_parser::path_pattern`
//! (`parse_shortest_path_function`, the node/relationship internals
//! helpers, `MAX_RELATIONSHIP_CHAIN_DEPTH` guard), generalized to a
//! token cursor and to quantified path patterns, which the teacher's
//! grammar does not have.

use crate::ast::{
    Direction, NodePattern, Pattern, PatternElement, PropertyKV, Quantifier, QuantifiedPathPattern,
    RelPattern, VariableLength,
};
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::expression::parse_expression;

/// Same defensive bound as the teacher's `MAX_RELATIONSHIP_CHAIN_DEPTH`:
/// prevents stack overflow on adversarial `(a)-[]->(b)-[]->(c)...` input.
pub const MAX_RELATIONSHIP_CHAIN_DEPTH: usize = 50;

pub fn parse_pattern<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Pattern<'a>, ParseError> {
    let elements = parse_chain(cursor)?;
    Ok(Pattern { path_var: None, elements })
}

fn parse_chain<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Vec<PatternElement<'a>>, ParseError> {
    let mut elements = vec![parse_pattern_element(cursor)?];
    let mut hops = 0usize;
    while matches!(cursor.peek_kind(), TokenKind::Dash | TokenKind::ArrowLeft | TokenKind::ArrowBoth) {
        hops += 1;
        if hops > MAX_RELATIONSHIP_CHAIN_DEPTH {
            return Err(ParseError::InvalidPattern {
                message: format!("relationship chain exceeds {MAX_RELATIONSHIP_CHAIN_DEPTH} hops"),
                pos: cursor.position(),
            });
        }
        let rel = parse_rel_pattern(cursor)?;
        elements.push(PatternElement::Relationship(rel));
        elements.push(parse_pattern_element(cursor)?);
    }
    Ok(elements)
}

fn parse_pattern_element<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<PatternElement<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect(TokenKind::LParen)?;

    if cursor.at(&TokenKind::LParen) {
        // A quantified path pattern: the whole connected sub-pattern is
        // parenthesized again, e.g. `((a)-[r]->(b)){2,4}`.
        let inner_elements = parse_chain(cursor)?;
        cursor.expect(TokenKind::RParen)?;
        let quantifier = expect_quantifier(cursor)?;
        return Ok(PatternElement::Quantified(QuantifiedPathPattern {
            inner: Box::new(Pattern { path_var: None, elements: inner_elements }),
            quantifier,
            pos,
        }));
    }

    let node = parse_node_pattern_body(cursor, pos)?;

    // A degenerate single-node inner pattern can also be quantified:
    // `(a:Person){2,4}`.
    if let Some(quantifier) = try_quantifier(cursor)? {
        return Ok(PatternElement::Quantified(QuantifiedPathPattern {
            inner: Box::new(Pattern { path_var: None, elements: vec![PatternElement::Node(node)] }),
            quantifier,
            pos,
        }));
    }

    Ok(PatternElement::Node(node))
}

/// Parses `var? (:Label (| Label)* (& Label)*)? prop_map? (WHERE expr)?`
/// assuming the opening `(` has already been consumed; consumes the
/// closing `)`.
fn parse_node_pattern_body<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
    pos: crate::position::Position,
) -> Result<NodePattern<'a>, ParseError> {
    let var = match cursor.peek_kind() {
        TokenKind::Identifier(name) => {
            let name = *name;
            cursor.advance();
            Some(name)
        }
        _ => None,
    };

    let labels = parse_label_list(cursor)?;
    let prop_map = parse_optional_prop_map(cursor)?;
    let where_clause = if cursor.eat_keyword(Keyword::Where) {
        Some(Box::new(parse_expression(cursor)?))
    } else {
        None
    };

    cursor.expect(TokenKind::RParen)?;
    Ok(NodePattern { var, labels, prop_map, where_clause, pos })
}

fn parse_label_list<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Vec<&'a str>, ParseError> {
    let mut labels = Vec::new();
    if cursor.eat(&TokenKind::Colon) {
        let (first, _) = cursor.expect_identifier()?;
        labels.push(first);
        loop {
            if cursor.eat(&TokenKind::Pipe) || cursor.eat(&TokenKind::Amp) {
                let (next, _) = cursor.expect_identifier()?;
                labels.push(next);
            } else {
                break;
            }
        }
    }
    Ok(labels)
}

fn parse_optional_prop_map<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
) -> Result<Option<Vec<PropertyKV<'a>>>, ParseError> {
    if !cursor.eat(&TokenKind::LBrace) {
        return Ok(None);
    }
    let mut entries = Vec::new();
    if !cursor.at(&TokenKind::RBrace) {
        loop {
            let (key, _) = cursor.expect_identifier()?;
            cursor.expect(TokenKind::Colon)?;
            let value = parse_expression(cursor)?;
            entries.push(PropertyKV { key, value });
            if !cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
    }
    cursor.expect(TokenKind::RBrace)?;
    Ok(Some(entries))
}

/// `- [ var? (:Type (| Type)*)? length? prop_map? (WHERE expr)? ] -`
/// with an optional arrowhead on either end, plus the `--`/`-->`/`<--`
/// shorthands the lexer already collapsed into single tokens.
fn parse_rel_pattern<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<RelPattern<'a>, ParseError> {
    let pos = cursor.position();

    let left_incoming = cursor.eat(&TokenKind::ArrowLeft);
    if !left_incoming {
        cursor.expect(TokenKind::Dash)?;
    }

    let mut var = None;
    let mut rel_types = Vec::new();
    let mut prop_map = None;
    let mut where_clause = None;
    let mut length = None;

    if cursor.eat(&TokenKind::LBracket) {
        if let TokenKind::Identifier(name) = cursor.peek_kind() {
            let name = *name;
            cursor.advance();
            var = Some(name);
        }
        if cursor.eat(&TokenKind::Colon) {
            let (first, _) = cursor.expect_identifier()?;
            rel_types.push(first);
            while cursor.eat(&TokenKind::Pipe) {
                let (next, _) = cursor.expect_identifier()?;
                rel_types.push(next);
            }
        }
        length = parse_optional_variable_length(cursor)?;
        prop_map = parse_optional_prop_map(cursor)?;
        if cursor.eat_keyword(Keyword::Where) {
            where_clause = Some(Box::new(parse_expression(cursor)?));
        }
        cursor.expect(TokenKind::RBracket)?;
    }

    let right_outgoing = cursor.eat(&TokenKind::ArrowRight);
    if !right_outgoing {
        cursor.expect(TokenKind::Dash)?;
    }

    let direction = match (left_incoming, right_outgoing) {
        (true, false) => Direction::Incoming,
        (false, true) => Direction::Outgoing,
        (false, false) => Direction::Either,
        (true, true) => {
            return Err(ParseError::InvalidPattern {
                message: "relationship cannot have arrowheads on both ends".to_string(),
                pos,
            })
        }
    };

    Ok(RelPattern { var, rel_types, direction, prop_map, where_clause, length, pos })
}

fn parse_optional_variable_length<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
) -> Result<Option<VariableLength>, ParseError> {
    if !cursor.eat(&TokenKind::Star) {
        return Ok(None);
    }
    let min = parse_opt_u32(cursor)?;
    if cursor.eat(&TokenKind::DotDot) {
        let max = parse_opt_u32(cursor)?;
        Ok(Some(VariableLength { min, max }))
    } else {
        Ok(Some(VariableLength { min, max: min }))
    }
}

fn parse_opt_u32<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Option<u32>, ParseError> {
    if let TokenKind::Integer(n) = cursor.peek_kind() {
        let n = *n;
        cursor.advance();
        Ok(Some(n as u32))
    } else {
        Ok(None)
    }
}

fn try_quantifier<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Option<Quantifier>, ParseError> {
    if cursor.eat(&TokenKind::Plus) {
        return Ok(Some(Quantifier::plus()));
    }
    if cursor.eat(&TokenKind::Star) {
        return Ok(Some(Quantifier::star()));
    }
    if cursor.at(&TokenKind::LBrace) {
        return Ok(Some(expect_quantifier(cursor)?));
    }
    Ok(None)
}

fn expect_quantifier<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Quantifier, ParseError> {
    if cursor.eat(&TokenKind::Plus) {
        return Ok(Quantifier::plus());
    }
    if cursor.eat(&TokenKind::Star) {
        return Ok(Quantifier::star());
    }
    let pos = cursor.position();
    cursor.expect(TokenKind::LBrace)?;
    let min = parse_opt_u32(cursor)?;
    let has_comma = cursor.eat(&TokenKind::Comma);
    let max = if has_comma { parse_opt_u32(cursor)? } else { min };
    cursor.expect(TokenKind::RBrace)?;
    let min = min.unwrap_or(0);
    if let Some(max) = max {
        if min > max {
            return Err(ParseError::InvalidPattern {
                message: format!("quantifier lower bound {min} exceeds upper bound {max}"),
                pos,
            });
        }
    }
    Ok(Quantifier { min, max })
}
