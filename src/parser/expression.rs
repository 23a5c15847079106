//! Expression grammar, Pratt-style precedence climbing via one
//! recursive-descent function per precedence tier, exactly the shape of
//! the teacher's `open_cypher_parser::expression` (`parse_logical_or`
//! chaining down to `parse_postfix_expression`), generalized to walk a
//! `Cursor<Token>` instead of `nom` combinators over `&str`, and to cover
//! the extra grammar spec.md §4.2 names (`IN`, `IS [NOT] NULL`, `STARTS
//! WITH`, `ENDS WITH`, `CONTAINS`, power, array subscript/slice, CASE,
//! EXISTS{}, pattern comprehension, reduce-style function calls).

use crate::ast::{BinaryOp, Expression, Literal, UnaryOp};
use crate::errors::ParseError;
use crate::lexer::{Keyword, TokenKind};
use crate::parser::common::Cursor;
use crate::parser::pattern::parse_pattern;

pub fn parse_expression<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    parse_or(cursor)
}

fn parse_or<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut lhs = parse_xor(cursor)?;
    while cursor.eat_keyword(Keyword::Or) {
        let pos = lhs.pos();
        let rhs = parse_xor(cursor)?;
        lhs = Expression::Binary { op: BinaryOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
    }
    Ok(lhs)
}

fn parse_xor<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut lhs = parse_and(cursor)?;
    while cursor.eat_keyword(Keyword::Xor) {
        let pos = lhs.pos();
        let rhs = parse_and(cursor)?;
        lhs = Expression::Binary { op: BinaryOp::Xor, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
    }
    Ok(lhs)
}

fn parse_and<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut lhs = parse_not(cursor)?;
    while cursor.eat_keyword(Keyword::And) {
        let pos = lhs.pos();
        let rhs = parse_not(cursor)?;
        lhs = Expression::Binary { op: BinaryOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
    }
    Ok(lhs)
}

fn parse_not<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    if cursor.eat_keyword(Keyword::Not) {
        let operand = parse_not(cursor)?;
        return Ok(Expression::Unary { op: UnaryOp::Not, operand: Box::new(operand), pos });
    }
    parse_comparison(cursor)
}

fn parse_comparison<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut lhs = parse_additive(cursor)?;
    loop {
        let pos = lhs.pos();
        let op = match cursor.peek_kind() {
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::Ne => Some(BinaryOp::Ne),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Le => Some(BinaryOp::Le),
            TokenKind::Ge => Some(BinaryOp::Ge),
            TokenKind::RegexMatch => Some(BinaryOp::RegexMatch),
            _ => None,
        };
        if let Some(op) = op {
            cursor.advance();
            let rhs = parse_additive(cursor)?;
            lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
            continue;
        }

        if cursor.at_keyword(Keyword::In) {
            cursor.advance();
            let list = parse_additive(cursor)?;
            lhs = Expression::In { item: Box::new(lhs), list: Box::new(list), negated: false, pos };
            continue;
        }

        if cursor.at_keyword(Keyword::Not)
            && matches!(cursor.peek_at(1).kind, TokenKind::Keyword(k) if k == Keyword::In)
        {
            cursor.advance(); // NOT
            cursor.advance(); // IN
            let list = parse_additive(cursor)?;
            lhs = Expression::In { item: Box::new(lhs), list: Box::new(list), negated: true, pos };
            continue;
        }

        if cursor.at_keyword(Keyword::StartsWith) {
            cursor.advance();
            cursor.expect_keyword(Keyword::With)?;
            let rhs = parse_additive(cursor)?;
            lhs = Expression::Binary {
                op: BinaryOp::StartsWith,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                pos,
            };
            continue;
        }

        if cursor.at_keyword(Keyword::EndsWith) {
            cursor.advance();
            cursor.expect_keyword(Keyword::With)?;
            let rhs = parse_additive(cursor)?;
            lhs = Expression::Binary { op: BinaryOp::EndsWith, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
            continue;
        }

        if cursor.at_keyword(Keyword::Contains) {
            cursor.advance();
            let rhs = parse_additive(cursor)?;
            lhs = Expression::Binary { op: BinaryOp::Contains, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
            continue;
        }

        if cursor.at_keyword(Keyword::Is) {
            let checkpoint = cursor.checkpoint();
            cursor.advance();
            let negated = cursor.eat_keyword(Keyword::Not);
            if cursor.eat_keyword(Keyword::Null) {
                lhs = Expression::IsNull { operand: Box::new(lhs), negated, pos };
                continue;
            }
            cursor.reset(checkpoint);
        }

        break;
    }
    Ok(lhs)
}

fn parse_additive<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut lhs = parse_multiplicative(cursor)?;
    loop {
        let op = match cursor.peek_kind() {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Dash => BinaryOp::Sub,
            _ => break,
        };
        let pos = lhs.pos();
        cursor.advance();
        let rhs = parse_multiplicative(cursor)?;
        lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
    }
    Ok(lhs)
}

fn parse_multiplicative<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut lhs = parse_unary(cursor)?;
    loop {
        let op = match cursor.peek_kind() {
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => break,
        };
        let pos = lhs.pos();
        cursor.advance();
        let rhs = parse_unary(cursor)?;
        lhs = Expression::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), pos };
    }
    Ok(lhs)
}

fn parse_unary<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    if cursor.eat(&TokenKind::Dash) {
        let operand = parse_unary(cursor)?;
        return Ok(Expression::Unary { op: UnaryOp::Neg, operand: Box::new(operand), pos });
    }
    if cursor.eat(&TokenKind::Plus) {
        return parse_unary(cursor);
    }
    parse_power(cursor)
}

fn parse_power<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let lhs = parse_postfix(cursor)?;
    if cursor.eat(&TokenKind::Caret) {
        let pos = lhs.pos();
        let rhs = parse_unary(cursor)?;
        return Ok(Expression::Binary { op: BinaryOp::Pow, lhs: Box::new(lhs), rhs: Box::new(rhs), pos });
    }
    Ok(lhs)
}

/// Property access, array subscript/slice: the highest-precedence
/// postfix operators, applied left to right (`n.addr.city`, `xs[0]`,
/// `xs[1..3]`).
fn parse_postfix<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let mut expr = parse_primary(cursor)?;
    loop {
        if cursor.eat(&TokenKind::Dot) {
            let (key, pos) = cursor.expect_identifier()?;
            expr = Expression::PropertyAccess { base: Box::new(expr), key, pos };
            continue;
        }
        if cursor.eat(&TokenKind::LBracket) {
            let pos = expr.pos();
            if cursor.eat(&TokenKind::DotDot) {
                let to = if cursor.at(&TokenKind::RBracket) { None } else { Some(Box::new(parse_expression(cursor)?)) };
                cursor.expect(TokenKind::RBracket)?;
                expr = Expression::ArraySlice { base: Box::new(expr), from: None, to, pos };
                continue;
            }
            let first = parse_expression(cursor)?;
            if cursor.eat(&TokenKind::DotDot) {
                let to = if cursor.at(&TokenKind::RBracket) { None } else { Some(Box::new(parse_expression(cursor)?)) };
                cursor.expect(TokenKind::RBracket)?;
                expr = Expression::ArraySlice { base: Box::new(expr), from: Some(Box::new(first)), to, pos };
            } else {
                cursor.expect(TokenKind::RBracket)?;
                expr = Expression::ArraySubscript { base: Box::new(expr), index: Box::new(first), pos };
            }
            continue;
        }
        break;
    }
    Ok(expr)
}

fn parse_primary<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    match cursor.peek_kind().clone() {
        TokenKind::Integer(n) => {
            cursor.advance();
            Ok(Expression::Literal(Literal::Integer(n), pos))
        }
        TokenKind::Float(n) => {
            cursor.advance();
            Ok(Expression::Literal(Literal::Float(n), pos))
        }
        TokenKind::String(s) => {
            cursor.advance();
            Ok(Expression::Literal(Literal::OwnedString(s), pos))
        }
        TokenKind::Keyword(Keyword::True) => {
            cursor.advance();
            Ok(Expression::Literal(Literal::Boolean(true), pos))
        }
        TokenKind::Keyword(Keyword::False) => {
            cursor.advance();
            Ok(Expression::Literal(Literal::Boolean(false), pos))
        }
        TokenKind::Keyword(Keyword::Null) => {
            cursor.advance();
            Ok(Expression::Literal(Literal::Null, pos))
        }
        TokenKind::Parameter(name) => {
            cursor.advance();
            Ok(Expression::Parameter(name, pos))
        }
        TokenKind::Keyword(Keyword::Case) => parse_case(cursor),
        TokenKind::Keyword(Keyword::Exists) => parse_exists(cursor),
        TokenKind::LBracket => parse_list_or_comprehension(cursor),
        TokenKind::LBrace => parse_map(cursor),
        TokenKind::LParen => {
            // Either a parenthesized expression or a pattern expression
            // (spec.md §3: `PatternExpression`); patterns always start
            // with `(`, so disambiguate by trying the pattern parser
            // first and backtracking.
            let checkpoint = cursor.checkpoint();
            if let Ok(pattern) = parse_pattern(cursor) {
                if !matches!(cursor.peek_kind(), TokenKind::LParen | TokenKind::Dash) {
                    return Ok(Expression::PatternExpression(Box::new(pattern), pos));
                }
            }
            cursor.reset(checkpoint);
            cursor.advance();
            let expr = parse_expression(cursor)?;
            cursor.expect(TokenKind::RParen)?;
            Ok(expr)
        }
        TokenKind::Identifier(name) => {
            cursor.advance();
            if cursor.at(&TokenKind::LParen) {
                parse_function_call(cursor, name.to_string(), pos)
            } else {
                Ok(Expression::Variable(name, pos))
            }
        }
        other => Err(ParseError::InvalidExpression {
            message: format!("unexpected token {other} in expression position"),
            pos,
        }),
    }
}

fn parse_function_call<'a, 'b>(
    cursor: &mut Cursor<'a, 'b>,
    mut name: String,
    pos: crate::position::Position,
) -> Result<Expression<'a>, ParseError> {
    // Dotted function names, e.g. `point.distance`.
    while cursor.eat(&TokenKind::Dot) {
        let (part, _) = cursor.expect_identifier()?;
        name.push('.');
        name.push_str(part);
    }
    cursor.expect(TokenKind::LParen)?;
    let distinct = cursor.eat_keyword(Keyword::Distinct);
    let mut args = Vec::new();
    if !cursor.at(&TokenKind::RParen) {
        args.push(parse_expression(cursor)?);
        while cursor.eat(&TokenKind::Comma) {
            args.push(parse_expression(cursor)?);
        }
    }
    cursor.expect(TokenKind::RParen)?;
    Ok(Expression::FunctionCall { name, args, distinct, pos })
}

fn parse_case<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Case)?;
    let subject = if cursor.at_keyword(Keyword::When) {
        None
    } else {
        Some(Box::new(parse_expression(cursor)?))
    };
    let mut when_then = Vec::new();
    while cursor.eat_keyword(Keyword::When) {
        let when = parse_expression(cursor)?;
        cursor.expect_keyword(Keyword::Then)?;
        let then = parse_expression(cursor)?;
        when_then.push((when, then));
    }
    if when_then.is_empty() {
        return Err(ParseError::InvalidExpression {
            message: "CASE requires at least one WHEN/THEN branch".to_string(),
            pos,
        });
    }
    let else_branch = if cursor.eat_keyword(Keyword::Else) {
        Some(Box::new(parse_expression(cursor)?))
    } else {
        None
    };
    cursor.expect_keyword(Keyword::End)?;
    Ok(Expression::CaseWhen { subject, when_then, else_branch, pos })
}

fn parse_exists<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect_keyword(Keyword::Exists)?;
    cursor.expect(TokenKind::LBrace)?;
    cursor.eat_keyword(Keyword::Match);
    let pattern = parse_pattern(cursor)?;
    let where_clause = if cursor.eat_keyword(Keyword::Where) {
        Some(Box::new(parse_expression(cursor)?))
    } else {
        None
    };
    cursor.expect(TokenKind::RBrace)?;
    Ok(Expression::Exists { pattern: Box::new(pattern), where_clause, pos })
}

fn parse_list_or_comprehension<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect(TokenKind::LBracket)?;

    // Pattern comprehension: `[(pattern) WHERE cond | projection]`.
    let checkpoint = cursor.checkpoint();
    if cursor.at(&TokenKind::LParen) {
        if let Ok(pattern) = parse_pattern(cursor) {
            let where_clause = if cursor.eat_keyword(Keyword::Where) {
                Some(Box::new(parse_expression(cursor)?))
            } else {
                None
            };
            if cursor.eat(&TokenKind::Pipe) {
                let projection = parse_expression(cursor)?;
                cursor.expect(TokenKind::RBracket)?;
                return Ok(Expression::PatternComprehension {
                    pattern: Box::new(pattern),
                    where_clause,
                    projection: Box::new(projection),
                    pos,
                });
            }
        }
        cursor.reset(checkpoint);
    }

    let mut items = Vec::new();
    if !cursor.at(&TokenKind::RBracket) {
        items.push(parse_expression(cursor)?);
        while cursor.eat(&TokenKind::Comma) {
            items.push(parse_expression(cursor)?);
        }
    }
    cursor.expect(TokenKind::RBracket)?;
    Ok(Expression::List(items, pos))
}

fn parse_map<'a, 'b>(cursor: &mut Cursor<'a, 'b>) -> Result<Expression<'a>, ParseError> {
    let pos = cursor.position();
    cursor.expect(TokenKind::LBrace)?;
    let mut entries = Vec::new();
    if !cursor.at(&TokenKind::RBrace) {
        loop {
            let (key, _) = cursor.expect_identifier()?;
            cursor.expect(TokenKind::Colon)?;
            let value = parse_expression(cursor)?;
            entries.push((key, value));
            if !cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
    }
    cursor.expect(TokenKind::RBrace)?;
    Ok(Expression::Map(entries, pos))
}
