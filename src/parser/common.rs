//! Token-stream cursor shared by every clause/pattern/expression parser.
//! Plays the role the teacher's `common::ws` plus `nom::IResult` chaining
//! play in `open_cypher_parser`, generalized from "combinator over `&str`"
//! to "cursor over `&[Token]`" since positions are now tracked per-token
//! rather than recomputed from the remaining `&str` on every step.

use crate::errors::ParseError;
use crate::lexer::{Keyword, Token, TokenKind};
use crate::position::Position;

pub struct Cursor<'a, 'b> {
    tokens: &'b [Token<'a>],
    pos: usize,
}

impl<'a, 'b> Cursor<'a, 'b> {
    pub fn new(tokens: &'b [Token<'a>]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    pub fn peek(&self) -> &Token<'a> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn peek_kind(&self) -> &TokenKind<'a> {
        &self.peek().kind
    }

    pub fn peek_at(&self, offset: usize) -> &Token<'a> {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub fn position(&self) -> Position {
        self.peek().pos
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub fn advance(&mut self) -> Token<'a> {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub fn checkpoint(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    pub fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == kw)
    }

    pub fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_keyword(&mut self, kw: Keyword) -> Result<Token<'a>, ParseError> {
        if self.at_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(ParseError::ExpectedToken {
                expected: format!("{kw:?}"),
                found: self.peek().kind.to_string(),
                pos: self.position(),
            })
        }
    }

    pub fn at(&self, kind: &TokenKind<'a>) -> bool {
        self.peek_kind() == kind
    }

    pub fn eat(&mut self, kind: &TokenKind<'a>) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind<'a>) -> Result<Token<'a>, ParseError> {
        if self.at(&kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::ExpectedToken {
                expected: kind.to_string(),
                found: self.peek().kind.to_string(),
                pos: self.position(),
            })
        }
    }

    pub fn expect_identifier(&mut self) -> Result<(&'a str, Position), ParseError> {
        let pos = self.position();
        match self.peek().kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((name, pos))
            }
            // Several keywords double as identifiers in property/function
            // position (e.g. `n.end`, `count`); the parser falls back to
            // the token's source text when that happens.
            TokenKind::Keyword(_) => {
                let text = self.peek().text;
                self.advance();
                Ok((text, pos))
            }
            _ => Err(ParseError::ExpectedToken {
                expected: "identifier".to_string(),
                found: self.peek().kind.to_string(),
                pos,
            }),
        }
    }
}
