//! Tokenizer for the query language.
//!
//! Converts raw query text into a flat [`Vec<Token>`] carrying byte
//! offsets and line/column [`Position`]s, so every later stage (parser,
//! AST, error reporting) can point back at the exact source location.
//! Whitespace and comments are consumed here and never surface as
//! tokens; keywords are matched case-insensitively while everything
//! else (identifiers, string contents) keeps the source casing.
//!
//! The scanning technique (a `CharIndices`-backed cursor with one
//! character of lookahead) is the same one used by the pack's
//! `apollo-parser` lexer (`examples/apollographql-apollo-rs/crates/
//! apollo-parser/src/lexer/cursor.rs`); line/column tracking is added
//! on top since apollo-parser only needs byte offsets.

use crate::errors::ParseError;
use crate::position::Position;
use std::fmt;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Match,
    Optional,
    Create,
    Merge,
    With,
    Unwind,
    Where,
    Return,
    Order,
    By,
    Skip,
    Limit,
    Set,
    Delete,
    Detach,
    Remove,
    Distinct,
    As,
    And,
    Or,
    Xor,
    Not,
    In,
    Is,
    Null,
    True,
    False,
    StartsWith,
    EndsWith,
    Contains,
    Case,
    When,
    Then,
    Else,
    End,
    Union,
    All,
    Call,
    Yield,
    Use,
    Exists,
    On,
}

impl Keyword {
    /// Matches a single identifier-shaped word against the fixed
    /// keyword table. `STARTS WITH` / `ENDS WITH` are two words in the
    /// grammar; the lexer only classifies the first word (`STARTS`,
    /// `ENDS`) and the parser recognizes the pair.
    fn lookup(word: &str) -> Option<Keyword> {
        Some(match word.to_ascii_uppercase().as_str() {
            "MATCH" => Keyword::Match,
            "OPTIONAL" => Keyword::Optional,
            "CREATE" => Keyword::Create,
            "MERGE" => Keyword::Merge,
            "WITH" => Keyword::With,
            "UNWIND" => Keyword::Unwind,
            "WHERE" => Keyword::Where,
            "RETURN" => Keyword::Return,
            "ORDER" => Keyword::Order,
            "BY" => Keyword::By,
            "SKIP" => Keyword::Skip,
            "LIMIT" => Keyword::Limit,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            "DETACH" => Keyword::Detach,
            "REMOVE" => Keyword::Remove,
            "DISTINCT" => Keyword::Distinct,
            "AS" => Keyword::As,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "XOR" => Keyword::Xor,
            "NOT" => Keyword::Not,
            "IN" => Keyword::In,
            "IS" => Keyword::Is,
            "NULL" => Keyword::Null,
            "TRUE" => Keyword::True,
            "FALSE" => Keyword::False,
            "STARTS" => Keyword::StartsWith,
            "ENDS" => Keyword::EndsWith,
            "CONTAINS" => Keyword::Contains,
            "CASE" => Keyword::Case,
            "WHEN" => Keyword::When,
            "THEN" => Keyword::Then,
            "ELSE" => Keyword::Else,
            "END" => Keyword::End,
            "UNION" => Keyword::Union,
            "ALL" => Keyword::All,
            "CALL" => Keyword::Call,
            "YIELD" => Keyword::Yield,
            "USE" => Keyword::Use,
            "EXISTS" => Keyword::Exists,
            "ON" => Keyword::On,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    Keyword(Keyword),
    Identifier(&'a str),
    Integer(i64),
    Float(f64),
    String(String),
    Parameter(&'a str),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    DotDot,
    Colon,
    Semicolon,
    Pipe,
    Amp,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    ArrowRight, // ->
    ArrowLeft,  // <-
    ArrowBoth,  // <->
    Dash,       // -
    Plus,
    Star,
    Slash,
    Percent,
    Caret,
    RegexMatch, // =~
    Eof,
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "{:?}", k),
            TokenKind::Identifier(s) => write!(f, "identifier `{s}`"),
            TokenKind::Integer(n) => write!(f, "integer {n}"),
            TokenKind::Float(n) => write!(f, "float {n}"),
            TokenKind::String(s) => write!(f, "string \"{s}\""),
            TokenKind::Parameter(s) => write!(f, "parameter ${s}"),
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub pos: Position,
    /// Original source text for this token, preserved verbatim so
    /// identifiers keep their source casing even though keywords are
    /// matched case-insensitively.
    pub text: &'a str,
}

struct Cursor<'a> {
    source: &'a str,
    chars: CharIndices<'a>,
    pending: Option<(usize, char)>,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let pending = chars.next();
        Cursor { source, chars, pending, offset: 0, line: 1, column: 1 }
    }

    fn peek(&self) -> Option<char> {
        self.pending.map(|(_, c)| c)
    }

    fn peek_at(&self, index: usize) -> Option<char> {
        self.source[self.offset..].chars().nth(index)
    }

    fn pos(&self) -> Position {
        Position { line: self.line, column: self.column, offset: self.offset }
    }

    fn bump(&mut self) -> Option<char> {
        let (idx, ch) = self.pending?;
        self.offset = idx + ch.len_utf8();
        self.pending = self.chars.next();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { cursor: Cursor::new(source) }
    }

    pub fn tokenize(source: &'a str) -> Result<Vec<Token<'a>>, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.bump();
                }
                Some('/') if self.cursor.peek_at(1) == Some('/') => {
                    while let Some(c) = self.cursor.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.cursor.bump();
                    }
                }
                Some('/') if self.cursor.peek_at(1) == Some('*') => {
                    let start = self.cursor.pos();
                    self.cursor.bump();
                    self.cursor.bump();
                    let mut closed = false;
                    while let Some(c) = self.cursor.bump() {
                        if c == '*' && self.cursor.peek() == Some('/') {
                            self.cursor.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(ParseError::NomParsingError {
                            message: "unterminated block comment".to_string(),
                            pos: start,
                        });
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        self.skip_trivia()?;
        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Ok(Token { kind: TokenKind::Eof, pos: start, text: "" });
        };

        if c == '_' || c.is_alphabetic() {
            return Ok(self.lex_word(start));
        }
        if c.is_ascii_digit() {
            return self.lex_number(start);
        }
        if c == '\'' || c == '"' {
            return self.lex_string(start, c);
        }
        if c == '`' {
            return self.lex_backtick_identifier(start);
        }
        if c == '$' {
            self.cursor.bump();
            let name_start = self.cursor.offset_idx();
            while matches!(self.cursor.peek(), Some(ch) if ch.is_alphanumeric() || ch == '_') {
                self.cursor.bump();
            }
            let text = &self.cursor.source[name_start..self.cursor.offset];
            return Ok(Token { kind: TokenKind::Parameter(text), pos: start, text });
        }

        self.lex_punctuation(start, c)
    }

    fn lex_word(&mut self, start: Position) -> Token<'a> {
        let begin = self.cursor.offset;
        while matches!(self.cursor.peek(), Some(ch) if ch.is_alphanumeric() || ch == '_') {
            self.cursor.bump();
        }
        let text = &self.cursor.source[begin..self.cursor.offset];
        let kind = match Keyword::lookup(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(text),
        };
        Token { kind, pos: start, text }
    }

    fn lex_number(&mut self, start: Position) -> Result<Token<'a>, ParseError> {
        let begin = self.cursor.offset;
        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
            self.cursor.bump();
        }
        let mut is_float = false;
        if self.cursor.peek() == Some('.') && matches!(self.cursor.peek_at(1), Some(c) if c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.bump();
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                self.cursor.bump();
            }
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            let save = (self.cursor.offset, self.cursor.line, self.cursor.column, self.cursor.pending);
            self.cursor.bump();
            if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                self.cursor.bump();
            }
            if matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                    self.cursor.bump();
                }
            } else {
                (self.cursor.offset, self.cursor.line, self.cursor.column, self.cursor.pending) = save;
            }
        }
        let text = &self.cursor.source[begin..self.cursor.offset];
        if is_float {
            let value: f64 = text.parse().map_err(|_| ParseError::NomParsingError {
                message: format!("invalid float literal `{text}`"),
                pos: start,
            })?;
            Ok(Token { kind: TokenKind::Float(value), pos: start, text })
        } else {
            let value: i64 = text.parse().map_err(|_| ParseError::NomParsingError {
                message: format!("invalid integer literal `{text}`"),
                pos: start,
            })?;
            Ok(Token { kind: TokenKind::Integer(value), pos: start, text })
        }
    }

    fn lex_string(&mut self, start: Position, quote: char) -> Result<Token<'a>, ParseError> {
        let raw_begin = self.cursor.offset;
        self.cursor.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ParseError::NomParsingError {
                        message: "unterminated string literal".to_string(),
                        pos: start,
                    })
                }
                Some(c) if c == quote => {
                    self.cursor.bump();
                    break;
                }
                Some('\\') => {
                    self.cursor.bump();
                    match self.cursor.bump() {
                        Some('\\') => value.push('\\'),
                        Some('\'') => value.push('\''),
                        Some('"') => value.push('"'),
                        Some('n') => value.push('\n'),
                        Some('r') => value.push('\r'),
                        Some('t') => value.push('\t'),
                        Some(other) => value.push(other),
                        None => {
                            return Err(ParseError::NomParsingError {
                                message: "unterminated string literal".to_string(),
                                pos: start,
                            })
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.bump();
                }
            }
        }
        let text = &self.cursor.source[raw_begin..self.cursor.offset];
        Ok(Token { kind: TokenKind::String(value), pos: start, text })
    }

    fn lex_backtick_identifier(&mut self, start: Position) -> Result<Token<'a>, ParseError> {
        self.cursor.bump(); // opening backtick
        let begin = self.cursor.offset;
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ParseError::NomParsingError {
                        message: "unterminated backtick identifier".to_string(),
                        pos: start,
                    })
                }
                Some('`') => break,
                _ => {
                    self.cursor.bump();
                }
            }
        }
        let text = &self.cursor.source[begin..self.cursor.offset];
        self.cursor.bump(); // closing backtick
        Ok(Token { kind: TokenKind::Identifier(text), pos: start, text })
    }

    fn lex_punctuation(&mut self, start: Position, c: char) -> Result<Token<'a>, ParseError> {
        let begin = self.cursor.offset;
        let kind = match c {
            '(' => { self.cursor.bump(); TokenKind::LParen }
            ')' => { self.cursor.bump(); TokenKind::RParen }
            '[' => { self.cursor.bump(); TokenKind::LBracket }
            ']' => { self.cursor.bump(); TokenKind::RBracket }
            '{' => { self.cursor.bump(); TokenKind::LBrace }
            '}' => { self.cursor.bump(); TokenKind::RBrace }
            ',' => { self.cursor.bump(); TokenKind::Comma }
            ';' => { self.cursor.bump(); TokenKind::Semicolon }
            '|' => { self.cursor.bump(); TokenKind::Pipe }
            '&' => { self.cursor.bump(); TokenKind::Amp }
            '+' => { self.cursor.bump(); TokenKind::Plus }
            '*' => { self.cursor.bump(); TokenKind::Star }
            '/' => { self.cursor.bump(); TokenKind::Slash }
            '%' => { self.cursor.bump(); TokenKind::Percent }
            '^' => { self.cursor.bump(); TokenKind::Caret }
            ':' => { self.cursor.bump(); TokenKind::Colon }
            '.' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('.') {
                    self.cursor.bump();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '=' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('~') {
                    self.cursor.bump();
                    TokenKind::RegexMatch
                } else {
                    TokenKind::Eq
                }
            }
            '<' => {
                self.cursor.bump();
                match self.cursor.peek() {
                    Some('=') => { self.cursor.bump(); TokenKind::Le }
                    Some('>') => { self.cursor.bump(); TokenKind::Ne }
                    Some('-') => {
                        self.cursor.bump();
                        if self.cursor.peek() == Some('>') {
                            self.cursor.bump();
                            TokenKind::ArrowBoth
                        } else {
                            TokenKind::ArrowLeft
                        }
                    }
                    _ => TokenKind::Lt,
                }
            }
            '>' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '-' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('>') {
                    self.cursor.bump();
                    TokenKind::ArrowRight
                } else {
                    TokenKind::Dash
                }
            }
            _ => {
                return Err(ParseError::NomParsingError {
                    message: format!("unexpected character `{c}`"),
                    pos: start,
                })
            }
        };
        let text = &self.cursor.source[begin..self.cursor.offset];
        Ok(Token { kind, pos: start, text })
    }
}

impl<'a> Cursor<'a> {
    fn offset_idx(&self) -> usize {
        self.offset
    }
}
