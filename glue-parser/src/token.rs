//! Tokens shared by the WebIDL and binding description lexers

use crate::span::Position;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    String(String),
    Integer(i64),
    Float(f64),
    /// Raw code between `%{` and `%}`
    CodeBlock(String),
    Ellipsis,
    Punct(char),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::String(value) => write!(f, "string \"{}\"", value),
            TokenKind::Integer(value) => write!(f, "integer {}", value),
            TokenKind::Float(value) => write!(f, "float {}", value),
            TokenKind::CodeBlock(_) => f.write_str("code block"),
            TokenKind::Ellipsis => f.write_str("'...'"),
            TokenKind::Punct(c) => write!(f, "'{}'", c),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }

    pub fn eof(position: Position) -> Self {
        Token {
            kind: TokenKind::Eof,
            position,
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(n) if n == name)
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}
