//! Parser and AST error types

use crate::ast::NodeKind;
use crate::span::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while tokenizing or parsing WebIDL / binding sources
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Lexer error at {position}: {message}")]
    Lexer { message: String, position: Position },

    #[error("Syntax error at {position}: {message}")]
    Syntax { message: String, position: Position },

    #[error("Unexpected token at {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("Unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String },
}

impl ParseError {
    pub fn lexer(message: impl Into<String>, position: Position) -> Self {
        Self::Lexer {
            message: message.into(),
            position,
        }
    }

    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            position,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
        }
    }

    /// Get the position associated with this error, if any
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Lexer { position, .. }
            | Self::Syntax { position, .. }
            | Self::UnexpectedToken { position, .. } => Some(*position),
            Self::UnexpectedEof { .. } => None,
        }
    }
}

/// Payload accessor failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("{kind} node payload is {found}, expected {expected}")]
    PayloadMismatch {
        kind: NodeKind,
        expected: &'static str,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_position() {
        let error = ParseError::syntax("bad member", Position::new(3, 7));
        assert_eq!(error.position(), Some(Position::new(3, 7)));
        assert_eq!(error.to_string(), "Syntax error at 3:7: bad member");

        let eof = ParseError::unexpected_eof("'}'");
        assert_eq!(eof.position(), None);
    }

    #[test]
    fn test_payload_mismatch_message() {
        let error = AstError::PayloadMismatch {
            kind: NodeKind::Ident,
            expected: "text",
            found: "integer",
        };
        assert_eq!(error.to_string(), "ident node payload is integer, expected text");
    }
}
