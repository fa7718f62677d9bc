//! Parse error types

use crate::lexer::Token;
use cu_common::{CompilerError, SourceLocation};
use thiserror::Error;

/// Parse error types specific to the parser
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Expected {expected}, found {}", .found.token_type)]
    UnexpectedToken {
        expected: String,
        found: Token,
    },
    #[error("{message}")]
    InvalidExpression {
        message: String,
        location: SourceLocation,
    },
    #[error("{message}")]
    InvalidType {
        message: String,
        location: SourceLocation,
    },
    #[error("{message}")]
    InvalidDeclaration {
        message: String,
        location: SourceLocation,
    },
}

impl From<ParseError> for CompilerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnexpectedToken { ref found, .. } => {
                CompilerError::parse_error(err.to_string(), found.span.start.clone())
            }
            ParseError::InvalidExpression { message, location }
            | ParseError::InvalidType { message, location }
            | ParseError::InvalidDeclaration { message, location } => {
                CompilerError::parse_error(message, location)
            }
        }
    }
}
