//! Error handling for the cu front end
//!
//! Every phase reports failures as a `CompilerError`. There is no recovery
//! and no warning tier: the first error aborts the compilation unit.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Lexical error at {location}: {message}")]
    LexError {
        location: SourceLocation,
        message: String,
    },

    #[error("Indentation error at {location}: {message}")]
    IndentationError {
        location: SourceLocation,
        message: String,
    },

    #[error("Parse error at {location}: {message}")]
    ParseError {
        location: SourceLocation,
        message: String,
    },

    #[error("Semantic error at {location}: {message}")]
    SemanticError {
        location: SourceLocation,
        message: String,
    },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    pub fn lexer_error(message: String, location: SourceLocation) -> Self {
        CompilerError::LexError { location, message }
    }

    pub fn indentation_error(message: String, location: SourceLocation) -> Self {
        CompilerError::IndentationError { location, message }
    }

    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        CompilerError::ParseError { location, message }
    }

    pub fn semantic_error(message: String, location: SourceLocation) -> Self {
        CompilerError::SemanticError { location, message }
    }

    /// Where the error was raised, when the phase knows it
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::LexError { location, .. }
            | CompilerError::IndentationError { location, .. }
            | CompilerError::ParseError { location, .. }
            | CompilerError::SemanticError { location, .. } => Some(location),
            CompilerError::IoError { .. } | CompilerError::InternalError { .. } => None,
        }
    }

    /// The bare message without the phase prefix or location
    pub fn message(&self) -> &str {
        match self {
            CompilerError::LexError { message, .. }
            | CompilerError::IndentationError { message, .. }
            | CompilerError::ParseError { message, .. }
            | CompilerError::SemanticError { message, .. }
            | CompilerError::IoError { message }
            | CompilerError::InternalError { message } => message,
        }
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A rendered diagnostic, as printed by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl From<&CompilerError> for Diagnostic {
    fn from(err: &CompilerError) -> Self {
        let diagnostic = Diagnostic::error(err.message().to_string(), err.location().cloned());
        match err {
            CompilerError::IndentationError { .. } => {
                diagnostic.with_note("blocks are indented after a line ending in ':'".to_string())
            }
            CompilerError::InternalError { .. } => {
                diagnostic.with_note("this is a bug in the compiler".to_string())
            }
            _ => diagnostic,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}: {}", location, self.severity, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display_includes_location() {
        let err = CompilerError::lexer_error(
            "Unknown symbol '$' at (3, 7)".to_string(),
            SourceLocation::new("main.cu", 3, 7),
        );
        assert_eq!(
            err.to_string(),
            "Lexical error at main.cu:3:7: Unknown symbol '$' at (3, 7)"
        );
        assert_eq!(err.location().map(|l| l.line), Some(3));
    }

    #[test]
    fn test_io_error_has_no_location() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.h");
        let err = CompilerError::from(io);
        assert!(err.location().is_none());
        assert_eq!(err.message(), "missing.h");
    }

    #[test]
    fn test_diagnostic_from_indentation_error() {
        let err = CompilerError::indentation_error(
            "expected an indented block".to_string(),
            SourceLocation::new("main.cu", 2, 1),
        );
        let diag = Diagnostic::from(&err);

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(
            diag.to_string(),
            "main.cu:2:1: error: expected an indented block\n  note: blocks are indented after a line ending in ':'"
        );
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::error("no input files".to_string(), None)
            .with_note("pass a .cu file".to_string());
        assert_eq!(diag.to_string(), "error: no input files\n  note: pass a .cu file");
    }
}
