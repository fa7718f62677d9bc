//! cu front end
//!
//! This crate provides the front end for the cu language:
//! - Lexer: tokenizes indentation-sensitive source into a token stream
//! - Parser: builds the AST from tokens
//! - AST: abstract syntax tree definitions
//! - Types: the value type lattice and per-scope type tables
//! - Semantic analysis: scope resolution, type inference and checking
//! - Formatter: prints a (decorated) module back as source

pub mod ast;
pub mod builtins;
pub mod config;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod types;

pub use ast::{BinaryOp, Expression, ExpressionKind, Module, Statement, StatementKind, UnaryOp};
pub use config::FrontendConfig;
pub use formatter::{format_expression, format_module};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{ParseError, Parser};
pub use semantic::{CheckedUnit, Checker, SemanticError};
pub use types::{TypeTable, ValueType};

use cu_common::CompilerError;
use std::path::Path;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Tokenize source code (for debugging/IDE features)
    pub fn tokenize_source(source: &str, filename: &str) -> Result<Vec<Token>, CompilerError> {
        Lexer::with_filename(source, filename).tokenize()
    }

    /// Parse source code into an AST
    pub fn parse_source(source: &str, filename: &str) -> Result<Module, CompilerError> {
        Parser::from_source(source, filename).parse_module()
    }

    /// Parse and check source code that does not come from a file.
    /// Relative includes are searched in the configured directories only.
    pub fn check_source(source: &str, filename: &str, config: FrontendConfig) -> Result<CheckedUnit, CompilerError> {
        let module = Self::parse_source(source, filename)?;
        Checker::new(config).check_module(module, None)
    }

    /// Read, parse and check a file
    pub fn check_file(path: &Path, config: FrontendConfig) -> Result<CheckedUnit, CompilerError> {
        let source = std::fs::read_to_string(path).map_err(|err| CompilerError::IoError {
            message: format!("{}: {}", path.display(), err),
        })?;
        let filename = path.display().to_string();
        let module = Self::parse_source(&source, &filename)?;
        Checker::new(config).check_module(module, Some(path))
    }
}
