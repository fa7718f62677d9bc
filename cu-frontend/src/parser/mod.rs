//! Recursive descent parser
//!
//! Pulls tokens lazily from a [`TokenStream`] through a small lookahead
//! buffer (two tokens are needed to tell `name: type` from an expression).
//! Expressions are parsed by precedence climbing over the table in
//! [`precedence`]. There is no error recovery: the first error is returned.

pub mod declarations;
pub mod errors;
pub mod expressions;
pub mod precedence;
pub mod statements;
pub mod types;

use crate::ast::*;
use crate::lexer::{Lexer, Token, TokenStream, TokenType};
use cu_common::{CompilerError, SourceLocation, SourceSpan};
use std::collections::VecDeque;

pub use errors::ParseError;

pub struct Parser {
    tokens: TokenStream,
    lookahead: VecDeque<Token>,
    pub(crate) node_id_gen: NodeIdGenerator,
    filename: String,
    previous_end: SourceLocation,
}

impl Parser {
    pub fn new(tokens: TokenStream) -> Self {
        let filename = tokens.filename().to_string();
        Self {
            tokens,
            lookahead: VecDeque::new(),
            node_id_gen: NodeIdGenerator::new(),
            previous_end: SourceLocation::new(&filename, 1, 1),
            filename,
        }
    }

    pub fn from_source(source: &str, filename: &str) -> Self {
        Self::new(Lexer::with_filename(source, filename).into_tokens())
    }

    /// Make sure at least `count` tokens are buffered. Past the end of the
    /// stream the buffer is padded with `EndOfFile`.
    fn fill(&mut self, count: usize) -> Result<(), CompilerError> {
        while self.lookahead.len() < count {
            let token = match self.tokens.next() {
                Some(token) => token?,
                None => Token::synthetic(TokenType::EndOfFile, self.previous_end.clone()),
            };
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    pub(crate) fn peek(&mut self) -> Result<&Token, CompilerError> {
        self.peek_nth(0)
    }

    pub(crate) fn peek_nth(&mut self, offset: usize) -> Result<&Token, CompilerError> {
        self.fill(offset + 1)?;
        self.lookahead
            .get(offset)
            .ok_or_else(|| CompilerError::from("token lookahead underflow".to_string()))
    }

    pub(crate) fn peek_type(&mut self) -> Result<TokenType, CompilerError> {
        Ok(self.peek()?.token_type.clone())
    }

    pub(crate) fn advance(&mut self) -> Result<Token, CompilerError> {
        self.fill(1)?;
        let token = self
            .lookahead
            .pop_front()
            .ok_or_else(|| CompilerError::from("token lookahead underflow".to_string()))?;
        if token.token_type != TokenType::EndOfFile {
            self.previous_end = token.span.end.clone();
        }
        Ok(token)
    }

    /// Whether the current token has the same kind as `token_type`
    pub(crate) fn check(&mut self, token_type: &TokenType) -> Result<bool, CompilerError> {
        let token = self.peek()?;
        Ok(std::mem::discriminant(&token.token_type) == std::mem::discriminant(token_type))
    }

    pub(crate) fn match_token(&mut self, token_type: &TokenType) -> Result<bool, CompilerError> {
        if self.check(token_type)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, token_type: TokenType, context: &str) -> Result<Token, CompilerError> {
        if self.check(&token_type)? {
            return self.advance();
        }
        let found = self.advance()?;
        Err(ParseError::UnexpectedToken {
            expected: format!("'{}' in {}", token_type, context),
            found,
        }
        .into())
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<(String, SourceSpan), CompilerError> {
        let token = self.advance()?;
        match token.token_type {
            TokenType::Identifier(name) => Ok((name, token.span)),
            _ => Err(ParseError::UnexpectedToken {
                expected: format!("identifier in {}", context),
                found: token,
            }
            .into()),
        }
    }

    pub(crate) fn current_location(&mut self) -> Result<SourceLocation, CompilerError> {
        Ok(self.peek()?.span.start.clone())
    }

    /// Span from `start` to the end of the last consumed token
    pub(crate) fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan::new(start, self.previous_end.clone())
    }

    /// Parse the whole input into a module
    pub fn parse_module(&mut self) -> Result<Module, CompilerError> {
        let mut body = Vec::new();
        while !self.check(&TokenType::EndOfFile)? {
            body.push(self.parse_statement()?);
        }
        Ok(Module {
            filename: self.filename.clone(),
            body,
        })
    }
}
