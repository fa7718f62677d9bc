//! Line-start tagging and INDENT/DEDENT synthesis
//!
//! Leading whitespace is only meaningful on the first real token of a line,
//! and an indentation increase is only legal directly after a line that
//! ended with `:`.

use crate::lexer::{Lexer, Token, TokenType};
use cu_common::CompilerError;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentState {
    No,
    May,
    Must,
}

/// A raw token annotated by the [`LineTagger`]
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedToken {
    pub token: Token,
    pub at_line_start: bool,
    pub must_indent: bool,
}

/// Second stage: marks line starts and tokens that must open a block.
///
/// `:` arms the state, a following NEWLINE makes the indent mandatory and
/// the next real token carries `must_indent`.
#[derive(Debug)]
pub struct LineTagger {
    at_line_start: bool,
    state: IndentState,
}

impl Default for LineTagger {
    fn default() -> Self {
        Self {
            at_line_start: true,
            state: IndentState::No,
        }
    }
}

impl LineTagger {
    pub fn tag(&mut self, token: Token) -> TaggedToken {
        let at_line_start = self.at_line_start;
        let mut must_indent = false;

        match token.token_type {
            TokenType::Colon => {
                self.at_line_start = false;
                self.state = IndentState::May;
            }
            TokenType::Newline => {
                self.at_line_start = true;
                if self.state == IndentState::May {
                    self.state = IndentState::Must;
                }
            }
            TokenType::Whitespace(_) => {}
            _ => {
                must_indent = self.state == IndentState::Must;
                self.at_line_start = false;
                self.state = IndentState::No;
            }
        }

        TaggedToken {
            token,
            at_line_start,
            must_indent,
        }
    }
}

/// Third stage: converts leading whitespace widths into layout tokens
#[derive(Debug)]
pub struct IndentFilter {
    levels: Vec<usize>,
    depth: usize,
    prev_was_ws: bool,
}

impl Default for IndentFilter {
    fn default() -> Self {
        Self {
            levels: vec![0],
            depth: 0,
            prev_was_ws: false,
        }
    }
}

impl IndentFilter {
    fn current_level(&self) -> usize {
        self.levels.last().copied().unwrap_or(0)
    }

    /// Feed one tagged token; whatever should reach the parser is appended
    /// to `out` (possibly nothing).
    pub fn push(&mut self, tagged: TaggedToken, out: &mut VecDeque<Token>) -> Result<(), CompilerError> {
        let TaggedToken {
            token,
            at_line_start,
            must_indent,
        } = tagged;
        let location = token.span.start.clone();

        match token.token_type {
            TokenType::Whitespace(width) => {
                self.depth = width;
                self.prev_was_ws = true;
                return Ok(());
            }
            TokenType::Newline => {
                self.depth = 0;
                // Blank (or comment-only) lines never reach the parser
                if !(self.prev_was_ws || at_line_start) {
                    out.push_back(token);
                }
                return Ok(());
            }
            _ => {}
        }
        self.prev_was_ws = false;

        if must_indent {
            if self.depth <= self.current_level() || token.token_type == TokenType::EndOfFile {
                return Err(CompilerError::indentation_error(
                    "expected an indented block".to_string(),
                    location,
                ));
            }
            self.levels.push(self.depth);
            log::trace!("indent to {} at {}", self.depth, location);
            out.push_back(Token::synthetic(TokenType::Indent, location));
        } else if token.token_type == TokenType::EndOfFile {
            while self.levels.len() > 1 {
                self.levels.pop();
                out.push_back(Token::synthetic(TokenType::Dedent, location.clone()));
            }
        } else if at_line_start {
            let current = self.current_level();
            if self.depth > current {
                return Err(CompilerError::indentation_error(
                    "indentation increase but not in new block".to_string(),
                    location,
                ));
            }
            if self.depth < current {
                let Some(target) = self.levels.iter().position(|&level| level == self.depth) else {
                    return Err(CompilerError::indentation_error(
                        "inconsistent indentation".to_string(),
                        location,
                    ));
                };
                while self.levels.len() > target + 1 {
                    self.levels.pop();
                    out.push_back(Token::synthetic(TokenType::Dedent, location.clone()));
                }
                log::trace!("dedent to {} at {}", self.depth, location);
            }
        }

        out.push_back(token);
        Ok(())
    }
}

/// The composed, lazily pulled token stream handed to the parser.
///
/// Yields `Err` at most once; the stream is exhausted afterwards.
pub struct TokenStream {
    lexer: Lexer,
    tagger: LineTagger,
    filter: IndentFilter,
    pending: VecDeque<Token>,
    finished: bool,
}

impl TokenStream {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            tagger: LineTagger::default(),
            filter: IndentFilter::default(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    pub fn filename(&self) -> &str {
        self.lexer.tracker.filename()
    }

    fn fill(&mut self) -> Result<(), CompilerError> {
        while self.pending.is_empty() {
            let token = self.lexer.next_token()?;
            let at_end = token.token_type == TokenType::EndOfFile;
            let tagged = self.tagger.tag(token);
            self.filter.push(tagged, &mut self.pending)?;
            if at_end {
                self.finished = true;
            }
        }
        Ok(())
    }
}

impl Iterator for TokenStream {
    type Item = Result<Token, CompilerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(Ok(token));
        }
        if self.finished {
            return None;
        }
        match self.fill() {
            Ok(()) => self.pending.pop_front().map(Ok),
            Err(err) => {
                self.finished = true;
                self.pending.clear();
                Some(Err(err))
            }
        }
    }
}
