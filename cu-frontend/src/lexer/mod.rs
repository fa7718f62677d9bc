//! Indentation-sensitive tokenizer
//!
//! Tokenizing happens in three stages that are pulled one token at a time:
//!
//! 1. [`Lexer`] scans raw lexemes. Newline runs and leading whitespace runs
//!    become layout tokens unless a bracket is open, comments are dropped.
//! 2. [`indent::LineTagger`] marks tokens that start a line and tokens that
//!    must open a new block (the first real token after `:` NEWLINE).
//! 3. [`indent::IndentFilter`] turns leading whitespace into INDENT/DEDENT
//!    tokens against a stack of open indentation levels.
//!
//! [`TokenStream`] composes the stages into an iterator.

pub mod indent;
pub mod literals;
pub mod operators;
pub mod token;

pub use indent::TokenStream;
pub use token::{Token, TokenType};

use cu_common::{CompilerError, SourceSpan, SourceTracker};

/// Raw scanner (first stage)
pub struct Lexer {
    pub(crate) input: Vec<char>,
    pub(crate) position: usize,
    pub(crate) tracker: SourceTracker,
    paren_depth: u32,
    bracket_depth: u32,
    brace_depth: u32,
    at_line_start: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_filename(input, "<input>")
    }

    /// CRLF line endings are folded to `\n` before scanning.
    pub fn with_filename(input: &str, filename: &str) -> Self {
        Self {
            input: input.replace("\r\n", "\n").chars().collect(),
            position: 0,
            tracker: SourceTracker::new(filename),
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
            at_line_start: true,
        }
    }

    pub(crate) fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub(crate) fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        self.tracker.advance(ch);
        Some(ch)
    }

    fn inside_brackets(&self) -> bool {
        self.paren_depth + self.bracket_depth + self.brace_depth > 0
    }

    /// Consume spaces and tabs, returning the width of the run
    fn skip_blanks(&mut self) -> usize {
        let mut width = 0;
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' | '\t' => width += 1,
                _ => break,
            }
            self.advance();
        }
        width
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn tokenize_identifier(&mut self) -> TokenType {
        let mut identifier = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenType::keyword(&identifier).unwrap_or(TokenType::Identifier(identifier))
    }

    fn track_brackets(&mut self, token_type: &TokenType) {
        match token_type {
            TokenType::LeftParen => self.paren_depth += 1,
            TokenType::RightParen => self.paren_depth = self.paren_depth.saturating_sub(1),
            TokenType::LeftBracket => self.bracket_depth += 1,
            TokenType::RightBracket => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            TokenType::LeftBrace => self.brace_depth += 1,
            TokenType::RightBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
    }

    /// Next raw token, including `Whitespace` and `Newline` layout tokens.
    ///
    /// Returns `EndOfFile` once the input is exhausted, and keeps doing so.
    pub fn next_token(&mut self) -> Result<Token, CompilerError> {
        loop {
            let start = self.tracker.location();

            let token_type = match self.current_char() {
                None => TokenType::EndOfFile,

                Some(' ' | '\t') => {
                    let width = self.skip_blanks();
                    if !self.at_line_start || self.inside_brackets() {
                        continue;
                    }
                    TokenType::Whitespace(width)
                }

                Some('\n') => {
                    while self.current_char() == Some('\n') {
                        self.advance();
                    }
                    if self.inside_brackets() {
                        continue;
                    }
                    self.at_line_start = true;
                    let span = self.tracker.span_from(start);
                    return Ok(Token::new(TokenType::Newline, span));
                }

                Some('#') => {
                    self.skip_comment();
                    continue;
                }

                Some('\\') if self.peek_char(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                    continue;
                }

                Some(ch) if ch.is_alphabetic() || ch == '_' => self.tokenize_identifier(),

                Some(ch) if ch.is_ascii_digit() => self.tokenize_number()?,

                Some('\'') => self.tokenize_char_literal()?,

                Some('"') => self.tokenize_string_literal()?,

                Some(_) => self.tokenize_operator()?,
            };

            if !matches!(token_type, TokenType::Whitespace(_) | TokenType::EndOfFile) {
                self.at_line_start = false;
            }
            self.track_brackets(&token_type);

            let span = SourceSpan::new(start, self.tracker.location());
            log::trace!("raw token {} at {}", token_type, span.start);
            return Ok(Token::new(token_type, span));
        }
    }

    /// Convert the lexer into the full three-stage token iterator
    pub fn into_tokens(self) -> TokenStream {
        TokenStream::new(self)
    }

    /// Tokenize the entire input, ending with a single `EndOfFile`
    pub fn tokenize(self) -> Result<Vec<Token>, CompilerError> {
        self.into_tokens().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_types(input: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(input);
        let mut types = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = token.token_type == TokenType::EndOfFile;
            types.push(token.token_type);
            if done {
                return types;
            }
        }
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let types = raw_types("def main if elif else while NULL sizeof x_1");
        assert_eq!(
            types,
            vec![
                TokenType::Def,
                TokenType::Identifier("main".to_string()),
                TokenType::If,
                TokenType::Elif,
                TokenType::Else,
                TokenType::While,
                TokenType::Null,
                TokenType::Sizeof,
                TokenType::Identifier("x_1".to_string()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_leading_whitespace_only_at_line_start() {
        let types = raw_types("  a  b\n    c");
        assert_eq!(
            types,
            vec![
                TokenType::Whitespace(2),
                TokenType::Identifier("a".to_string()),
                TokenType::Identifier("b".to_string()),
                TokenType::Newline,
                TokenType::Whitespace(4),
                TokenType::Identifier("c".to_string()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_newlines_collapse_and_comments_vanish() {
        let types = raw_types("a # trailing\n\n\nb");
        assert_eq!(
            types,
            vec![
                TokenType::Identifier("a".to_string()),
                TokenType::Newline,
                TokenType::Identifier("b".to_string()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_brackets_suppress_layout() {
        let types = raw_types("f(a,\n      b)\n[1,\n  2]");
        assert_eq!(
            types,
            vec![
                TokenType::Identifier("f".to_string()),
                TokenType::LeftParen,
                TokenType::Identifier("a".to_string()),
                TokenType::Comma,
                TokenType::Identifier("b".to_string()),
                TokenType::RightParen,
                TokenType::Newline,
                TokenType::LeftBracket,
                TokenType::IntLiteral(1),
                TokenType::Comma,
                TokenType::IntLiteral(2),
                TokenType::RightBracket,
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let mut lexer = Lexer::new("x = 1\n  yy");
        let x = lexer.next_token().unwrap();
        assert_eq!((x.line(), x.column()), (1, 1));
        let eq = lexer.next_token().unwrap();
        assert_eq!((eq.line(), eq.column()), (1, 3));
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let yy = lexer.next_token().unwrap();
        assert_eq!(yy.token_type, TokenType::Identifier("yy".to_string()));
        assert_eq!((yy.line(), yy.column()), (2, 3));
    }

    #[test]
    fn test_unknown_symbol() {
        let mut lexer = Lexer::new("x = $");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.message(), "Unknown symbol '$' at (1, 5)");
    }

    #[test]
    fn test_crlf_lines_match_lf_lines() {
        let crlf = raw_types("if x:\r\n    pass\r\n\r\ny");
        assert_eq!(crlf, raw_types("if x:\n    pass\n\ny"));
        assert_eq!(crlf[3], TokenType::Newline);
        assert_eq!(crlf[4], TokenType::Whitespace(4));

        let mut lexer = Lexer::new("a\r\n  b");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        assert_eq!((b.line(), b.column()), (2, 3));
    }

    #[test]
    fn test_keyword_spellings() {
        for word in ["def", "switch", "ifndef", "typedef", "NULL", "not"] {
            let token_type = TokenType::keyword(word).unwrap();
            assert_eq!(token_type.to_string(), word);
        }
        assert_eq!(TokenType::keyword("null"), None);
        assert_eq!(TokenType::Arrow.to_string(), "->");
        assert_eq!(TokenType::LeftBrace.to_string(), "{");
        assert_eq!(TokenType::Newline.to_string(), "NEWLINE");
        assert_eq!(TokenType::Identifier("x".to_string()).spelling(), None);
    }
}
