//! Operator and punctuation scanning

use crate::lexer::{Lexer, TokenType};
use cu_common::CompilerError;

impl Lexer {
    /// Consume `second` if it is the next character
    fn follow(&mut self, second: char, matched: TokenType, otherwise: TokenType) -> TokenType {
        if self.current_char() == Some(second) {
            self.advance();
            matched
        } else {
            otherwise
        }
    }

    pub fn tokenize_operator(&mut self) -> Result<TokenType, CompilerError> {
        let location = self.tracker.location();
        let Some(ch) = self.advance() else {
            return Ok(TokenType::EndOfFile);
        };

        let token_type = match ch {
            '+' => self.follow('+', TokenType::PlusPlus, TokenType::Plus),
            '-' => match self.current_char() {
                Some('-') => {
                    self.advance();
                    TokenType::MinusMinus
                }
                Some('>') => {
                    self.advance();
                    TokenType::Arrow
                }
                _ => TokenType::Minus,
            },
            '*' => TokenType::Star,
            '/' => TokenType::Slash,
            '%' => TokenType::Percent,
            '&' => TokenType::Ampersand,
            '|' => TokenType::Pipe,
            '^' => TokenType::Caret,
            '~' => TokenType::Tilde,
            '=' => self.follow('=', TokenType::EqualEqual, TokenType::Equal),
            '<' => match self.current_char() {
                Some('<') => {
                    self.advance();
                    TokenType::LeftShift
                }
                Some('=') => {
                    self.advance();
                    TokenType::LessEqual
                }
                _ => TokenType::Less,
            },
            '>' => match self.current_char() {
                Some('>') => {
                    self.advance();
                    TokenType::RightShift
                }
                Some('=') => {
                    self.advance();
                    TokenType::GreaterEqual
                }
                _ => TokenType::Greater,
            },
            '!' if self.current_char() == Some('=') => {
                self.advance();
                TokenType::BangEqual
            }
            '.' if self.current_char() == Some('.') && self.peek_char(1) == Some('.') => {
                self.advance();
                self.advance();
                TokenType::Ellipsis
            }
            '.' => TokenType::Dot,
            ':' => TokenType::Colon,
            ',' => TokenType::Comma,
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            other => {
                return Err(CompilerError::lexer_error(
                    format!(
                        "Unknown symbol '{}' at ({}, {})",
                        other, location.line, location.column
                    ),
                    location,
                ));
            }
        };

        Ok(token_type)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{Lexer, TokenType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("+ - * / % == != <= >= << >> ++ -- -> ... . & | ^ ~ < > =");
        let expected = vec![
            TokenType::Plus, TokenType::Minus, TokenType::Star, TokenType::Slash,
            TokenType::Percent, TokenType::EqualEqual, TokenType::BangEqual,
            TokenType::LessEqual, TokenType::GreaterEqual, TokenType::LeftShift,
            TokenType::RightShift, TokenType::PlusPlus, TokenType::MinusMinus,
            TokenType::Arrow, TokenType::Ellipsis, TokenType::Dot, TokenType::Ampersand,
            TokenType::Pipe, TokenType::Caret, TokenType::Tilde, TokenType::Less,
            TokenType::Greater, TokenType::Equal, TokenType::EndOfFile,
        ];

        for expected_type in expected {
            assert_eq!(lexer.next_token().unwrap().token_type, expected_type);
        }
    }

    #[test]
    fn test_lone_bang_is_unknown() {
        let err = Lexer::new("!x").next_token().unwrap_err();
        assert_eq!(err.message(), "Unknown symbol '!' at (1, 1)");
    }
}
