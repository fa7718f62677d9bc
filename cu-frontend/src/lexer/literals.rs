//! Numeric, character and string literals

use crate::lexer::{Lexer, TokenType};
use cu_common::CompilerError;

impl Lexer {
    fn take_digits(&mut self, text: &mut String, radix: u32) {
        while let Some(ch) = self.current_char() {
            if ch.is_digit(radix) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Integer (decimal or `0x` hex) or float (`1.5`, `2.0e3`) literal
    pub fn tokenize_number(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.tracker.location();
        let mut number = String::new();

        if self.current_char() == Some('0') && matches!(self.peek_char(1), Some('x' | 'X')) {
            self.advance();
            self.advance();
            self.take_digits(&mut number, 16);
            return i64::from_str_radix(&number, 16)
                .map(TokenType::IntLiteral)
                .map_err(|_| CompilerError::lexer_error(format!("Invalid hex literal: 0x{}", number), start));
        }

        self.take_digits(&mut number, 10);

        let mut is_float = false;
        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            number.push('.');
            self.advance();
            self.take_digits(&mut number, 10);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let signed = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                number.push('e');
                self.advance();
                if signed {
                    if let Some(sign) = self.advance() {
                        number.push(sign);
                    }
                }
                self.take_digits(&mut number, 10);
            }
        }

        if is_float {
            number
                .parse::<f64>()
                .map(TokenType::FloatLiteral)
                .map_err(|_| CompilerError::lexer_error(format!("Invalid float literal: {}", number), start))
        } else {
            number
                .parse::<i64>()
                .map(TokenType::IntLiteral)
                .map_err(|_| CompilerError::lexer_error(format!("Invalid integer literal: {}", number), start))
        }
    }

    /// Escape sequence after a backslash; the backslash is already consumed
    fn read_escape(&mut self, quote: char) -> Result<char, CompilerError> {
        let location = self.tracker.location();
        let escaped = match self.advance() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some(c) => {
                return Err(CompilerError::lexer_error(
                    format!("Invalid escape sequence: \\{}", c),
                    location,
                ))
            }
            None => {
                let what = if quote == '\'' { "character" } else { "string" };
                return Err(CompilerError::lexer_error(
                    format!("Unterminated {} literal", what),
                    location,
                ));
            }
        };
        Ok(escaped)
    }

    pub fn tokenize_char_literal(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.tracker.location();
        self.advance();

        let ch = match self.advance() {
            Some('\\') => self.read_escape('\'')?,
            Some('\'') => {
                return Err(CompilerError::lexer_error("Empty character literal".to_string(), start));
            }
            Some('\n') | None => {
                return Err(CompilerError::lexer_error("Unterminated character literal".to_string(), start));
            }
            Some(ch) => ch,
        };

        if !ch.is_ascii() {
            return Err(CompilerError::lexer_error(
                format!("Character literal '{}' is not ASCII", ch),
                start,
            ));
        }
        if self.advance() != Some('\'') {
            return Err(CompilerError::lexer_error("Unterminated character literal".to_string(), start));
        }

        Ok(TokenType::CharLiteral(ch as u8))
    }

    /// `"..."` on a single line, or `"""..."""` spanning lines
    pub fn tokenize_string_literal(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.tracker.location();
        let triple = self.peek_char(1) == Some('"') && self.peek_char(2) == Some('"');
        let quotes = if triple { 3 } else { 1 };
        for _ in 0..quotes {
            self.advance();
        }

        let mut string = String::new();
        loop {
            match self.current_char() {
                None => break,
                Some('\n') if !triple => break,
                Some('"') if !triple => {
                    self.advance();
                    return Ok(TokenType::StringLiteral(string));
                }
                Some('"') if self.peek_char(1) == Some('"') && self.peek_char(2) == Some('"') => {
                    for _ in 0..3 {
                        self.advance();
                    }
                    return Ok(TokenType::StringLiteral(string));
                }
                Some('\\') => {
                    self.advance();
                    string.push(self.read_escape('"')?);
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(CompilerError::lexer_error("Unterminated string literal".to_string(), start))
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{Lexer, TokenType};
    use pretty_assertions::assert_eq;

    fn first(input: &str) -> TokenType {
        Lexer::new(input).next_token().unwrap().token_type
    }

    #[test]
    fn test_numbers() {
        assert_eq!(first("42"), TokenType::IntLiteral(42));
        assert_eq!(first("0xff"), TokenType::IntLiteral(255));
        assert_eq!(first("2.0"), TokenType::FloatLiteral(2.0));
        assert_eq!(first("1.5e2"), TokenType::FloatLiteral(150.0));
        assert_eq!(first("3e-1"), TokenType::FloatLiteral(0.3));
    }

    #[test]
    fn test_member_access_on_int_is_not_float() {
        let mut lexer = Lexer::new("1.x");
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::IntLiteral(1));
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::Dot);
    }

    #[test]
    fn test_char_escapes() {
        assert_eq!(first("'a'"), TokenType::CharLiteral(b'a'));
        assert_eq!(first(r"'\n'"), TokenType::CharLiteral(b'\n'));
        assert_eq!(first(r"'\0'"), TokenType::CharLiteral(0));
        assert_eq!(first(r"'\''"), TokenType::CharLiteral(b'\''));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            first(r#""hello\tworld""#),
            TokenType::StringLiteral("hello\tworld".to_string())
        );
        assert_eq!(
            first("\"\"\"\nmultiline\n    comment\n\"\"\""),
            TokenType::StringLiteral("\nmultiline\n    comment\n".to_string())
        );
    }

    #[test]
    fn test_unterminated_literals() {
        let err = Lexer::new("\"abc\nd\"").next_token().unwrap_err();
        assert_eq!(err.message(), "Unterminated string literal");

        let err = Lexer::new("'ab'").next_token().unwrap_err();
        assert_eq!(err.message(), "Unterminated character literal");
    }
}
