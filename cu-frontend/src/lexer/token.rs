//! Token definitions for the cu tokenizer

use cu_common::{SourceLocation, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    // Literals
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(u8),
    StringLiteral(String),

    Identifier(String),

    // Keywords
    Def, Pass, If, Elif, Else, While, Do, Switch, Case, Return, Break,
    Not, And, Or, Define, Include, Ifndef, Endif, Enum, Struct, Typedef,
    Sizeof, Null,

    // Operators
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    Percent,        // %
    Ampersand,      // &
    Pipe,           // |
    Caret,          // ^
    Tilde,          // ~
    Equal,          // =
    Less,           // <
    Greater,        // >
    Colon,          // :

    PlusPlus,       // ++
    MinusMinus,     // --
    LeftShift,      // <<
    RightShift,     // >>
    LessEqual,      // <=
    GreaterEqual,   // >=
    EqualEqual,     // ==
    BangEqual,      // !=

    // Delimiters
    LeftParen,      // (
    RightParen,     // )
    LeftBrace,      // {
    RightBrace,     // }
    LeftBracket,    // [
    RightBracket,   // ]
    Comma,          // ,
    Dot,            // .
    Arrow,          // ->
    Ellipsis,       // ...

    // Layout. `Whitespace` only exists between the raw scanner and the
    // indentation filter; it never reaches the parser.
    Whitespace(usize),
    Newline,
    Indent,
    Dedent,
    EndOfFile,
}

/// Keywords and their spellings
const KEYWORDS: &[(&str, TokenType)] = &[
    ("def", TokenType::Def),
    ("pass", TokenType::Pass),
    ("if", TokenType::If),
    ("elif", TokenType::Elif),
    ("else", TokenType::Else),
    ("while", TokenType::While),
    ("do", TokenType::Do),
    ("switch", TokenType::Switch),
    ("case", TokenType::Case),
    ("return", TokenType::Return),
    ("break", TokenType::Break),
    ("not", TokenType::Not),
    ("and", TokenType::And),
    ("or", TokenType::Or),
    ("define", TokenType::Define),
    ("include", TokenType::Include),
    ("ifndef", TokenType::Ifndef),
    ("endif", TokenType::Endif),
    ("enum", TokenType::Enum),
    ("struct", TokenType::Struct),
    ("typedef", TokenType::Typedef),
    ("sizeof", TokenType::Sizeof),
    ("NULL", TokenType::Null),
];

/// Operator and delimiter spellings, used for display
const SYMBOLS: &[(&str, TokenType)] = &[
    ("+", TokenType::Plus),
    ("-", TokenType::Minus),
    ("*", TokenType::Star),
    ("/", TokenType::Slash),
    ("%", TokenType::Percent),
    ("&", TokenType::Ampersand),
    ("|", TokenType::Pipe),
    ("^", TokenType::Caret),
    ("~", TokenType::Tilde),
    ("=", TokenType::Equal),
    ("<", TokenType::Less),
    (">", TokenType::Greater),
    (":", TokenType::Colon),
    ("++", TokenType::PlusPlus),
    ("--", TokenType::MinusMinus),
    ("<<", TokenType::LeftShift),
    (">>", TokenType::RightShift),
    ("<=", TokenType::LessEqual),
    (">=", TokenType::GreaterEqual),
    ("==", TokenType::EqualEqual),
    ("!=", TokenType::BangEqual),
    ("(", TokenType::LeftParen),
    (")", TokenType::RightParen),
    ("{", TokenType::LeftBrace),
    ("}", TokenType::RightBrace),
    ("[", TokenType::LeftBracket),
    ("]", TokenType::RightBracket),
    (",", TokenType::Comma),
    (".", TokenType::Dot),
    ("->", TokenType::Arrow),
    ("...", TokenType::Ellipsis),
];

impl TokenType {
    /// Keyword lookup for an identifier-shaped lexeme
    pub fn keyword(lexeme: &str) -> Option<TokenType> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == lexeme)
            .map(|(_, token_type)| token_type.clone())
    }

    /// Source spelling of a keyword, operator or delimiter
    pub fn spelling(&self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .chain(SYMBOLS)
            .find(|(_, token_type)| token_type == self)
            .map(|(spelling, _)| *spelling)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::IntLiteral(n) => write!(f, "{n}"),
            TokenType::FloatLiteral(n) => write!(f, "{n:?}"),
            TokenType::CharLiteral(c) => write!(f, "'{}'", (*c as char).escape_default()),
            TokenType::StringLiteral(s) => write!(f, "\"{}\"", s.escape_default()),
            TokenType::Identifier(s) => write!(f, "{s}"),
            TokenType::Whitespace(width) => write!(f, "WS({width})"),
            TokenType::Newline => write!(f, "NEWLINE"),
            TokenType::Indent => write!(f, "INDENT"),
            TokenType::Dedent => write!(f, "DEDENT"),
            TokenType::EndOfFile => write!(f, "EOF"),
            other => match other.spelling() {
                Some(spelling) => f.write_str(spelling),
                None => write!(f, "{other:?}"),
            },
        }
    }
}

/// A token with location information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, span: SourceSpan) -> Self {
        Self { token_type, span }
    }

    /// Zero-width token at `location`, used for synthesized layout tokens
    pub fn synthetic(token_type: TokenType, location: SourceLocation) -> Self {
        Self {
            token_type,
            span: SourceSpan::from_location(location),
        }
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.token_type, self.span.start)
    }
}
