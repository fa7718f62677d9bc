//! Operator precedence table
//!
//! Levels run from loosest (1) to tightest. Binary operators are listed
//! row by row; the prefix and postfix tiers sit above all of them.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

pub struct PrecedenceRow {
    pub level: u8,
    pub associativity: Associativity,
    pub operators: &'static [(TokenType, BinaryOp)],
}

pub const BINARY_PRECEDENCE: &[PrecedenceRow] = &[
    PrecedenceRow {
        level: 1,
        associativity: Associativity::Left,
        operators: &[(TokenType::Or, BinaryOp::LogicalOr)],
    },
    PrecedenceRow {
        level: 2,
        associativity: Associativity::Left,
        operators: &[(TokenType::And, BinaryOp::LogicalAnd)],
    },
    PrecedenceRow {
        level: 3,
        associativity: Associativity::Left,
        operators: &[(TokenType::Pipe, BinaryOp::BitOr)],
    },
    PrecedenceRow {
        level: 4,
        associativity: Associativity::Left,
        operators: &[(TokenType::Caret, BinaryOp::BitXor)],
    },
    PrecedenceRow {
        level: 5,
        associativity: Associativity::Left,
        operators: &[(TokenType::Ampersand, BinaryOp::BitAnd)],
    },
    PrecedenceRow {
        level: 6,
        associativity: Associativity::Left,
        operators: &[
            (TokenType::EqualEqual, BinaryOp::Equal),
            (TokenType::BangEqual, BinaryOp::NotEqual),
        ],
    },
    PrecedenceRow {
        level: 7,
        associativity: Associativity::Left,
        operators: &[
            (TokenType::Less, BinaryOp::Less),
            (TokenType::Greater, BinaryOp::Greater),
            (TokenType::LessEqual, BinaryOp::LessEqual),
            (TokenType::GreaterEqual, BinaryOp::GreaterEqual),
        ],
    },
    PrecedenceRow {
        level: 8,
        associativity: Associativity::Left,
        operators: &[
            (TokenType::LeftShift, BinaryOp::LeftShift),
            (TokenType::RightShift, BinaryOp::RightShift),
        ],
    },
    PrecedenceRow {
        level: 9,
        associativity: Associativity::Left,
        operators: &[(TokenType::Plus, BinaryOp::Add), (TokenType::Minus, BinaryOp::Sub)],
    },
    PrecedenceRow {
        level: 10,
        associativity: Associativity::Left,
        operators: &[
            (TokenType::Star, BinaryOp::Mul),
            (TokenType::Slash, BinaryOp::Div),
            (TokenType::Percent, BinaryOp::Mod),
        ],
    },
];

/// Unary operators, casts, pre-increment/decrement (right associative)
pub const PREFIX_LEVEL: u8 = 11;

/// Post-increment/decrement, member access, indexing, calls (left associative)
pub const POSTFIX_LEVEL: u8 = 12;

/// Binary operator for `token_type` with its level and associativity
pub fn binary_operator(token_type: &TokenType) -> Option<(BinaryOp, u8, Associativity)> {
    BINARY_PRECEDENCE.iter().find_map(|row| {
        row.operators
            .iter()
            .find(|(token, _)| token == token_type)
            .map(|(_, op)| (*op, row.level, row.associativity))
    })
}

/// Prefix operator spelled by `token_type`. Casts (`<T>`) are handled
/// separately because they carry a type.
pub fn prefix_operator(token_type: &TokenType) -> Option<UnaryOp> {
    let op = match token_type {
        TokenType::Plus => UnaryOp::Plus,
        TokenType::Minus => UnaryOp::Minus,
        TokenType::Not => UnaryOp::LogicalNot,
        TokenType::Tilde => UnaryOp::BitNot,
        TokenType::Ampersand => UnaryOp::AddressOf,
        TokenType::Star => UnaryOp::Dereference,
        TokenType::PlusPlus => UnaryOp::PreIncrement,
        TokenType::MinusMinus => UnaryOp::PreDecrement,
        _ => return None,
    };
    Some(op)
}

pub fn is_postfix_operator(token_type: &TokenType) -> bool {
    matches!(
        token_type,
        TokenType::PlusPlus
            | TokenType::MinusMinus
            | TokenType::Dot
            | TokenType::Arrow
            | TokenType::LeftBracket
            | TokenType::LeftParen
    )
}

/// Binding level of an expression node, used when printing to decide
/// where parentheses are required.
pub fn binary_level(op: BinaryOp) -> u8 {
    BINARY_PRECEDENCE
        .iter()
        .find(|row| row.operators.iter().any(|(_, candidate)| *candidate == op))
        .map(|row| row.level)
        .unwrap_or(PREFIX_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_increase_with_binding_strength() {
        let or = binary_operator(&TokenType::Or).map(|(_, level, _)| level);
        let mul = binary_operator(&TokenType::Star).map(|(_, level, _)| level);
        assert!(or < mul);
        assert!(mul < Some(PREFIX_LEVEL));
        assert!(PREFIX_LEVEL < POSTFIX_LEVEL);
    }

    #[test]
    fn test_every_binary_op_has_one_level() {
        assert_eq!(binary_level(BinaryOp::Add), 9);
        assert_eq!(binary_level(BinaryOp::LogicalOr), 1);
        assert_eq!(binary_level(BinaryOp::GreaterEqual), 7);
        assert!(binary_operator(&TokenType::Dot).is_none());
    }
}
