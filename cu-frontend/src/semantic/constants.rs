//! Integer constant folding for array sizes, `define`s and case labels

use crate::ast::{BinaryOp, Expression, ExpressionKind, UnaryOp};
use std::collections::BTreeMap;

/// Value of `expr` if it folds to an integer with the known constants.
/// Overflow and division by zero make the expression non-constant.
pub fn fold(expr: &Expression, constants: &BTreeMap<String, i64>) -> Option<i64> {
    match &expr.kind {
        ExpressionKind::IntLiteral(value) => Some(*value),
        ExpressionKind::CharLiteral(value) => Some(i64::from(*value)),
        ExpressionKind::Name(name) => constants.get(name).copied(),

        ExpressionKind::Unary { op, operand } => {
            let value = fold(operand, constants)?;
            match op {
                UnaryOp::Plus => Some(value),
                UnaryOp::Minus => value.checked_neg(),
                UnaryOp::BitNot => Some(!value),
                UnaryOp::LogicalNot => Some(i64::from(value == 0)),
                _ => None,
            }
        }

        ExpressionKind::Binary { op, left, right } => {
            let l = fold(left, constants)?;
            let r = fold(right, constants)?;
            match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Sub => l.checked_sub(r),
                BinaryOp::Mul => l.checked_mul(r),
                BinaryOp::Div => l.checked_div(r),
                BinaryOp::Mod => l.checked_rem(r),
                BinaryOp::BitAnd => Some(l & r),
                BinaryOp::BitOr => Some(l | r),
                BinaryOp::BitXor => Some(l ^ r),
                BinaryOp::LeftShift => u32::try_from(r).ok().and_then(|r| l.checked_shl(r)),
                BinaryOp::RightShift => u32::try_from(r).ok().and_then(|r| l.checked_shr(r)),
                BinaryOp::LogicalAnd => Some(i64::from(l != 0 && r != 0)),
                BinaryOp::LogicalOr => Some(i64::from(l != 0 || r != 0)),
                BinaryOp::Equal => Some(i64::from(l == r)),
                BinaryOp::NotEqual => Some(i64::from(l != r)),
                BinaryOp::Less => Some(i64::from(l < r)),
                BinaryOp::Greater => Some(i64::from(l > r)),
                BinaryOp::LessEqual => Some(i64::from(l <= r)),
                BinaryOp::GreaterEqual => Some(i64::from(l >= r)),
            }
        }

        _ => None,
    }
}
