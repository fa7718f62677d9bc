//! Expression AST nodes

use super::ops::{BinaryOp, UnaryOp};
use super::types::TypeExpr;
use crate::ast::NodeId;
use crate::types::ValueType;
use cu_common::SourceSpan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub node_id: NodeId,
    pub kind: ExpressionKind,
    pub span: SourceSpan,
    pub expr_type: Option<ValueType>, // Filled in the decorated tree only
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(u8),
    StringLiteral(String),
    Null,

    Name(String),

    /// `[a, b, c]`
    ArrayLiteral(Vec<Expression>),

    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },

    /// `a.m` or `p->m`
    Member {
        object: Box<Expression>,
        member: String,
        is_pointer: bool,
    },

    /// `<T> operand`
    Cast {
        target: TypeExpr,
        operand: Box<Expression>,
    },

    /// `sizeof(T)`; the argument is a type, never an expression
    Sizeof(TypeExpr),
}

impl Expression {
    pub fn new(node_id: NodeId, kind: ExpressionKind, span: SourceSpan) -> Self {
        Self {
            node_id,
            kind,
            span,
            expr_type: None,
        }
    }

    /// Same node carrying its resolved type
    pub fn typed(self, value_type: ValueType) -> Self {
        Self {
            expr_type: Some(value_type),
            ..self
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::IntLiteral(_)
                | ExpressionKind::FloatLiteral(_)
                | ExpressionKind::CharLiteral(_)
                | ExpressionKind::StringLiteral(_)
                | ExpressionKind::ArrayLiteral(_)
                | ExpressionKind::Null
        )
    }

    /// Whether the expression designates storage that can be assigned to
    pub fn is_lvalue(&self) -> bool {
        match &self.kind {
            ExpressionKind::Name(_) | ExpressionKind::Index { .. } | ExpressionKind::Member { .. } => true,
            ExpressionKind::Unary { op, .. } => *op == UnaryOp::Dereference,
            _ => false,
        }
    }
}
