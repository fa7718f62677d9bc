//! Type expressions as written in source
//!
//! These are syntax only. The checker resolves them into
//! [`ValueType`](crate::types::ValueType)s against the scope's type table.

use super::expressions::{Expression, ExpressionKind};
use cu_common::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExprKind {
    /// `int`, `size_t`, `Node`
    Name(String),

    /// `T[]`
    Pointer(Box<TypeExpr>),

    /// `T[N]`
    Array {
        element: Box<TypeExpr>,
        size: Box<Expression>,
    },

    /// `(T1, T2) -> R`
    Callable {
        params: Vec<TypeExpr>,
        returns: Box<TypeExpr>,
    },

    /// `...`
    Vararg,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    pub fn name(name: &str, span: SourceSpan) -> Self {
        Self::new(TypeExprKind::Name(name.to_string()), span)
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        let span = inner.span.clone();
        Self::new(TypeExprKind::Pointer(Box::new(inner)), span)
    }

    pub fn is_vararg(&self) -> bool {
        matches!(self.kind, TypeExprKind::Vararg)
    }

    /// Structural comparison that ignores spans and node ids
    pub fn same_shape(&self, other: &TypeExpr) -> bool {
        match (&self.kind, &other.kind) {
            (TypeExprKind::Name(a), TypeExprKind::Name(b)) => a == b,
            (TypeExprKind::Pointer(a), TypeExprKind::Pointer(b)) => a.same_shape(b),
            (
                TypeExprKind::Array { element: a, size: sa },
                TypeExprKind::Array { element: b, size: sb },
            ) => {
                let sizes_match = match (&sa.kind, &sb.kind) {
                    (ExpressionKind::IntLiteral(x), ExpressionKind::IntLiteral(y)) => x == y,
                    (ExpressionKind::Name(x), ExpressionKind::Name(y)) => x == y,
                    _ => false,
                };
                sizes_match && a.same_shape(b)
            }
            (
                TypeExprKind::Callable { params: pa, returns: ra },
                TypeExprKind::Callable { params: pb, returns: rb },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(a, b)| a.same_shape(b))
                    && ra.same_shape(rb)
            }
            (TypeExprKind::Vararg, TypeExprKind::Vararg) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Name(name) => write!(f, "{}", name),
            TypeExprKind::Vararg => write!(f, "..."),
            TypeExprKind::Callable { params, returns } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", returns)
            }
            TypeExprKind::Pointer(inner) => {
                write_suffix_base(f, inner)?;
                write!(f, "[]")
            }
            TypeExprKind::Array { element, size } => {
                write_suffix_base(f, element)?;
                write!(f, "[{}]", crate::formatter::format_expression(size))
            }
        }
    }
}

/// Callable types need `{}` before a suffix can attach to them
fn write_suffix_base(f: &mut fmt::Formatter<'_>, base: &TypeExpr) -> fmt::Result {
    if matches!(base.kind, TypeExprKind::Callable { .. }) {
        write!(f, "{{{}}}", base)
    } else {
        write!(f, "{}", base)
    }
}
