//! Abstract syntax tree
//!
//! The parser builds these nodes; the checker returns a decorated copy in
//! which every expression carries its `expr_type` and inferred declarations
//! are spelled out. Three families of nodes exist: statements, type
//! expressions and value expressions.

pub mod expressions;
pub mod ops;
pub mod statements;
pub mod types;

pub use expressions::{Expression, ExpressionKind};
pub use ops::{BinaryOp, UnaryOp};
pub use statements::{
    Field, FunctionDecl, FunctionDef, Module, Parameter, ParameterKind, Statement, StatementKind,
    SwitchCase, VarDecl,
};
pub use types::{TypeExpr, TypeExprKind};

/// Unique identifier for AST nodes
pub type NodeId = u32;

#[derive(Debug, Clone, Default)]
pub struct NodeIdGenerator {
    next_id: NodeId,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    pub fn next(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
