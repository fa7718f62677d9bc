//! Statement AST nodes, declarations and the module root

use super::expressions::Expression;
use super::types::TypeExpr;
use crate::ast::NodeId;
use crate::types::ValueType;
use cu_common::SourceSpan;
use serde::{Deserialize, Serialize};

/// Root of one parsed (or decorated) source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub filename: String,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub node_id: NodeId,
    pub kind: StatementKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    Expression(Expression),

    /// `name: T [= init]`, or an inferred declaration in the decorated tree
    VarDecl(VarDecl),

    /// `target = value` where the target is already declared
    Assign {
        target: Expression,
        value: Expression,
    },

    FunctionDecl(FunctionDecl),
    FunctionDef(FunctionDef),

    Return(Option<Expression>),

    /// `elif` is an `If` that is the only statement of `orelse`
    If {
        condition: Expression,
        body: Vec<Statement>,
        orelse: Vec<Statement>,
    },

    /// `orelse` runs when the condition turns false
    While {
        condition: Expression,
        body: Vec<Statement>,
        orelse: Vec<Statement>,
    },

    DoWhile {
        body: Vec<Statement>,
        condition: Expression,
    },

    Switch {
        subject: Expression,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Statement>>,
    },

    Break,
    Pass,

    Struct {
        name: String,
        fields: Vec<Field>,
    },

    Enum {
        name: String,
        members: Vec<String>,
    },

    /// `typedef <target> <name>`
    Typedef {
        target: TypeExpr,
        name: String,
    },

    /// `define NAME [value]`
    Define {
        name: String,
        value: Option<Expression>,
    },

    Include(String),
    Ifndef(String),
    Endif,
}

impl Statement {
    pub fn new(node_id: NodeId, kind: StatementKind, span: SourceSpan) -> Self {
        Self { node_id, kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub declared_type: Option<TypeExpr>,
    pub init: Option<Expression>,
    pub value_type: Option<ValueType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: TypeExpr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub values: Vec<Expression>,
    pub body: Vec<Statement>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterKind {
    Named {
        name: String,
        declared_type: Option<TypeExpr>,
    },
    /// `...`
    Vararg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub span: SourceSpan,
    pub value_type: Option<ValueType>,
}

impl Parameter {
    pub fn named(name: &str, declared_type: Option<TypeExpr>, span: SourceSpan) -> Self {
        Self {
            kind: ParameterKind::Named {
                name: name.to_string(),
                declared_type,
            },
            span,
            value_type: None,
        }
    }

    pub fn vararg(span: SourceSpan) -> Self {
        Self {
            kind: ParameterKind::Vararg,
            span,
            value_type: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Named { name, .. } => Some(name),
            ParameterKind::Vararg => None,
        }
    }

    pub fn declared_type(&self) -> Option<&TypeExpr> {
        match &self.kind {
            ParameterKind::Named { declared_type, .. } => declared_type.as_ref(),
            ParameterKind::Vararg => None,
        }
    }
}

/// `def name(params) [-> T]` without a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Option<TypeExpr>,
    pub signature: Option<ValueType>,
}

/// `def name(params) [-> T]:` followed by a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Option<TypeExpr>,
    pub body: Vec<Statement>,
    pub signature: Option<ValueType>,
}
