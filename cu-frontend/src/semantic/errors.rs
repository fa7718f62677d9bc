//! Semantic analysis error definitions

use crate::types::{TypeError, ValueType};
use cu_common::{CompilerError, SourceLocation};
use thiserror::Error;

/// Semantic analysis errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("Undefined name '{name}'")]
    UndefinedName { name: String, location: SourceLocation },

    #[error("Unknown type '{name}'")]
    UnknownType { name: String, location: SourceLocation },

    #[error("{error}")]
    TypeRule { error: TypeError, location: SourceLocation },

    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: ValueType,
        found: ValueType,
        location: SourceLocation,
    },

    #[error("'{name}' redeclared as {found}, previously declared as {previous}")]
    Redeclaration {
        name: String,
        previous: ValueType,
        found: ValueType,
        location: SourceLocation,
    },

    #[error("Cannot infer the type of '{name}' from a value of type {found}")]
    CannotInfer {
        name: String,
        found: ValueType,
        location: SourceLocation,
    },

    #[error("Function '{name}' is already defined")]
    FunctionRedefinition { name: String, location: SourceLocation },

    #[error("'{name}' is already declared as {previous}, not as a function")]
    NotAFunction {
        name: String,
        previous: ValueType,
        location: SourceLocation,
    },

    #[error("Definition of '{name}' does not match its declaration: {detail}")]
    SignatureMismatch {
        name: String,
        detail: String,
        location: SourceLocation,
    },

    #[error("Parameter '{param}' of '{function}' needs a type annotation")]
    MissingAnnotation {
        function: String,
        param: String,
        location: SourceLocation,
    },

    #[error("Duplicate parameter '{param}' in '{function}'")]
    DuplicateParameter {
        function: String,
        param: String,
        location: SourceLocation,
    },

    #[error("Invalid variadic parameters in '{function}': {detail}")]
    InvalidVararg {
        function: String,
        detail: String,
        location: SourceLocation,
    },

    #[error("'{function}' expects {expected} arguments, found {found}")]
    ArgumentCount {
        function: String,
        expected: String,
        found: usize,
        location: SourceLocation,
    },

    #[error("Value of type {found} is not callable")]
    NotCallable { found: ValueType, location: SourceLocation },

    #[error("Invalid operand of type {found} for '{operator}'")]
    InvalidOperand {
        operator: String,
        found: ValueType,
        location: SourceLocation,
    },

    #[error("Invalid operands {left} and {right} for '{operator}'")]
    InvalidOperands {
        operator: String,
        left: ValueType,
        right: ValueType,
        location: SourceLocation,
    },

    #[error("Cannot assign to {what}")]
    NotAssignable { what: String, location: SourceLocation },

    #[error("Type {type_name} has no member '{member}'")]
    NoMember {
        type_name: String,
        member: String,
        location: SourceLocation,
    },

    #[error("Member access '{operator}' on non-struct type {found}")]
    NotAStruct {
        operator: String,
        found: ValueType,
        location: SourceLocation,
    },

    #[error("Condition of {context} has type {found}, which cannot be tested")]
    NotTestable {
        context: String,
        found: ValueType,
        location: SourceLocation,
    },

    #[error("Cannot cast {from} to {to}")]
    InvalidCast {
        from: ValueType,
        to: ValueType,
        location: SourceLocation,
    },

    #[error("Invalid array size: {detail}")]
    InvalidArraySize { detail: String, location: SourceLocation },

    #[error("Struct '{name}' {detail}")]
    InvalidStruct {
        name: String,
        detail: String,
        location: SourceLocation,
    },

    #[error("'{statement}' is only allowed {place}")]
    Misplaced {
        statement: String,
        place: String,
        location: SourceLocation,
    },

    #[error("Cannot find include '{path}'")]
    IncludeNotFound { path: String, location: SourceLocation },

    #[error("Include cycle: {chain}")]
    IncludeCycle { chain: String, location: SourceLocation },

    #[error("Cannot read '{path}': {message}")]
    Io {
        path: String,
        message: String,
        location: SourceLocation,
    },
}

impl SemanticError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            SemanticError::UndefinedName { location, .. }
            | SemanticError::UnknownType { location, .. }
            | SemanticError::TypeRule { location, .. }
            | SemanticError::TypeMismatch { location, .. }
            | SemanticError::Redeclaration { location, .. }
            | SemanticError::CannotInfer { location, .. }
            | SemanticError::FunctionRedefinition { location, .. }
            | SemanticError::NotAFunction { location, .. }
            | SemanticError::SignatureMismatch { location, .. }
            | SemanticError::MissingAnnotation { location, .. }
            | SemanticError::DuplicateParameter { location, .. }
            | SemanticError::InvalidVararg { location, .. }
            | SemanticError::ArgumentCount { location, .. }
            | SemanticError::NotCallable { location, .. }
            | SemanticError::InvalidOperand { location, .. }
            | SemanticError::InvalidOperands { location, .. }
            | SemanticError::NotAssignable { location, .. }
            | SemanticError::NoMember { location, .. }
            | SemanticError::NotAStruct { location, .. }
            | SemanticError::NotTestable { location, .. }
            | SemanticError::InvalidCast { location, .. }
            | SemanticError::InvalidArraySize { location, .. }
            | SemanticError::InvalidStruct { location, .. }
            | SemanticError::Misplaced { location, .. }
            | SemanticError::IncludeNotFound { location, .. }
            | SemanticError::IncludeCycle { location, .. }
            | SemanticError::Io { location, .. } => location,
        }
    }

    pub(crate) fn type_rule(error: TypeError, location: &SourceLocation) -> Self {
        SemanticError::TypeRule {
            error,
            location: location.clone(),
        }
    }
}

impl From<SemanticError> for CompilerError {
    fn from(err: SemanticError) -> Self {
        let location = err.location().clone();
        CompilerError::semantic_error(err.to_string(), location)
    }
}
