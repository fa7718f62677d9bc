//! Value types
//!
//! The resolved types the checker attaches to expressions. Types compare
//! structurally except structs, which are nominal. The `NULL`/pointer and
//! `void[]`/pointer relations are assignment rules
//! ([`ValueType::assignment_equal`]), never part of `==`.

pub mod table;

pub use table::{TypeEntry, TypeTable};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const VOID: &str = "void";
pub const CHAR: &str = "char";
pub const INT: &str = "int";
pub const UINT: &str = "uint";
pub const LONG: &str = "long";
pub const ULONG: &str = "ulong";
pub const FLOAT: &str = "float";
pub const DOUBLE: &str = "double";
pub const NULL: &str = "NULL";
pub const VARARG: &str = "...";

/// Scalars every type table starts with
pub const BASE_SCALARS: [&str; 8] = [VOID, CHAR, INT, UINT, LONG, ULONG, FLOAT, DOUBLE];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArraySize {
    Fixed(u64),
    /// Size expression that did not fold to a constant, kept as source text
    Symbolic(String),
}

impl fmt::Display for ArraySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArraySize::Fixed(n) => write!(f, "{}", n),
            ArraySize::Symbolic(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValueType {
    Scalar(String),
    Pointer(Box<ValueType>),
    Array {
        element: Box<ValueType>,
        size: ArraySize,
    },
    /// An empty member list behind a pointer marks a reference that has not
    /// been completed yet; the checker re-reads the table when it is inspected.
    Struct {
        name: String,
        members: Vec<(String, ValueType)>,
    },
    Callable {
        params: Vec<ValueType>,
        returns: Box<ValueType>,
    },
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueType::Scalar(a), ValueType::Scalar(b)) => a == b,
            (ValueType::Pointer(a), ValueType::Pointer(b)) => a == b,
            (
                ValueType::Array { element: a, size: sa },
                ValueType::Array { element: b, size: sb },
            ) => sa == sb && a == b,
            (ValueType::Struct { name: a, .. }, ValueType::Struct { name: b, .. }) => a == b,
            (
                ValueType::Callable { params: pa, returns: ra },
                ValueType::Callable { params: pb, returns: rb },
            ) => pa == pb && ra == rb,
            _ => false,
        }
    }
}

impl Eq for ValueType {}

/// How a value reached an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    /// An array or string literal written in place
    Literal,
    Value,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Type '{0}' is already defined")]
    DuplicateType(String),

    #[error("Cannot rebind existing type '{0}' with typedef")]
    TypedefRebinding(String),

    #[error("Typedef cycle: {0}")]
    TypedefCycle(String),

    #[error("Operand of type void used in an arithmetic expression")]
    VoidOperand,

    #[error("Type '{0}' is not arithmetic")]
    NotArithmetic(String),
}

impl ValueType {
    pub fn scalar(name: &str) -> Self {
        ValueType::Scalar(name.to_string())
    }

    pub fn int() -> Self {
        Self::scalar(INT)
    }

    pub fn uint() -> Self {
        Self::scalar(UINT)
    }

    pub fn char() -> Self {
        Self::scalar(CHAR)
    }

    pub fn float() -> Self {
        Self::scalar(FLOAT)
    }

    pub fn void() -> Self {
        Self::scalar(VOID)
    }

    pub fn null() -> Self {
        Self::scalar(NULL)
    }

    pub fn vararg() -> Self {
        Self::scalar(VARARG)
    }

    pub fn pointer_to(inner: ValueType) -> Self {
        ValueType::Pointer(Box::new(inner))
    }

    pub fn array_of(element: ValueType, size: u64) -> Self {
        ValueType::Array {
            element: Box::new(element),
            size: ArraySize::Fixed(size),
        }
    }

    /// Type of a string literal: a char array with room for the terminator
    pub fn string_literal(text: &str) -> Self {
        Self::array_of(Self::char(), text.len() as u64 + 1)
    }

    fn scalar_name(&self) -> Option<&str> {
        match self {
            ValueType::Scalar(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.scalar_name() == Some(VOID)
    }

    pub fn is_null(&self) -> bool {
        self.scalar_name() == Some(NULL)
    }

    pub fn is_vararg(&self) -> bool {
        self.scalar_name() == Some(VARARG)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, ValueType::Pointer(_))
    }

    pub fn is_void_pointer(&self) -> bool {
        matches!(self, ValueType::Pointer(inner) if inner.is_void())
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array { .. })
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, ValueType::Callable { .. })
    }

    /// Rank inside the integral family (`char` < `int`/`uint` < `long`/`ulong`)
    fn integral_rank(&self) -> Option<u8> {
        match self.scalar_name()? {
            CHAR => Some(1),
            INT | UINT => Some(2),
            LONG | ULONG => Some(3),
            _ => None,
        }
    }

    pub fn is_integral(&self) -> bool {
        self.integral_rank().is_some()
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self.scalar_name(), Some(UINT | ULONG))
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.scalar_name(), Some(FLOAT | DOUBLE))
    }

    /// A scalar that is not one of the builtin names: an enum
    pub fn is_enum(&self) -> bool {
        match self.scalar_name() {
            Some(name) => !BASE_SCALARS.contains(&name) && name != NULL && name != VARARG,
            None => false,
        }
    }

    /// Values usable in arithmetic: integral, floating and enum scalars
    pub fn is_arithmetic(&self) -> bool {
        self.is_integral() || self.is_floating() || self.is_enum()
    }

    /// Values usable as a condition
    pub fn is_truthy(&self) -> bool {
        self.is_arithmetic() || self.is_pointer() || self.is_null()
    }

    /// What indexing or dereferencing yields
    pub fn pointee(&self) -> Option<&ValueType> {
        match self {
            ValueType::Pointer(inner) => Some(inner),
            ValueType::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn member(&self, member: &str) -> Option<&ValueType> {
        match self {
            ValueType::Struct { members, .. } => {
                members.iter().find(|(name, _)| name == member).map(|(_, ty)| ty)
            }
            _ => None,
        }
    }

    /// Equality used by re-assignment: exact, plus `NULL` into any pointer
    /// and `void[]` against any pointer in either direction.
    pub fn assignment_equal(&self, value: &ValueType) -> bool {
        if self == value {
            return true;
        }
        if self.is_pointer() && value.is_null() {
            return true;
        }
        self.is_pointer() && value.is_pointer() && (self.is_void_pointer() || value.is_void_pointer())
    }
}

/// Whether `value` may be stored into something of type `target` without
/// an explicit cast.
pub fn can_implicit_assign(target: &ValueType, value: &ValueType, origin: ValueOrigin) -> bool {
    if target.assignment_equal(value) {
        return true;
    }
    if target.is_integral() && value.is_integral() {
        return true;
    }
    if target.is_floating() && value.is_floating() {
        return true;
    }

    match (target, value) {
        (
            ValueType::Array { element: target_elem, size: target_size },
            ValueType::Array { element: value_elem, size: value_size },
        ) if origin == ValueOrigin::Literal => {
            let fits = match (target_size, value_size) {
                (ArraySize::Fixed(capacity), ArraySize::Fixed(len)) => len <= capacity,
                _ => true,
            };
            fits && can_implicit_assign(target_elem, value_elem, origin)
        }
        // Arrays decay to a pointer to their first element
        (ValueType::Pointer(pointee), ValueType::Array { element, .. }) => {
            pointee.assignment_equal(element) || pointee.is_void()
        }
        // Functions decay to a pointer to themselves
        (ValueType::Pointer(pointee), ValueType::Callable { .. }) => **pointee == *value,
        _ => false,
    }
}

/// Result type of an arithmetic expression over two operands.
///
/// Floating beats unsigned beats signed; inside a family the larger rank
/// wins. Enum scalars take part with the rank of `int`.
pub fn dominant_base_type(left: &ValueType, right: &ValueType) -> Result<ValueType, TypeError> {
    if left.is_void() || right.is_void() {
        return Err(TypeError::VoidOperand);
    }
    for operand in [left, right] {
        if !operand.is_arithmetic() {
            return Err(TypeError::NotArithmetic(operand.to_string()));
        }
    }

    if left.is_floating() || right.is_floating() {
        let double = ValueType::scalar(DOUBLE);
        return Ok(if *left == double || *right == double {
            double
        } else {
            ValueType::float()
        });
    }

    let rank = |ty: &ValueType| ty.integral_rank().unwrap_or(2);

    if left.is_unsigned() || right.is_unsigned() {
        return Ok(match (left.is_unsigned(), right.is_unsigned()) {
            (true, true) if rank(right) > rank(left) => right.clone(),
            (true, _) => left.clone(),
            _ => right.clone(),
        });
    }

    if left == right {
        return Ok(left.clone());
    }
    Ok(match rank(left).cmp(&rank(right)) {
        std::cmp::Ordering::Greater => left.clone(),
        std::cmp::Ordering::Less => right.clone(),
        std::cmp::Ordering::Equal => ValueType::int(),
    })
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(name) => write!(f, "{}", name),
            ValueType::Struct { name, .. } => write!(f, "{}", name),
            ValueType::Callable { params, returns } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", returns)
            }
            ValueType::Pointer(inner) => {
                write_suffix_base(f, inner)?;
                write!(f, "[]")
            }
            ValueType::Array { element, size } => {
                write_suffix_base(f, element)?;
                write!(f, "[{}]", size)
            }
        }
    }
}

fn write_suffix_base(f: &mut fmt::Formatter<'_>, base: &ValueType) -> fmt::Result {
    if base.is_callable() {
        write!(f, "{{{}}}", base)
    } else {
        write!(f, "{}", base)
    }
}
