//! Expression typing
//!
//! Every checked expression comes back with `expr_type` filled in.

use super::errors::SemanticError;
use super::Checker;
use crate::ast::*;
use crate::types::{can_implicit_assign, dominant_base_type, TypeError, ValueOrigin, ValueType, LONG};
use cu_common::{CompilerError, SourceLocation};

/// How an expression's value should be treated when it is assigned
pub fn origin_of(expr: &Expression) -> ValueOrigin {
    match expr.kind {
        ExpressionKind::StringLiteral(_) | ExpressionKind::ArrayLiteral(_) => ValueOrigin::Literal,
        _ => ValueOrigin::Value,
    }
}

/// Arrays behave as a pointer to their first element in most operators
pub(crate) fn decay(value_type: &ValueType) -> ValueType {
    match value_type {
        ValueType::Array { element, .. } => ValueType::pointer_to((**element).clone()),
        other => other.clone(),
    }
}

/// Enums take part in arithmetic as `int`
fn promote(value_type: &ValueType) -> ValueType {
    if value_type.is_enum() {
        ValueType::int()
    } else {
        value_type.clone()
    }
}

fn is_integer_like(value_type: &ValueType) -> bool {
    value_type.is_integral() || value_type.is_enum()
}

fn is_pointer_like(value_type: &ValueType) -> bool {
    value_type.is_pointer() || value_type.is_array() || value_type.is_null()
}

impl Checker {
    pub(crate) fn check_expression(&mut self, expr: Expression) -> Result<Expression, CompilerError> {
        Ok(self.check_typed(expr)?.0)
    }

    /// Check `expr`, returning the decorated node and its type
    pub(crate) fn check_typed(&mut self, expr: Expression) -> Result<(Expression, ValueType), CompilerError> {
        let Expression {
            node_id, kind, span, ..
        } = expr;
        let location = span.start.clone();

        let (kind, value_type) = match kind {
            ExpressionKind::IntLiteral(_) => (kind, ValueType::int()),
            ExpressionKind::FloatLiteral(_) => (kind, ValueType::float()),
            ExpressionKind::CharLiteral(_) => (kind, ValueType::char()),
            ExpressionKind::StringLiteral(ref text) => {
                let value_type = ValueType::string_literal(text);
                (kind, value_type)
            }
            ExpressionKind::Null => (kind, ValueType::null()),

            ExpressionKind::Name(name) => {
                let Some(value_type) = self.lookup_variable(&name)? else {
                    return Err(SemanticError::UndefinedName { name, location }.into());
                };
                (ExpressionKind::Name(name), value_type)
            }

            ExpressionKind::ArrayLiteral(items) => self.check_array_literal(items, &location)?,

            ExpressionKind::Binary { op, left, right } => {
                let (left, left_type) = self.check_typed(*left)?;
                let (right, right_type) = self.check_typed(*right)?;
                let value_type = binary_result(op, &left_type, &right_type, &location)?;
                (
                    ExpressionKind::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    value_type,
                )
            }

            ExpressionKind::Unary { op, operand } => {
                let (operand, operand_type) = self.check_typed(*operand)?;
                let value_type = unary_result(op, &operand, &operand_type, &location)?;
                (
                    ExpressionKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    value_type,
                )
            }

            ExpressionKind::Call { function, arguments } => self.check_call(*function, arguments, &location)?,

            ExpressionKind::Index { object, index } => {
                let (object, object_type) = self.check_typed(*object)?;
                let (index, index_type) = self.check_typed(*index)?;
                let element = match decay(&object_type) {
                    ValueType::Pointer(inner) if !inner.is_void() => *inner,
                    _ => {
                        return Err(SemanticError::InvalidOperand {
                            operator: "[]".to_string(),
                            found: object_type,
                            location,
                        }
                        .into())
                    }
                };
                if !is_integer_like(&index_type) {
                    return Err(SemanticError::InvalidOperand {
                        operator: "[]".to_string(),
                        found: index_type,
                        location: index.span.start.clone(),
                    }
                    .into());
                }
                (
                    ExpressionKind::Index {
                        object: Box::new(object),
                        index: Box::new(index),
                    },
                    element,
                )
            }

            ExpressionKind::Member {
                object,
                member,
                is_pointer,
            } => {
                let (object, object_type) = self.check_typed(*object)?;
                let value_type = self.member_type(&object_type, &member, is_pointer, &location)?;
                (
                    ExpressionKind::Member {
                        object: Box::new(object),
                        member,
                        is_pointer,
                    },
                    value_type,
                )
            }

            ExpressionKind::Cast { target, operand } => {
                let target_type = self.resolve_type(&target)?;
                let (operand, operand_type) = self.check_typed(*operand)?;
                if !can_cast(&operand_type, &target_type) {
                    return Err(SemanticError::InvalidCast {
                        from: operand_type,
                        to: target_type,
                        location,
                    }
                    .into());
                }
                (
                    ExpressionKind::Cast {
                        target,
                        operand: Box::new(operand),
                    },
                    target_type,
                )
            }

            ExpressionKind::Sizeof(target) => {
                self.resolve_type(&target)?;
                (ExpressionKind::Sizeof(target), self.size_type()?)
            }
        };

        let expr = Expression::new(node_id, kind, span).typed(value_type.clone());
        Ok((expr, value_type))
    }

    fn check_array_literal(
        &mut self,
        items: Vec<Expression>,
        location: &SourceLocation,
    ) -> Result<(ExpressionKind, ValueType), CompilerError> {
        let mut checked = Vec::with_capacity(items.len());
        let mut element_type: Option<ValueType> = None;

        for item in items {
            let origin = origin_of(&item);
            let (item, item_type) = self.check_typed(item)?;
            match &element_type {
                None => element_type = Some(item_type),
                Some(expected) if can_implicit_assign(expected, &item_type, origin) => {}
                Some(expected) => {
                    return Err(SemanticError::TypeMismatch {
                        context: "array literal".to_string(),
                        expected: expected.clone(),
                        found: item_type,
                        location: item.span.start.clone(),
                    }
                    .into())
                }
            }
            checked.push(item);
        }

        let Some(element_type) = element_type else {
            return Err(SemanticError::InvalidArraySize {
                detail: "array literal is empty".to_string(),
                location: location.clone(),
            }
            .into());
        };
        let value_type = ValueType::array_of(element_type, checked.len() as u64);
        Ok((ExpressionKind::ArrayLiteral(checked), value_type))
    }

    fn check_call(
        &mut self,
        function: Expression,
        arguments: Vec<Expression>,
        location: &SourceLocation,
    ) -> Result<(ExpressionKind, ValueType), CompilerError> {
        let (function, function_type) = self.check_typed(function)?;
        let callee = match &function.kind {
            ExpressionKind::Name(name) => name.clone(),
            _ => "expression".to_string(),
        };

        let (params, returns) = match function_type {
            ValueType::Callable { params, returns } => (params, returns),
            ValueType::Pointer(inner) if inner.is_callable() => match *inner {
                ValueType::Callable { params, returns } => (params, returns),
                other => {
                    return Err(SemanticError::NotCallable {
                        found: other,
                        location: location.clone(),
                    }
                    .into())
                }
            },
            other => {
                return Err(SemanticError::NotCallable {
                    found: other,
                    location: location.clone(),
                }
                .into())
            }
        };

        let variadic = params.last().is_some_and(ValueType::is_vararg);
        let fixed = if variadic { params.len() - 1 } else { params.len() };
        let count_ok = if variadic {
            arguments.len() >= fixed
        } else {
            arguments.len() == fixed
        };
        if !count_ok {
            return Err(SemanticError::ArgumentCount {
                function: callee,
                expected: if variadic {
                    format!("at least {}", fixed)
                } else {
                    fixed.to_string()
                },
                found: arguments.len(),
                location: location.clone(),
            }
            .into());
        }

        let mut checked = Vec::with_capacity(arguments.len());
        for (index, argument) in arguments.into_iter().enumerate() {
            let origin = origin_of(&argument);
            let (argument, argument_type) = self.check_typed(argument)?;
            match params.get(index).filter(|_| index < fixed) {
                Some(param) if !can_implicit_assign(param, &argument_type, origin) => {
                    return Err(SemanticError::TypeMismatch {
                        context: format!("argument {} of '{}'", index + 1, callee),
                        expected: param.clone(),
                        found: argument_type,
                        location: argument.span.start.clone(),
                    }
                    .into());
                }
                None if argument_type.is_void() => {
                    return Err(SemanticError::InvalidOperand {
                        operator: "...".to_string(),
                        found: argument_type,
                        location: argument.span.start.clone(),
                    }
                    .into());
                }
                _ => {}
            }
            checked.push(argument);
        }

        Ok((
            ExpressionKind::Call {
                function: Box::new(function),
                arguments: checked,
            },
            *returns,
        ))
    }

    fn member_type(
        &mut self,
        object_type: &ValueType,
        member: &str,
        is_pointer: bool,
        location: &SourceLocation,
    ) -> Result<ValueType, CompilerError> {
        let operator = if is_pointer { "->" } else { "." };
        let target = if is_pointer {
            object_type.pointee().filter(|_| object_type.is_pointer())
        } else {
            Some(object_type)
        };

        let structure = match target {
            Some(target @ ValueType::Struct { .. }) => self.complete_struct(target, location)?,
            _ => {
                return Err(SemanticError::NotAStruct {
                    operator: operator.to_string(),
                    found: object_type.clone(),
                    location: location.clone(),
                }
                .into())
            }
        };

        structure.member(member).cloned().ok_or_else(|| {
            SemanticError::NoMember {
                type_name: structure.to_string(),
                member: member.to_string(),
                location: location.clone(),
            }
            .into()
        })
    }
}

fn binary_result(
    op: BinaryOp,
    left: &ValueType,
    right: &ValueType,
    location: &SourceLocation,
) -> Result<ValueType, CompilerError> {
    let invalid = || -> CompilerError {
        SemanticError::InvalidOperands {
            operator: op.to_string(),
            left: left.clone(),
            right: right.clone(),
            location: location.clone(),
        }
        .into()
    };
    let dominant = || {
        dominant_base_type(&promote(left), &promote(right)).map_err(|err| match err {
            TypeError::VoidOperand => SemanticError::type_rule(err, location).into(),
            _ => invalid(),
        })
    };

    if op.is_logical() {
        return if left.is_truthy() && right.is_truthy() {
            Ok(ValueType::int())
        } else {
            Err(invalid())
        };
    }

    if op.is_comparison() {
        let comparable = (left.is_arithmetic() && right.is_arithmetic())
            || (is_pointer_like(left) && is_pointer_like(right) && {
                let (l, r) = (decay(left), decay(right));
                l.assignment_equal(&r) || r.assignment_equal(&l)
            });
        return if comparable { Ok(ValueType::int()) } else { Err(invalid()) };
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub => {
            let (l, r) = (decay(left), decay(right));
            if l.is_pointer() && is_integer_like(right) {
                return Ok(l);
            }
            if op == BinaryOp::Add && is_integer_like(left) && r.is_pointer() {
                return Ok(r);
            }
            if op == BinaryOp::Sub && l.is_pointer() && r.is_pointer() {
                return if l == r { Ok(ValueType::scalar(LONG)) } else { Err(invalid()) };
            }
            dominant()
        }
        BinaryOp::Mul | BinaryOp::Div => dominant(),
        BinaryOp::Mod | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            if is_integer_like(left) && is_integer_like(right) {
                dominant()
            } else {
                Err(invalid())
            }
        }
        BinaryOp::LeftShift | BinaryOp::RightShift => {
            if is_integer_like(left) && is_integer_like(right) {
                Ok(promote(left))
            } else {
                Err(invalid())
            }
        }
        _ => Err(invalid()),
    }
}

fn unary_result(
    op: UnaryOp,
    operand: &Expression,
    operand_type: &ValueType,
    location: &SourceLocation,
) -> Result<ValueType, CompilerError> {
    let invalid = || -> CompilerError {
        SemanticError::InvalidOperand {
            operator: op.to_string().trim().to_string(),
            found: operand_type.clone(),
            location: location.clone(),
        }
        .into()
    };

    match op {
        UnaryOp::Plus | UnaryOp::Minus if operand_type.is_arithmetic() => Ok(promote(operand_type)),
        UnaryOp::BitNot if is_integer_like(operand_type) => Ok(promote(operand_type)),
        UnaryOp::LogicalNot if operand_type.is_truthy() => Ok(ValueType::int()),
        UnaryOp::AddressOf if operand.is_lvalue() || operand_type.is_callable() => {
            Ok(ValueType::pointer_to(operand_type.clone()))
        }
        UnaryOp::Dereference => match decay(operand_type) {
            ValueType::Pointer(inner) if !inner.is_void() => Ok(*inner),
            _ => Err(invalid()),
        },
        _ if op.mutates() => {
            if !operand.is_lvalue() {
                return Err(SemanticError::NotAssignable {
                    what: format!("the operand of '{}'", op),
                    location: location.clone(),
                }
                .into());
            }
            if operand_type.is_arithmetic() || operand_type.is_pointer() {
                Ok(operand_type.clone())
            } else {
                Err(invalid())
            }
        }
        _ => Err(invalid()),
    }
}

/// Explicit conversions: anything numeric, anything pointer-shaped to a
/// pointer, pointers to integers, and anything to `void`
fn can_cast(from: &ValueType, to: &ValueType) -> bool {
    if from == to || to.is_void() {
        return true;
    }
    if from.is_arithmetic() && to.is_arithmetic() {
        return true;
    }
    if to.is_pointer() {
        return is_pointer_like(from) || from.is_callable() || is_integer_like(from);
    }
    from.is_pointer() && is_integer_like(to)
}
