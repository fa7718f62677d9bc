//! Function declarations, definitions and `return`
//!
//! A definition may follow a declaration of the same name. Parameters and
//! the return type it leaves out are taken from the declaration; anything
//! it does spell out must match. Without a declaration and without `->`,
//! the return type is inferred from the body, so such a function is only
//! visible after its definition.

use super::errors::SemanticError;
use super::expressions::{decay, origin_of};
use super::{Binding, Checker, FunctionContext};
use crate::ast::*;
use crate::types::{can_implicit_assign, ValueOrigin, ValueType};
use cu_common::{CompilerError, SourceLocation};
use std::collections::HashSet;

fn callable(params: &[ValueType], returns: ValueType) -> ValueType {
    ValueType::Callable {
        params: params.to_vec(),
        returns: Box::new(returns),
    }
}

/// `...` must be the last parameter and follow at least one named one
fn validate_params(function: &str, params: &[Parameter]) -> Result<(), CompilerError> {
    let mut seen = HashSet::new();
    for (index, param) in params.iter().enumerate() {
        match param.name() {
            Some(name) => {
                if !seen.insert(name) {
                    return Err(SemanticError::DuplicateParameter {
                        function: function.to_string(),
                        param: name.to_string(),
                        location: param.span.start.clone(),
                    }
                    .into());
                }
            }
            None => {
                let detail = if index + 1 != params.len() {
                    Some("'...' must be the last parameter")
                } else if index == 0 {
                    Some("'...' needs at least one named parameter before it")
                } else {
                    None
                };
                if let Some(detail) = detail {
                    return Err(SemanticError::InvalidVararg {
                        function: function.to_string(),
                        detail: detail.to_string(),
                        location: param.span.start.clone(),
                    }
                    .into());
                }
            }
        }
    }
    Ok(())
}

fn missing_annotation(function: &str, param: &Parameter) -> CompilerError {
    SemanticError::MissingAnnotation {
        function: function.to_string(),
        param: param.name().unwrap_or_default().to_string(),
        location: param.span.start.clone(),
    }
    .into()
}

fn signature_mismatch(name: &str, detail: String, location: &SourceLocation) -> CompilerError {
    SemanticError::SignatureMismatch {
        name: name.to_string(),
        detail,
        location: location.clone(),
    }
    .into()
}

impl Checker {
    pub(crate) fn check_function_decl(
        &mut self,
        decl: FunctionDecl,
        location: &SourceLocation,
    ) -> Result<FunctionDecl, CompilerError> {
        let FunctionDecl {
            name,
            mut params,
            returns,
            ..
        } = decl;
        validate_params(&name, &params)?;

        let mut param_types = Vec::with_capacity(params.len());
        for param in &mut params {
            let value_type = match &param.kind {
                ParameterKind::Vararg => ValueType::vararg(),
                ParameterKind::Named {
                    declared_type: Some(type_expr),
                    ..
                } => self.resolve_type(type_expr)?,
                ParameterKind::Named { declared_type: None, .. } => return Err(missing_annotation(&name, param)),
            };
            param.value_type = Some(value_type.clone());
            param_types.push(value_type);
        }

        let return_type = match &returns {
            Some(type_expr) => self.resolve_type(type_expr)?,
            None => ValueType::int(),
        };
        let signature = callable(&param_types, return_type);

        match self.env.current_mut().bind(&name, signature.clone()) {
            Binding::New | Binding::Repeated => {}
            Binding::Conflict(previous) if previous.is_callable() => {
                return Err(signature_mismatch(
                    &name,
                    format!("declared as {}, found {}", previous, signature),
                    location,
                ))
            }
            Binding::Conflict(previous) => {
                return Err(SemanticError::NotAFunction {
                    name,
                    previous,
                    location: location.clone(),
                }
                .into())
            }
        }

        Ok(FunctionDecl {
            name,
            params,
            returns,
            signature: Some(signature),
        })
    }

    pub(crate) fn check_function_def(
        &mut self,
        def: FunctionDef,
        location: &SourceLocation,
    ) -> Result<FunctionDef, CompilerError> {
        let FunctionDef {
            name,
            mut params,
            returns,
            body,
            ..
        } = def;

        if !self.at_top_level() {
            return Err(SemanticError::Misplaced {
                statement: "def".to_string(),
                place: "at the top level".to_string(),
                location: location.clone(),
            }
            .into());
        }
        validate_params(&name, &params)?;
        if self.env.current().defined_functions.contains(&name) {
            return Err(SemanticError::FunctionRedefinition {
                name,
                location: location.clone(),
            }
            .into());
        }

        let (param_types, return_type) = match self.env.current().lookup(&name).cloned() {
            Some(ValueType::Callable {
                params: declared_params,
                returns: declared_returns,
            }) => self.match_declaration(&name, &params, returns.as_ref(), &declared_params, *declared_returns, location)?,
            Some(previous) => {
                return Err(SemanticError::NotAFunction {
                    name,
                    previous,
                    location: location.clone(),
                }
                .into())
            }
            None => {
                let mut param_types = Vec::with_capacity(params.len());
                for param in &params {
                    param_types.push(match &param.kind {
                        ParameterKind::Vararg => ValueType::vararg(),
                        ParameterKind::Named {
                            declared_type: Some(type_expr),
                            ..
                        } => self.resolve_type(type_expr)?,
                        ParameterKind::Named { declared_type: None, .. } => {
                            return Err(missing_annotation(&name, param))
                        }
                    });
                }
                let return_type = returns.as_ref().map(|t| self.resolve_type(t)).transpose()?;
                (param_types, return_type)
            }
        };

        for (param, value_type) in params.iter_mut().zip(&param_types) {
            param.value_type = Some(value_type.clone());
        }

        self.env.current_mut().defined_functions.insert(name.clone());
        if let Some(return_type) = &return_type {
            self.env
                .current_mut()
                .bind(&name, callable(&param_types, return_type.clone()));
        }

        log::debug!("checking body of '{}'", name);
        self.function = Some(FunctionContext {
            name: name.clone(),
            returns: return_type.clone(),
            seen_returns: Vec::new(),
        });
        self.env.enter_scope();
        for (param, value_type) in params.iter().zip(&param_types) {
            if let Some(param_name) = param.name() {
                self.env.current_mut().bind(param_name, value_type.clone());
            }
        }
        let body = self.check_body(body);
        self.env.exit_scope();
        let context = self.function.take();
        let body = body?;

        let return_type = match return_type {
            Some(return_type) => return_type,
            None => {
                let inferred = context
                    .and_then(|context| context.seen_returns.into_iter().next())
                    .unwrap_or_else(ValueType::void);
                log::debug!("inferred return type of '{}' as {}", name, inferred);
                let signature = callable(&param_types, inferred.clone());
                self.declare(&name, signature, location)?;
                inferred
            }
        };

        Ok(FunctionDef {
            name,
            params,
            returns,
            body,
            signature: Some(callable(&param_types, return_type)),
        })
    }

    /// Fill in what a definition leaves out from the earlier declaration
    fn match_declaration(
        &mut self,
        name: &str,
        params: &[Parameter],
        returns: Option<&TypeExpr>,
        declared_params: &[ValueType],
        declared_returns: ValueType,
        location: &SourceLocation,
    ) -> Result<(Vec<ValueType>, Option<ValueType>), CompilerError> {
        if params.len() != declared_params.len() {
            return Err(signature_mismatch(
                name,
                format!(
                    "expected {} parameters, found {}",
                    declared_params.len(),
                    params.len()
                ),
                location,
            ));
        }

        let mut param_types = Vec::with_capacity(params.len());
        for (param, declared) in params.iter().zip(declared_params) {
            let value_type = match &param.kind {
                ParameterKind::Vararg => ValueType::vararg(),
                ParameterKind::Named {
                    declared_type: Some(type_expr),
                    ..
                } => self.resolve_type(type_expr)?,
                ParameterKind::Named { declared_type: None, .. } => declared.clone(),
            };
            if value_type != *declared {
                let what = param.name().map_or("'...'".to_string(), |n| format!("parameter '{}'", n));
                return Err(signature_mismatch(
                    name,
                    format!("{} has type {}, declared as {}", what, value_type, declared),
                    &param.span.start,
                ));
            }
            param_types.push(value_type);
        }

        let return_type = match returns {
            Some(type_expr) => {
                let return_type = self.resolve_type(type_expr)?;
                if return_type != declared_returns {
                    return Err(signature_mismatch(
                        name,
                        format!("returns {}, declared as {}", return_type, declared_returns),
                        &type_expr.span.start,
                    ));
                }
                return_type
            }
            None => declared_returns,
        };
        Ok((param_types, Some(return_type)))
    }

    pub(crate) fn check_return(
        &mut self,
        value: Option<Expression>,
        location: &SourceLocation,
    ) -> Result<Option<Expression>, CompilerError> {
        let Some(context) = &self.function else {
            return Err(SemanticError::Misplaced {
                statement: "return".to_string(),
                place: "inside a function".to_string(),
                location: location.clone(),
            }
            .into());
        };
        let expected = context.returns.clone();
        let function = context.name.clone();

        let (value, found, origin) = match value {
            Some(value) => {
                let origin = origin_of(&value);
                let (value, found) = self.check_typed(value)?;
                (Some(value), found, origin)
            }
            None => (None, ValueType::void(), ValueOrigin::Value),
        };
        let value_location = value.as_ref().map_or(location, |v| &v.span.start).clone();
        let mismatch = |expected: ValueType, found: ValueType| -> CompilerError {
            SemanticError::TypeMismatch {
                context: format!("return value of '{}'", function),
                expected,
                found,
                location: value_location.clone(),
            }
            .into()
        };

        match expected {
            Some(expected) => {
                let matches = if expected.is_void() || found.is_void() {
                    expected.is_void() && found.is_void()
                } else {
                    can_implicit_assign(&expected, &found, origin)
                };
                if !matches {
                    return Err(mismatch(expected, found));
                }
            }
            None => {
                let found = decay(&found);
                if found.is_null() || found.is_vararg() {
                    return Err(SemanticError::CannotInfer {
                        name: format!("return value of '{}'", function),
                        found,
                        location: value_location.clone(),
                    }
                    .into());
                }
                if let Some(context) = &mut self.function {
                    if let Some(first) = context.seen_returns.first() {
                        if !first.assignment_equal(&found) {
                            return Err(mismatch(first.clone(), found));
                        }
                    }
                    context.seen_returns.push(found);
                }
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::StatementKind;
    use crate::semantic::tests::check;
    use crate::types::ValueType;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn error(source: &str) -> String {
        check(source).unwrap_err().message().to_string()
    }

    fn global(source: &str, name: &str) -> String {
        let unit = check(source).unwrap();
        unit.globals.lookup(name).map(ToString::to_string).unwrap_or_default()
    }

    #[test]
    fn test_declaration_defaults_to_int() {
        assert_eq!(global("def f(x: char)\n", "f"), "(char) -> int");
        assert_eq!(
            error("def f(x)\n"),
            "Parameter 'x' of 'f' needs a type annotation"
        );
    }

    #[test]
    fn test_definition_backfills_from_declaration() {
        let unit = check(indoc! {"
            def add(a: int, b: int) -> int
            def add(a, b):
                return a + b
        "})
        .unwrap();
        let StatementKind::FunctionDef(def) = &unit.module.body[1].kind else {
            panic!("expected definition");
        };
        assert_eq!(def.params[1].value_type, Some(ValueType::int()));
        assert_eq!(
            def.signature.as_ref().map(ToString::to_string),
            Some("(int, int) -> int".to_string())
        );
    }

    #[test]
    fn test_definition_must_match_declaration() {
        assert_eq!(
            error("def f(a: int) -> int\ndef f(a: char):\n    return 1\n"),
            "Definition of 'f' does not match its declaration: parameter 'a' has type char, declared as int"
        );
        assert_eq!(
            error("def f(a: int) -> int\ndef f(a, b):\n    return 1\n"),
            "Definition of 'f' does not match its declaration: expected 1 parameters, found 2"
        );
        assert_eq!(
            error("def f() -> int\ndef f() -> char:\n    return 'a'\n"),
            "Definition of 'f' does not match its declaration: returns char, declared as int"
        );
        assert_eq!(
            error("def f() -> int:\n    return 1\ndef f() -> int:\n    return 2\n"),
            "Function 'f' is already defined"
        );
    }

    #[test]
    fn test_return_type_is_inferred() {
        assert_eq!(global("def one():\n    return 1\n", "one"), "() -> int");
        assert_eq!(global("def nothing():\n    pass\n", "nothing"), "() -> void");
        assert_eq!(
            global("def name():\n    return \"cu\"\n", "name"),
            "() -> char[]"
        );
        assert_eq!(
            error("def f(x: int):\n    if x:\n        return 1\n    return 'c'\n"),
            "Type mismatch in return value of 'f': expected int, found char"
        );
    }

    #[test]
    fn test_recursion_needs_a_declared_return_type() {
        let source = indoc! {"
            def fact(n: int) -> int:
                if n <= 1:
                    return 1
                return n * fact(n - 1)
        "};
        assert!(check(source).is_ok());
        assert_eq!(
            error("def loop(n: int):\n    return loop(n)\n"),
            "Undefined name 'loop'"
        );
    }

    #[test]
    fn test_return_checks() {
        assert_eq!(
            error("def f() -> void:\n    return 1\n"),
            "Type mismatch in return value of 'f': expected void, found int"
        );
        assert_eq!(
            error("def f() -> int:\n    return\n"),
            "Type mismatch in return value of 'f': expected int, found void"
        );
        assert!(check("def f() -> char[]:\n    return NULL\n").is_ok());
        assert_eq!(error("return 1\n"), "'return' is only allowed inside a function");
    }

    #[test]
    fn test_parameter_rules() {
        assert_eq!(
            error("def f(a: int, a: int)\n"),
            "Duplicate parameter 'a' in 'f'"
        );
        assert_eq!(
            error("def f(...)\n"),
            "Invalid variadic parameters in 'f': '...' needs at least one named parameter before it"
        );
        assert_eq!(
            error("def f(a: int, ..., b: int)\n"),
            "Invalid variadic parameters in 'f': '...' must be the last parameter"
        );
        assert_eq!(global("def log(fmt: char[], ...)\n", "log"), "(char[], ...) -> int");
    }

    #[test]
    fn test_definitions_only_at_top_level() {
        assert_eq!(
            error("if 1:\n    def f():\n        pass\n"),
            "'def' is only allowed at the top level"
        );
        assert_eq!(
            error("x = 1\ndef x():\n    pass\n"),
            "'x' is already declared as int, not as a function"
        );
    }

    #[test]
    fn test_parameters_are_scoped_to_the_body() {
        assert_eq!(
            error("def f(a: int) -> int:\n    return a\ny = a\n"),
            "Undefined name 'a'"
        );
        assert_eq!(
            global("def main():\n    return 0\n", "main"),
            "(int, char[][]) -> int"
        );
    }
}
