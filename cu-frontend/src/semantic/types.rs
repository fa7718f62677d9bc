//! Resolving type expressions against the scope's type table

use super::constants;
use super::errors::SemanticError;
use super::Checker;
use crate::ast::{Expression, TypeExpr, TypeExprKind};
use crate::builtins;
use crate::formatter::format_expression;
use crate::types::{ArraySize, ValueType, UINT};
use cu_common::{CompilerError, SourceLocation};

/// Name of the type `sizeof` evaluates to
pub const SIZE_TYPE: &str = "size_t";

impl Checker {
    pub(crate) fn resolve_type(&mut self, type_expr: &TypeExpr) -> Result<ValueType, CompilerError> {
        self.resolve_type_inner(type_expr, false)
    }

    fn resolve_type_inner(&mut self, type_expr: &TypeExpr, behind_pointer: bool) -> Result<ValueType, CompilerError> {
        let location = &type_expr.span.start;
        match &type_expr.kind {
            TypeExprKind::Name(name) => self.resolve_named_type(name, location, behind_pointer),
            TypeExprKind::Pointer(inner) => {
                Ok(ValueType::pointer_to(self.resolve_type_inner(inner, true)?))
            }
            TypeExprKind::Array { element, size } => {
                let element = self.resolve_type_inner(element, behind_pointer)?;
                if element.is_void() {
                    return Err(SemanticError::InvalidArraySize {
                        detail: "array elements cannot be void".to_string(),
                        location: location.clone(),
                    }
                    .into());
                }
                let size = self.array_size(size)?;
                Ok(ValueType::Array {
                    element: Box::new(element),
                    size,
                })
            }
            TypeExprKind::Callable { params, returns } => {
                let params = params
                    .iter()
                    .map(|param| self.resolve_type_inner(param, false))
                    .collect::<Result<Vec<_>, _>>()?;
                let returns = self.resolve_type_inner(returns, false)?;
                Ok(ValueType::Callable {
                    params,
                    returns: Box::new(returns),
                })
            }
            TypeExprKind::Vararg => Ok(ValueType::vararg()),
        }
    }

    /// Look a name up in the table, loading its builtin header on a miss.
    /// Behind a pointer an unknown name is taken as a struct that will be
    /// defined later.
    fn resolve_named_type(
        &mut self,
        name: &str,
        location: &SourceLocation,
        behind_pointer: bool,
    ) -> Result<ValueType, CompilerError> {
        if !self.env.current().types.type_exists(name) {
            self.load_builtin_type(name)?;
        }

        if self.env.current().types.type_exists(name) {
            return self
                .env
                .current()
                .types
                .exhaust_typedef(name)
                .map_err(|err| SemanticError::type_rule(err, location).into());
        }

        if behind_pointer {
            log::trace!("forward reference to struct {} at {}", name, location);
            return Ok(ValueType::Struct {
                name: name.to_string(),
                members: Vec::new(),
            });
        }

        Err(SemanticError::UnknownType {
            name: name.to_string(),
            location: location.clone(),
        }
        .into())
    }

    /// Load the builtin header declaring type `name`, if there is one
    pub(crate) fn load_builtin_type(&mut self, name: &str) -> Result<(), CompilerError> {
        if !self.config().builtins {
            return Ok(());
        }
        match builtins::header_for_type(name) {
            Some(header) => self.load_builtin(header),
            None => Ok(()),
        }
    }

    fn array_size(&mut self, size: &Expression) -> Result<ArraySize, CompilerError> {
        match constants::fold(size, &self.env.current().constants) {
            Some(value) => u64::try_from(value).map(ArraySize::Fixed).map_err(|_| {
                SemanticError::InvalidArraySize {
                    detail: format!("{} is negative", value),
                    location: size.span.start.clone(),
                }
                .into()
            }),
            None => Ok(ArraySize::Symbolic(format_expression(size))),
        }
    }

    /// Fill in the members of a struct known only by name
    pub(crate) fn complete_struct(&self, value_type: &ValueType, location: &SourceLocation) -> Result<ValueType, CompilerError> {
        match value_type {
            ValueType::Struct { name, members } if members.is_empty() => {
                let types = &self.env.current().types;
                if !types.type_exists(name) {
                    return Err(SemanticError::UnknownType {
                        name: name.clone(),
                        location: location.clone(),
                    }
                    .into());
                }
                types
                    .exhaust_typedef(name)
                    .map_err(|err| SemanticError::type_rule(err, location).into())
            }
            other => Ok(other.clone()),
        }
    }

    /// Type of `sizeof(...)`. Using it makes `size_t` available.
    pub(crate) fn size_type(&mut self) -> Result<ValueType, CompilerError> {
        if !self.env.current().types.type_exists(SIZE_TYPE) {
            self.load_builtin_type(SIZE_TYPE)?;
        }
        let types = &self.env.current().types;
        if types.type_exists(SIZE_TYPE) {
            if let Ok(resolved) = types.exhaust_typedef(SIZE_TYPE) {
                return Ok(resolved);
            }
        }
        Ok(ValueType::scalar(UINT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrontendConfig;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn resolve(checker: &mut Checker, source: &str) -> Result<ValueType, CompilerError> {
        let type_expr = Parser::from_source(source, "<test>").parse_type_expr().unwrap();
        checker.resolve_type(&type_expr)
    }

    #[test]
    fn test_suffixes_resolve_in_order() {
        let mut checker = Checker::new(FrontendConfig::default());
        assert_eq!(
            resolve(&mut checker, "int[3][]").unwrap(),
            ValueType::pointer_to(ValueType::array_of(ValueType::int(), 3))
        );
        assert_eq!(
            resolve(&mut checker, "int[][3]").unwrap(),
            ValueType::array_of(ValueType::pointer_to(ValueType::int()), 3)
        );
    }

    #[test]
    fn test_array_sizes_fold_or_stay_symbolic() {
        let mut checker = Checker::new(FrontendConfig::default());
        checker.env.current_mut().constants.insert("N".to_string(), 4);
        assert_eq!(
            resolve(&mut checker, "char[N * 2]").unwrap(),
            ValueType::array_of(ValueType::char(), 8)
        );
        assert_eq!(
            resolve(&mut checker, "char[len]").unwrap().to_string(),
            "char[len]"
        );
        assert_eq!(
            resolve(&mut checker, "char[-1]").unwrap_err().message(),
            "Invalid array size: -1 is negative"
        );
    }

    #[test]
    fn test_unknown_names() {
        let mut checker = Checker::new(FrontendConfig::default());
        assert_eq!(
            resolve(&mut checker, "Widget").unwrap_err().message(),
            "Unknown type 'Widget'"
        );
        assert_eq!(
            resolve(&mut checker, "Widget[]").unwrap(),
            ValueType::pointer_to(ValueType::Struct {
                name: "Widget".to_string(),
                members: Vec::new(),
            })
        );
    }

    #[test]
    fn test_builtin_types_load_on_demand() {
        let mut checker = Checker::new(FrontendConfig::default());
        assert_eq!(resolve(&mut checker, "size_t").unwrap(), ValueType::uint());
        assert_eq!(checker.headers, vec!["stdlib.h".to_string()]);

        let mut bare = Checker::new(FrontendConfig::default().without_builtins());
        assert!(resolve(&mut bare, "size_t").is_err());
        assert_eq!(bare.size_type().unwrap(), ValueType::uint());
        assert!(bare.headers.is_empty());
    }
}
