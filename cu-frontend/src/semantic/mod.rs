//! Semantic checking
//!
//! Walks a parsed module, resolves every type expression, infers the type
//! of every value expression and returns a decorated copy of the tree.
//! Assignments to unbound names become explicit declarations carrying the
//! inferred type. Builtin headers and `include`d files are checked against
//! the same environment as the module that pulls them in.

pub mod constants;
pub mod errors;
pub mod expressions;
pub mod functions;
pub mod includes;
pub mod scope;
pub mod statements;
pub mod types;

use crate::ast::*;
use crate::config::FrontendConfig;
use crate::types::ValueType;
use cu_common::CompilerError;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub use errors::SemanticError;
pub use scope::{Binding, Environment, Scope};

/// Result of checking one source file
#[derive(Debug, Clone, Serialize)]
pub struct CheckedUnit {
    /// Builtin headers the unit needs, in the order they were first used
    pub headers: Vec<String>,
    /// The decorated module
    pub module: Module,
    /// Every file pulled in by `include`, transitively, by resolved path
    pub units: BTreeMap<PathBuf, Module>,
    /// Global scope after the whole unit was checked
    pub globals: Scope,
}

/// What the checker knows about the function whose body it is in
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub name: String,
    /// `None` while the return type is being inferred from the body
    pub returns: Option<ValueType>,
    pub seen_returns: Vec<ValueType>,
}

pub struct Checker {
    config: FrontendConfig,
    pub(crate) env: Environment,
    pub(crate) headers: Vec<String>,
    pub(crate) units: BTreeMap<PathBuf, Module>,
    pub(crate) visited: HashSet<PathBuf>,
    pub(crate) include_stack: Vec<PathBuf>,
    /// Directory of the file being checked, first stop for `include`
    pub(crate) current_dir: Option<PathBuf>,
    /// Nonzero while a builtin header is being checked
    pub(crate) builtin_depth: usize,
    pub(crate) function: Option<FunctionContext>,
    /// Enclosing loops and switches, for `break`
    pub(crate) breakable_depth: usize,
    /// Enclosing `if`/`while`/`do`/`switch` bodies
    pub(crate) block_depth: usize,
}

impl Checker {
    pub fn new(config: FrontendConfig) -> Self {
        Self {
            config,
            env: Environment::new(),
            headers: Vec::new(),
            units: BTreeMap::new(),
            visited: HashSet::new(),
            include_stack: Vec::new(),
            current_dir: None,
            builtin_depth: 0,
            function: None,
            breakable_depth: 0,
            block_depth: 0,
        }
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Check a module. `path` is the file it was read from, if any; it
    /// anchors relative includes and takes part in cycle detection.
    pub fn check_module(mut self, module: Module, path: Option<&Path>) -> Result<CheckedUnit, CompilerError> {
        if let Some(path) = path {
            let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            self.current_dir = resolved.parent().map(Path::to_path_buf);
            self.visited.insert(resolved.clone());
            self.include_stack.push(resolved);
        }

        log::debug!("checking {}", module.filename);
        let body = self.check_body(module.body)?;

        Ok(CheckedUnit {
            headers: self.headers,
            module: Module {
                filename: module.filename,
                body,
            },
            units: self.units,
            globals: self.env.into_global(),
        })
    }

    /// Check statements in the current scope
    pub(crate) fn check_body(&mut self, body: Vec<Statement>) -> Result<Vec<Statement>, CompilerError> {
        body.into_iter().map(|stmt| self.check_statement(stmt)).collect()
    }

    /// Check the body of a control statement. It shares the frame of the
    /// enclosing function (or the global frame), so names it binds stay
    /// visible after it.
    pub(crate) fn check_block(&mut self, body: Vec<Statement>) -> Result<Vec<Statement>, CompilerError> {
        self.block_depth += 1;
        let result = self.check_body(body);
        self.block_depth -= 1;
        result
    }

    /// Outside every function and control statement
    pub(crate) fn at_top_level(&self) -> bool {
        self.function.is_none() && self.block_depth == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    pub(crate) fn check(source: &str) -> Result<CheckedUnit, CompilerError> {
        let module = Parser::from_source(source, "<test>").parse_module()?;
        Checker::new(FrontendConfig::default()).check_module(module, None)
    }

    #[test]
    fn test_globals_are_reported() {
        let unit = check(indoc! {"
            count: int = 0
            name = \"cu\"
        "})
        .unwrap();
        assert_eq!(unit.globals.lookup("count"), Some(&ValueType::int()));
        assert_eq!(
            unit.globals.lookup("name"),
            Some(&ValueType::array_of(ValueType::char(), 3))
        );
        assert!(unit.headers.is_empty());
        assert!(unit.units.is_empty());
    }

    #[test]
    fn test_names_bound_in_branches_outlive_the_branch() {
        let unit = check(indoc! {"
            def pick(c: int) -> int:
                if c:
                    x = 1
                else:
                    x = 2
                while c > 0:
                    last = c
                    c--
                return x + last
        "})
        .unwrap();
        assert_eq!(
            unit.globals.lookup("pick").map(ToString::to_string),
            Some("(int) -> int".to_string())
        );

        let StatementKind::FunctionDef(def) = &unit.module.body[0].kind else {
            panic!("expected definition");
        };
        let StatementKind::If { body, orelse, .. } = &def.body[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(&body[0].kind, StatementKind::VarDecl(decl) if decl.name == "x"));
        assert!(matches!(orelse[0].kind, StatementKind::Assign { .. }));
    }

    #[test]
    fn test_branches_share_one_binding() {
        let err = check(indoc! {"
            def f(c: int):
                if c:
                    x = 1
                else:
                    x = 'c'
        "})
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Type mismatch in assignment to 'x': expected int, found char"
        );
        assert_eq!(err.location().map(|l| l.line), Some(5));
    }

    #[test]
    fn test_function_locals_end_with_the_function() {
        let err = check(indoc! {"
            def f() -> int:
                if 1:
                    inner = 2
                return inner
            outer = inner
        "})
        .unwrap_err();
        assert_eq!(err.message(), "Undefined name 'inner'");
        assert_eq!(err.location().map(|l| l.line), Some(5));
    }
}
