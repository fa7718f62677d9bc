//! `include` resolution and builtin header loading
//!
//! Search order for `include "path"`: the including file's directory, the
//! configured include directories, then the builtin headers. Files are
//! keyed by canonical path. Including a finished file again does nothing;
//! including a file that is still being checked is a cycle.

use super::errors::SemanticError;
use super::Checker;
use crate::ast::Module;
use crate::builtins::BuiltinHeader;
use crate::parser::Parser;
use cu_common::{CompilerError, SourceLocation};
use std::path::{Path, PathBuf};

impl Checker {
    pub(crate) fn check_include(&mut self, path: &str, location: &SourceLocation) -> Result<(), CompilerError> {
        // Builtin headers only ever include each other
        if self.builtin_depth == 0 {
            if let Some(resolved) = self.find_include(path) {
                return self.include_file(resolved, location);
            }
        }

        if self.config().builtins {
            if let Some(header) = crate::builtins::header(path) {
                return self.load_builtin(header);
            }
        }

        Err(SemanticError::IncludeNotFound {
            path: path.to_string(),
            location: location.clone(),
        }
        .into())
    }

    fn find_include(&self, path: &str) -> Option<PathBuf> {
        self.current_dir
            .iter()
            .chain(self.config().include_dirs.iter())
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
            .map(|candidate| candidate.canonicalize().unwrap_or(candidate))
    }

    fn include_file(&mut self, path: PathBuf, location: &SourceLocation) -> Result<(), CompilerError> {
        if let Some(start) = self.include_stack.iter().position(|open| *open == path) {
            let chain = self.include_stack[start..]
                .iter()
                .chain(std::iter::once(&path))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(SemanticError::IncludeCycle {
                chain,
                location: location.clone(),
            }
            .into());
        }

        if !self.visited.insert(path.clone()) {
            log::debug!("{} already included", path.display());
            return Ok(());
        }

        let filename = path.display().to_string();
        let source = std::fs::read_to_string(&path).map_err(|err| SemanticError::Io {
            path: filename.clone(),
            message: err.to_string(),
            location: location.clone(),
        })?;
        let module = Parser::from_source(&source, &filename).parse_module()?;

        log::debug!("including {}", filename);
        self.include_stack.push(path.clone());
        let saved_dir = std::mem::replace(&mut self.current_dir, path.parent().map(Path::to_path_buf));
        let result = self.check_body(module.body);
        self.current_dir = saved_dir;
        self.include_stack.pop();

        self.units.insert(
            path,
            Module {
                filename: module.filename,
                body: result?,
            },
        );
        Ok(())
    }

    /// Check a builtin header against the global scope and record it
    pub(crate) fn load_builtin(&mut self, header: &'static BuiltinHeader) -> Result<(), CompilerError> {
        if self.headers.iter().any(|loaded| loaded == header.name) {
            return Ok(());
        }
        log::debug!("loading builtin header {}", header.name);

        let module = Parser::from_source(header.source, header.name).parse_module()?;

        let locals = self.env.take_locals();
        let function = self.function.take();
        let breakable_depth = std::mem::take(&mut self.breakable_depth);
        let block_depth = std::mem::take(&mut self.block_depth);
        self.builtin_depth += 1;

        let result = self.check_body(module.body);

        self.builtin_depth -= 1;
        self.breakable_depth = breakable_depth;
        self.block_depth = block_depth;
        self.function = function;
        self.env.restore_locals(locals);

        result?;
        if !self.headers.iter().any(|loaded| loaded == header.name) {
            self.headers.push(header.name.to_string());
        }
        Ok(())
    }

    /// Look up a function or variable, loading its builtin header on a miss
    pub(crate) fn lookup_variable(&mut self, name: &str) -> Result<Option<crate::types::ValueType>, CompilerError> {
        if let Some(found) = self.env.current().lookup(name) {
            return Ok(Some(found.clone()));
        }
        if self.config().builtins {
            if let Some(header) = crate::builtins::header_for_variable(name) {
                self.load_builtin(header)?;
                return Ok(self.env.current().lookup(name).cloned());
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrontendConfig;
    use crate::types::ValueType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_loads_from_inside_a_function() {
        let mut checker = Checker::new(FrontendConfig::default());
        checker.env.enter_scope();
        checker.env.current_mut().bind("local", ValueType::int());

        let found = checker.lookup_variable("strlen").unwrap();
        assert_eq!(found.map(|t| t.to_string()), Some("(char[]) -> uint".to_string()));
        assert_eq!(checker.headers, vec!["stdlib.h".to_string(), "string.h".to_string()]);
        assert!(checker.env.current().lookup("local").is_some());
        assert!(checker.env.global().lookup("malloc").is_some());
        assert!(checker.env.global().lookup("local").is_none());
    }

    #[test]
    fn test_headers_are_recorded_once() {
        let mut checker = Checker::new(FrontendConfig::default());
        checker.lookup_variable("printf").unwrap();
        checker.lookup_variable("puts").unwrap();
        checker
            .check_include("stdio.h", &SourceLocation::new_simple(1, 1))
            .unwrap();
        assert_eq!(checker.headers, vec!["stdio.h".to_string()]);
    }

    #[test]
    fn test_missing_include() {
        let mut checker = Checker::new(FrontendConfig::default());
        let err = checker
            .check_include("nowhere.cu", &SourceLocation::new_simple(2, 1))
            .unwrap_err();
        assert_eq!(err.message(), "Cannot find include 'nowhere.cu'");
    }
}
