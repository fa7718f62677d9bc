//! Front end configuration

use std::path::PathBuf;

/// Options handed to the checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// Searched, in order, after the including file's own directory
    pub include_dirs: Vec<PathBuf>,
    /// Resolve unknown names against the builtin headers
    pub builtins: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            builtins: true,
        }
    }
}

impl FrontendConfig {
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }
}
