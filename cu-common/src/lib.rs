//! cu front end - common types
//!
//! Source locations and the error taxonomy shared by the tokenizer, parser,
//! checker and driver.

pub mod error;
pub mod source_loc;

pub use error::{CompilerError, Diagnostic, Severity};
pub use source_loc::{SourceLocation, SourceSpan, SourceTracker};
