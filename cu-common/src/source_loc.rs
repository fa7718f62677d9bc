//! Source location tracking for diagnostics
//!
//! Lines and columns are 1-based. Every token and AST node carries a span so
//! that errors raised in any phase can point back at the offending text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line and column are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }

    /// Location in anonymous input (strings handed straight to the frontend)
    pub fn new_simple(line: u32, column: u32) -> Self {
        Self::new("<input>", line, column)
    }

    pub fn dummy() -> Self {
        Self::new("<unknown>", 0, 0)
    }

    fn precedes(&self, other: &SourceLocation) -> bool {
        (self.line, self.column) <= (other.line, other.column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A span in a source file (from start to end location)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    pub fn from_location(location: SourceLocation) -> Self {
        Self {
            end: location.clone(),
            start: location,
        }
    }

    pub fn dummy() -> Self {
        Self::from_location(SourceLocation::dummy())
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// Spans from different files are never merged; `self` wins.
    pub fn extend(&self, other: &SourceSpan) -> SourceSpan {
        if self.start.filename != other.start.filename {
            return self.clone();
        }

        let start = if self.start.precedes(&other.start) {
            self.start.clone()
        } else {
            other.start.clone()
        };
        let end = if other.end.precedes(&self.end) {
            self.end.clone()
        } else {
            other.end.clone()
        };

        SourceSpan::new(start, end)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.filename != self.end.filename {
            write!(f, "{} to {}", self.start, self.end)
        } else if self.start.line == self.end.line && self.start.column == self.end.column {
            write!(f, "{}", self.start)
        } else if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}:{}-{}",
                self.start.filename, self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(
                f,
                "{}:{}:{}-{}:{}",
                self.start.filename, self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

/// Running line/column cursor used by the tokenizer
#[derive(Debug, Clone)]
pub struct SourceTracker {
    filename: String,
    line: u32,
    column: u32,
}

impl SourceTracker {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            line: 1,
            column: 1,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(&self.filename, self.line, self.column)
    }

    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub fn span_from(&self, start: SourceLocation) -> SourceSpan {
        SourceSpan::new(start, self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_location_display() {
        let loc = SourceLocation::new("list.cu", 42, 10);
        assert_eq!(format!("{}", loc), "list.cu:42:10");
        assert_eq!(SourceLocation::new_simple(1, 2).to_string(), "<input>:1:2");
    }

    #[test]
    fn test_span_display() {
        let one_line = SourceSpan::new(
            SourceLocation::new("a.cu", 1, 5),
            SourceLocation::new("a.cu", 1, 10),
        );
        assert_eq!(one_line.to_string(), "a.cu:1:5-10");

        let multi_line = SourceSpan::new(
            SourceLocation::new("a.cu", 1, 5),
            SourceLocation::new("a.cu", 3, 10),
        );
        assert_eq!(multi_line.to_string(), "a.cu:1:5-3:10");

        let point = SourceSpan::from_location(SourceLocation::new("a.cu", 4, 2));
        assert_eq!(point.to_string(), "a.cu:4:2");
    }

    #[test]
    fn test_span_extend() {
        let left = SourceSpan::new(
            SourceLocation::new("a.cu", 1, 5),
            SourceLocation::new("a.cu", 1, 10),
        );
        let right = SourceSpan::new(
            SourceLocation::new("a.cu", 1, 8),
            SourceLocation::new("a.cu", 2, 5),
        );

        let merged = left.extend(&right);
        assert_eq!((merged.start.line, merged.start.column), (1, 5));
        assert_eq!((merged.end.line, merged.end.column), (2, 5));

        let elsewhere = SourceSpan::from_location(SourceLocation::new("b.cu", 9, 9));
        assert_eq!(left.extend(&elsewhere), left);
    }

    #[test]
    fn test_tracker_counts_lines_and_columns() {
        let mut tracker = SourceTracker::new("a.cu");
        let start = tracker.location();
        for ch in "if x:\n    pass".chars() {
            tracker.advance(ch);
        }

        let span = tracker.span_from(start);
        assert_eq!((span.start.line, span.start.column), (1, 1));
        assert_eq!((span.end.line, span.end.column), (2, 9));
        assert_eq!(tracker.filename(), "a.cu");
    }
}
