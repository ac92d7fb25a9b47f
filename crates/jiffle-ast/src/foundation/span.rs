//! Source location tracking for error reporting.
//!
//! # Design
//!
//! - `Span`: byte range in a script with the cached 1-based line/column of its start
//! - `SourceFile`: a named script with a line index for offset → (line, column) lookup
//!
//! # Examples
//!
//! ```
//! # use jiffle_ast::foundation::span::*;
//! let file = SourceFile::new("test", "dest = 1;\ndest = 2;");
//! let span = file.span(10, 14);
//!
//! assert_eq!((span.line, span.column), (2, 1));
//! assert_eq!(file.snippet(&span), "dest");
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Compact source location reference.
///
/// Points to a byte range in a script. Line and column of the start position
/// are cached so diagnostics never need the source text to report a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Line of the start position (1-based)
    pub line: u32,
    /// Column of the start position (1-based)
    pub column: u32,
}

/// A single named script with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Script name, used in diagnostics
    pub name: String,
    /// Original source text
    pub source: String,
    /// Byte offsets of each line start
    ///
    /// line_starts[0] is always 0 (start of file).
    /// line_starts.len() == number of lines + 1 (includes EOF sentinel).
    pub line_starts: Vec<u32>,
}

impl Span {
    /// Create a new span.
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Create a zero-length span at the start of a script.
    pub fn zero() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Get the length of this span in bytes.
    ///
    /// # Panics
    /// Panics if end < start (malformed span).
    pub fn len(&self) -> u32 {
        assert!(
            self.end >= self.start,
            "malformed span: end ({}) < start ({})",
            self.end,
            self.start
        );
        self.end - self.start
    }

    /// Merge two spans (returns span covering both).
    ///
    /// The cached position is taken from whichever span starts first.
    pub fn merge(&self, other: &Span) -> Span {
        let (first, _) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }

    /// Byte range covered by this span.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl SourceFile {
    /// Create a new source file with precomputed line starts.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = compute_line_starts(&source);
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Build a span for a byte range, resolving its line and column.
    pub fn span(&self, start: usize, end: usize) -> Span {
        let (line, column) = self.line_col(start as u32);
        Span::new(start as u32, end as u32, line, column)
    }

    /// Build a span for a byte range produced by the lexer.
    pub fn span_of(&self, range: &Range<usize>) -> Span {
        self.span(range.start, range.end)
    }

    /// Get the source snippet for a span.
    pub fn snippet(&self, span: &Span) -> &str {
        let end = (span.end as usize).min(self.source.len());
        let start = (span.start as usize).min(end);
        &self.source[start..end]
    }

    /// Get (line, column) for a byte offset.
    ///
    /// Both line and column are 1-based. Offsets past EOF are clamped to EOF.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);

        // Binary search to find the line
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx.min(self.line_count().saturating_sub(1)),
            Err(idx) => idx.max(1) - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;

        (line, col)
    }

    /// Get the byte range for a given line number (1-based).
    ///
    /// Returns None if the line number is out of bounds.
    pub fn line_range(&self, line: u32) -> Option<(u32, u32)> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }

        let line_idx = (line - 1) as usize;
        Some((self.line_starts[line_idx], self.line_starts[line_idx + 1]))
    }

    /// Get the text of a specific line (1-based), without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let (start, end) = self.line_range(line)?;
        Some(self.source[start as usize..end as usize].trim_end_matches(['\n', '\r']))
    }

    /// Get the number of lines in this file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }
}

/// Compute byte offsets of line starts in source text.
///
/// The number of lines is `line_starts.len() - 1`; the last entry is the EOF sentinel.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];

    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }

    if line_starts.last() != Some(&(source.len() as u32)) || line_starts.len() == 1 {
        line_starts.push(source.len() as u32);
    }

    line_starts
}
