//! Compile-time error reporting and diagnostics.
//!
//! Every stage of the Jiffle compiler reports problems as [`CompileError`]
//! values: plain data carrying an [`ErrorKind`], a [`Severity`], the primary
//! source location and a message. Passes accumulate them so one compile
//! attempt can surface several problems at once.
//!
//! # Design
//!
//! - `CompileError`: single diagnostic with primary and optional secondary spans
//! - `ErrorKind`: one variant per error code
//! - `Severity`: error, warning, or note
//! - `DiagnosticFormatter`: formats diagnostics with source snippets
//!
//! # Examples
//!
//! ```
//! # use jiffle_ast::error::*;
//! # use jiffle_ast::foundation::Span;
//! # let span = Span::new(0, 3, 1, 1);
//! let error = CompileError::new(
//!     ErrorKind::AssignmentToSourceImage,
//!     span,
//!     "cannot assign to source image 'src'".to_string(),
//! );
//! assert!(error.is_error());
//! ```

use crate::foundation::{SourceFile, Span};
use std::fmt;

/// Compilation diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this error
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary source location
    pub span: Span,
    /// Primary error message
    pub message: String,
    /// Additional labeled spans
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Error code of a diagnostic.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    // Lexing and parsing
    /// Malformed token, grammar violation or misplaced header block
    Syntax = 0,

    // Variable classification
    /// Variable read before any assignment to it
    UsedBeforeAssignment = 1,
    /// Assignment target is bound as a source image
    AssignmentToSourceImage = 2,
    /// Destination image used as a value
    ReadingFromDestImage = 3,
    /// Declared image never referenced by the script
    UnusedImage = 4,
    /// Neighbourhood reference on a destination image
    NbrRefOnDestImage = 5,
    /// Neighbourhood reference on something that is not an image
    NbrRefOnNonImage = 6,
    /// No built-in function with this name and arity
    FunctionUndefined = 7,
    /// Assignment target is a built-in constant
    AssignmentToConstant = 8,
    /// `break` or `breakif` outside any loop
    BreakOutsideLoop = 9,

    // Assignment checking
    /// Loop variable assigned inside its own loop
    AssignmentToLoopVar = 10,
    /// Name reused across image scope, pixel scope or loop scope
    ScopeConflict = 11,
    /// Assignment, increment or append used as a value
    AssignmentAsValue = 12,
    /// Variable declared twice in the same block
    DuplicateDeclaration = 13,
    /// `init` expression reads an image
    ImageReadInInit = 14,
    /// `<<` applied to something other than a variable
    InvalidAppendTarget = 15,
    /// List value written to an image
    ListToImage = 16,

    // Roles and options
    /// Image declared with different roles by the script and the caller
    ImageRoleConflict = 17,
    /// Option key not recognized
    UnknownOption = 18,
    /// Option value could not be interpreted
    InvalidOptionValue = 19,

    // Generic
    /// Internal compiler error (bug in compiler)
    Internal = 20,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "syntax error",                               // 0: Syntax
    "used before assignment",                     // 1: UsedBeforeAssignment
    "assignment to source image",                 // 2: AssignmentToSourceImage
    "reading from destination image",             // 3: ReadingFromDestImage
    "image declared but unused",                  // 4: UnusedImage
    "neighbourhood reference on destination image", // 5: NbrRefOnDestImage
    "neighbourhood reference on non-image variable", // 6: NbrRefOnNonImage
    "undefined function",                         // 7: FunctionUndefined
    "assignment to constant",                     // 8: AssignmentToConstant
    "break outside loop",                         // 9: BreakOutsideLoop
    "assignment to loop variable",                // 10: AssignmentToLoopVar
    "scope conflict",                             // 11: ScopeConflict
    "assignment used as value",                   // 12: AssignmentAsValue
    "duplicate declaration",                      // 13: DuplicateDeclaration
    "image read in init block",                   // 14: ImageReadInInit
    "invalid append target",                      // 15: InvalidAppendTarget
    "list assigned to image",                     // 16: ListToImage
    "image role conflict",                        // 17: ImageRoleConflict
    "unknown option",                             // 18: UnknownOption
    "invalid option value",                       // 19: InvalidOptionValue
    "internal compiler error",                    // 20: Internal
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational note (not an error)
    Note,
    /// Warning (script is valid but suspicious)
    Warning,
    /// Error (compilation cannot proceed)
    Error,
}

/// Secondary labeled span in a diagnostic.
///
/// Used to point to related code locations (e.g., "first declared here").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Source location
    pub span: Span,
    /// Label text
    pub message: String,
}

impl CompileError {
    /// Creates a new error diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, span, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message)
    }

    /// Creates a new note diagnostic.
    pub fn note(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Note, span, message)
    }

    /// Creates an internal compiler error.
    ///
    /// Internal errors flag a defect in the compiler itself, never a problem
    /// in the user's script.
    pub fn internal(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, span, message.into())
    }

    fn with_severity(kind: ErrorKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Adds a secondary labeled span.
    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    /// Adds a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// True if this diagnostic blocks compilation.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES[self as usize]
    }
}

/// True if any diagnostic in the slice has `Error` severity.
pub fn has_errors(diagnostics: &[CompileError]) -> bool {
    diagnostics.iter().any(CompileError::is_error)
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} (at {})",
            self.severity,
            self.kind.name(),
            self.message,
            self.span
        )
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Formats diagnostics with source code context.
///
/// Output layout per diagnostic:
///
/// ```text
/// error: assignment to source image: cannot assign to source image 'src'
///   --> script:1:1
///     |
///   1 | src = 1;
///     | ^^^
/// ```
pub struct DiagnosticFormatter<'a> {
    source: &'a SourceFile,
}

impl<'a> DiagnosticFormatter<'a> {
    /// Creates a new diagnostic formatter over one script.
    pub fn new(source: &'a SourceFile) -> Self {
        Self { source }
    }

    /// Formats a diagnostic as a string with source context.
    pub fn format(&self, error: &CompileError) -> String {
        let mut output = format!(
            "{}: {}: {}\n",
            error.severity,
            error.kind.name(),
            error.message
        );

        let (line, col) = (error.span.line, error.span.column);
        output.push_str(&format!("  --> {}:{}:{}\n", self.source.name, line, col));

        if let Some(source_line) = self.source.line_text(line) {
            output.push_str("    |\n");
            output.push_str(&format!("{:3} | {}\n", line, source_line));

            let start_col = col as usize;
            let span_len = error.span.end.saturating_sub(error.span.start) as usize;
            let end_col = (start_col + span_len).min(source_line.len() + 1);
            let underline = " ".repeat(start_col.saturating_sub(1))
                + &"^".repeat(end_col.saturating_sub(start_col).max(1));
            output.push_str(&format!("    | {}\n", underline));
        }

        for label in &error.labels {
            output.push_str(&format!("   = note: {}\n", label.message));
            output.push_str(&format!(
                "     at {}:{}:{}\n",
                self.source.name, label.span.line, label.span.column
            ));
        }

        for note in &error.notes {
            output.push_str(&format!("   = help: {}\n", note));
        }

        output
    }

    /// Formats multiple diagnostics separated by blank lines.
    pub fn format_all(&self, errors: &[CompileError]) -> String {
        errors
            .iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
