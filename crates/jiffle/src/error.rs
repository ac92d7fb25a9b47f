//! Facade errors.
//!
//! [`JiffleError`] keeps "the script is broken" ([`JiffleError::Compile`])
//! apart from "the script ran into a runtime condition"
//! ([`JiffleError::Runtime`]) and from API misuse.

use jiffle_ast::{CompileError, DiagnosticFormatter, ErrorKind, SourceFile};
use jiffle_runtime::RuntimeError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JiffleError {
    /// The script failed to compile.
    #[error("script '{}' failed to compile:\n{0}", .0.script_name())]
    Compile(CompileReport),

    /// Evaluation failed after a successful compile.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// `compile` was called before `set_script`.
    #[error("no script has been set")]
    NoScript,

    /// A runtime unit was requested before a successful `compile`.
    #[error("script has not been compiled")]
    NotCompiled,
}

impl JiffleError {
    /// The compile report, if this is a compile failure.
    pub fn report(&self) -> Option<&CompileReport> {
        match self {
            JiffleError::Compile(report) => Some(report),
            _ => None,
        }
    }
}

/// Every diagnostic of a failed compile, with the script they refer to.
///
/// `Display` prints one line per diagnostic; [`CompileReport::detailed`]
/// adds source snippets.
#[derive(Debug, Clone)]
pub struct CompileReport {
    source: SourceFile,
    diagnostics: Vec<CompileError>,
}

impl CompileReport {
    pub(crate) fn new(source: SourceFile, diagnostics: Vec<CompileError>) -> Self {
        Self {
            source,
            diagnostics,
        }
    }

    pub fn script_name(&self) -> &str {
        &self.source.name
    }

    /// All diagnostics, warnings included, in the order they were found.
    pub fn diagnostics(&self) -> &[CompileError] {
        &self.diagnostics
    }

    /// Diagnostics of error severity.
    pub fn errors(&self) -> impl Iterator<Item = &CompileError> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    /// Multi-line rendering with source context.
    pub fn detailed(&self) -> String {
        DiagnosticFormatter::new(&self.source).format_all(&self.diagnostics)
    }
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}: {}: {} ({}:{}:{})",
                d.severity,
                d.kind.name(),
                d.message,
                self.source.name,
                d.span.line,
                d.span.column
            )?;
        }
        Ok(())
    }
}
