// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for the Jiffle raster-algebra language
//!
//! This crate contains the syntax tree, source location tracking and the
//! diagnostic types shared by the lexer, parser, semantic passes and runtime.

pub mod ast;
pub mod error;
pub mod foundation;

// Re-export commonly used types
pub use error::{CompileError, DiagnosticFormatter, ErrorKind, Severity};
pub use foundation::{SourceFile, Span};

pub use ast::*;
