//! Compiler foundation types shared by every pipeline stage.

pub mod span;

pub use span::{SourceFile, Span};
