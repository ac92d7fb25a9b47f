// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Semantic analysis and lowering for Jiffle scripts.
//!
//! This crate takes a parsed [`Program`](jiffle_ast::Program), checks it
//! against the image roles the caller supplies, and lowers it to the
//! slot-addressed [`IrProgram`](resolve::ir::IrProgram) the runtime compiles
//! to bytecode.

pub mod resolve;

pub use resolve::*;
