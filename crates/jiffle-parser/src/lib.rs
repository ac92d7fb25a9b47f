// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Hand-written recursive descent parser for Jiffle
//!
//! Turns script text into a [`jiffle_ast::Program`]. Lexing happens inside
//! the entry points; lexical failures surface as [`ParseError`]s with
//! [`ParseErrorKind::Lexical`].

pub mod parser;

pub use parser::{parse_expression, parse_program, read_options, ParseError, ParseErrorKind};

// Re-export lexer
pub use jiffle_lexer::Token;
