//! Bytecode for compiled Jiffle scripts.
//!
//! # Architecture
//!
//! - [`opcode`] - the [`Op`] instruction set and its stack effects
//! - [`program`] - [`Chunk`] (code + literal table) and [`UnitProgram`]
//! - [`compiler`] - lowered IR → bytecode
//! - [`verify`] - static checks run on every program before a unit is built
//!
//! # Execution Model
//!
//! Each chunk runs on an operand stack of [`Value`](crate::value::Value)s
//! with a flat slot table for variables. Jumps carry absolute instruction
//! indices. A program has two chunks: `init`, run once per pass, and
//! `body`, run once per pixel. Both share one slot table.

pub mod compiler;
pub mod opcode;
pub mod program;
pub mod verify;

pub use compiler::compile_program;
pub use opcode::{Axis, Op};
pub use program::{Chunk, UnitProgram};
pub use verify::verify_program;
