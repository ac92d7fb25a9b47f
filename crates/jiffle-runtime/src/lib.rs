// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Runtime for compiled Jiffle scripts.
//!
//! A lowered [`IrProgram`](jiffle_resolve::IrProgram) is compiled to
//! stack-machine bytecode ([`bytecode`]), verified, and wrapped in a
//! [`RuntimeUnit`]: the stateful object hosts bind rasters to and evaluate.
//!
//! # Architecture
//!
//! - [`raster`] - raster surface abstraction and an in-memory implementation
//! - [`bytecode`] - opcodes, chunks, the IR → bytecode compiler and the verifier
//! - [`vm`] - the bytecode interpreter
//! - [`unit`] - runtime units, evaluation models and the per-pass driver
//! - [`progress`] / [`cancel`] - progress reporting and cooperative cancellation
//! - [`executor`] - fixed-size worker pool for asynchronous evaluation
//!
//! # Execution Model
//!
//! `init` statements run once per pass. The body then runs once per pixel
//! of the evaluation bounds, rows top to bottom and pixels left to right.

pub mod bytecode;
pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod progress;
pub mod raster;
pub mod unit;
pub mod value;
pub mod vm;

pub use bytecode::{compile_program, UnitProgram};
pub use cancel::CancelToken;
pub use config::{ExecutorConfig, RuntimeConfig, UpdateInterval};
pub use error::{Result, RuntimeError};
pub use executor::{Executor, ExecutorEvent, ExecutorListener, TaskHandle, TaskOutput};
pub use progress::{NullProgressListener, ProgressListener};
pub use raster::{MemoryRaster, RasterSurface, Rect, SampleType};
pub use unit::{EvaluationModel, RuntimeUnit, UnitState};
pub use value::Value;
