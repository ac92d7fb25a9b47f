// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Jiffle: a raster algebra scripting language.
//!
//! Scripts describe how each pixel of one or more destination images is
//! computed from source images:
//!
//! ```text
//! options { outside = 0; }
//! dest = (src[-1, 0] + src + src[1, 0]) / 3;
//! ```
//!
//! # Pipeline
//!
//! ```text
//! script text
//!   │  jiffle-parser       lex + parse (syntax errors stop here)
//!   ▼
//! Program (AST)
//!   │  jiffle-resolve      roles → options → classify → assignments → transform
//!   ▼
//! IrProgram
//!   │  jiffle-runtime      bytecode + verify
//!   ▼
//! UnitProgram ──► RuntimeUnit (bind rasters, evaluate)
//! ```
//!
//! [`Jiffle`] drives the whole pipeline. [`JiffleSession`] hands out named
//! script objects, [`eval_script`] evaluates a one-off expression script,
//! and [`mapcalc`] converts r.mapcalc-style text.
//!
//! # Example
//!
//! ```
//! use jiffle::{EvaluationModel, ImageRole, Jiffle, MemoryRaster, NullProgressListener};
//! use std::sync::Arc;
//!
//! let mut jiffle = Jiffle::new();
//! jiffle.set_script("dest = src * 2;");
//! jiffle.set_image_roles([("src", ImageRole::Source), ("dest", ImageRole::Destination)]);
//! jiffle.compile().unwrap();
//!
//! let mut unit = jiffle.runtime_unit(EvaluationModel::Direct).unwrap();
//! unit.bind_source("src", Arc::new(MemoryRaster::filled(2, 2, 4.0))).unwrap();
//! unit.bind_destination("dest", Box::new(MemoryRaster::new(2, 2, 1))).unwrap();
//! unit.evaluate_all(&mut NullProgressListener).unwrap();
//! assert_eq!(unit.destination("dest").unwrap().get_sample(1, 1, 0), Some(8.0));
//! ```

mod error;
mod eval;
mod script;
pub mod mapcalc;
mod session;

pub use error::{CompileReport, JiffleError};
pub use eval::eval_script;
pub use script::Jiffle;
pub use session::JiffleSession;

pub use jiffle_ast::{CompileError, ErrorKind, ImageRole, Severity};
pub use jiffle_runtime::{
    CancelToken, EvaluationModel, Executor, ExecutorConfig, ExecutorEvent, ExecutorListener,
    MemoryRaster, NullProgressListener, ProgressListener, RasterSurface, Rect, RuntimeConfig,
    RuntimeError, RuntimeUnit, SampleType, TaskHandle, TaskOutput, UnitState, UpdateInterval,
};
