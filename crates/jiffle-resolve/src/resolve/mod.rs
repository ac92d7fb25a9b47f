//! Resolution passes.
//!
//! ```text
//! Roles → Options → Classify → Assignments → Transform
//! ```
//!
//! Each pass is a pure function of its inputs. Passes report problems as
//! [`CompileError`](jiffle_ast::CompileError) values instead of stopping at
//! the first one; [`pipeline::analyze`] halts before lowering once any
//! error-severity diagnostic has been collected.

pub mod assignments;
pub mod classify;
pub mod ir;
pub mod options;
pub mod pipeline;
pub mod roles;
pub mod scope;
pub mod transform;

pub use classify::{classify, Classification, ImageId, Resolved, ValueKind, VarId, VarInfo};
pub use ir::{IrCoord, IrExpr, IrProgram, IrStmt};
pub use options::ScriptOptions;
pub use pipeline::{analyze, Analysis};
pub use roles::{merge_roles, RoleMap};
pub use scope::{ScopeError, ScopeStack, ScopeType, Symbol, SymbolType};
