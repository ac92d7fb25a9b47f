//! Runtime errors for unit evaluation.
//!
//! These errors are raised after a script compiled successfully, while a
//! unit is being bound or evaluated. A runtime error ends the pass it
//! occurred in: no pixels are skipped silently.
//!
//! # Error Categories
//!
//! - **Binding errors**: [`RuntimeError::UnknownImage`], [`RuntimeError::RoleMismatch`], [`RuntimeError::UnboundImage`]
//! - **Evaluation errors**: [`RuntimeError::OutOfBounds`], [`RuntimeError::InvalidBand`], [`RuntimeError::TypeMismatch`]
//! - **Lifecycle errors**: [`RuntimeError::InvalidState`], [`RuntimeError::Cancelled`]
//! - **Defects**: [`RuntimeError::Internal`]

use thiserror::Error;

/// Runtime result type alias.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors raised while binding or evaluating a runtime unit.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    /// A name was bound that the script does not declare as an image.
    #[error("unknown image '{0}'")]
    UnknownImage(String),

    /// A source was bound to a destination name, or the reverse.
    #[error("image '{name}' is a {expected} image")]
    RoleMismatch {
        name: String,
        /// Role the script gives the image ("source" or "destination")
        expected: &'static str,
    },

    /// The script touched an image that has no raster bound to it.
    #[error("no raster bound to image '{0}'")]
    UnboundImage(String),

    /// A read fell outside the image bounds and the script has no
    /// `outside` option.
    #[error("read of image '{image}' at ({x}, {y}) is outside its bounds")]
    OutOfBounds { image: String, x: i64, y: i64 },

    /// A band index outside the raster's band range.
    #[error("image '{image}' has no band {band}")]
    InvalidBand { image: String, band: i64 },

    /// A list where a number was required, or the reverse.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An operation not allowed in the unit's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The pass was cancelled before it completed.
    #[error("evaluation cancelled")]
    Cancelled,

    /// A defect in the compiler or virtual machine.
    #[error("internal error: {0}")]
    Internal(String),
}
