//! Built-in Function Table.
//!
//! Every function a Jiffle script may call is listed once in [`FUNCTIONS`], a
//! closed table of descriptors. Scripts resolve calls by name and argument
//! count at compile time; the compiled program then refers to functions by
//! [`FunctionId`], an index into the table.
//!
//! # Function Kinds
//!
//! - **Scalar** ([`FunctionImpl::Scalar`]) - numeric arguments, e.g. `sin(x)`, `con(c, a, b)`
//! - **List** ([`FunctionImpl::List`]) - one list argument, e.g. `median(values)`
//! - **Random** ([`FunctionImpl::Random`]) - draws from the evaluating unit's generator
//! - **Position** ([`FunctionImpl::Position`]) - reads the current pixel context, e.g. `x()`
//!
//! The table and its name index are process-wide read-only state: the index is
//! built on first use and never mutated afterwards.
//!
//! # Example Lookup
//!
//! ```
//! use jiffle_functions::{lookup, FunctionImpl};
//!
//! let id = lookup("max", 2).unwrap();
//! match id.descriptor().implementation {
//!     FunctionImpl::Scalar(f) => assert_eq!(f(&[1.0, 4.0]), 4.0),
//!     _ => unreachable!(),
//! }
//! ```

mod constants;
mod math;
mod position;
mod stats;

pub use constants::{constant, is_constant, CONSTANTS};
pub use position::{PixelContext, Position};

use rand::RngCore;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Signature for functions of numeric arguments
pub type ScalarFn = fn(&[f64]) -> f64;

/// Signature for functions of one list argument
pub type ListFn = fn(&[f64]) -> f64;

/// Signature for functions that draw random numbers
pub type RandomFn = fn(&mut dyn RngCore, f64) -> f64;

/// The implementation, tagged by what it needs from the evaluator
#[derive(Clone, Copy)]
pub enum FunctionImpl {
    Scalar(ScalarFn),
    List(ListFn),
    Random(RandomFn),
    Position(Position),
}

/// Arity specification for a built-in function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Fixed number of arguments
    Fixed(usize),
    /// Inclusive range of accepted argument counts
    Between(usize, usize),
}

impl Arity {
    /// Check whether `count` arguments are accepted.
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Fixed(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

/// Descriptor for a built-in function
pub struct FunctionDescriptor {
    /// Script name (e.g., "sin", "con", "median")
    pub name: &'static str,
    /// Signature string shown in diagnostics
    pub signature: &'static str,
    /// Category tag ("math", "list", "random", "position")
    pub category: &'static str,
    /// Accepted argument counts
    pub arity: Arity,
    /// The implementation
    pub implementation: FunctionImpl,
}

/// Index of a function in [`FUNCTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u16);

impl FunctionId {
    /// Descriptor for this id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not produced by [`lookup`]. Compiled programs are
    /// verified against the table before they run.
    pub fn descriptor(self) -> &'static FunctionDescriptor {
        &FUNCTIONS[self.0 as usize]
    }

    /// Descriptor for this id, or `None` if it is out of range.
    pub fn get(self) -> Option<&'static FunctionDescriptor> {
        FUNCTIONS.get(self.0 as usize)
    }
}

macro_rules! scalar {
    ($name:literal, $sig:literal, $arity:expr, $f:expr) => {
        FunctionDescriptor {
            name: $name,
            signature: $sig,
            category: "math",
            arity: $arity,
            implementation: FunctionImpl::Scalar($f),
        }
    };
}

macro_rules! list {
    ($name:literal, $f:expr) => {
        FunctionDescriptor {
            name: $name,
            signature: concat!($name, "(list)"),
            category: "list",
            arity: Arity::Fixed(1),
            implementation: FunctionImpl::List($f),
        }
    };
}

macro_rules! position {
    ($name:literal, $pos:expr) => {
        FunctionDescriptor {
            name: $name,
            signature: concat!($name, "()"),
            category: "position",
            arity: Arity::Fixed(0),
            implementation: FunctionImpl::Position($pos),
        }
    };
}

/// Every built-in function.
pub static FUNCTIONS: &[FunctionDescriptor] = &[
    // Scalar math
    scalar!("abs", "abs(x)", Arity::Fixed(1), |a| a[0].abs()),
    scalar!("acos", "acos(x)", Arity::Fixed(1), |a| a[0].acos()),
    scalar!("asin", "asin(x)", Arity::Fixed(1), |a| a[0].asin()),
    scalar!("atan", "atan(x)", Arity::Fixed(1), |a| a[0].atan()),
    scalar!("ceil", "ceil(x)", Arity::Fixed(1), |a| a[0].ceil()),
    scalar!("cos", "cos(x)", Arity::Fixed(1), |a| a[0].cos()),
    scalar!("degToRad", "degToRad(x)", Arity::Fixed(1), |a| a[0].to_radians()),
    scalar!("exp", "exp(x)", Arity::Fixed(1), |a| a[0].exp()),
    scalar!("floor", "floor(x)", Arity::Fixed(1), |a| a[0].floor()),
    scalar!("isinf", "isinf(x)", Arity::Fixed(1), |a| math::flag(a[0].is_infinite())),
    scalar!("isnan", "isnan(x)", Arity::Fixed(1), |a| math::flag(a[0].is_nan())),
    scalar!("isnull", "isnull(x)", Arity::Fixed(1), |a| math::flag(a[0].is_nan())),
    scalar!("log", "log(x)", Arity::Fixed(1), |a| a[0].ln()),
    scalar!("log", "log(x, base)", Arity::Fixed(2), |a| a[0].ln() / a[1].ln()),
    scalar!("radToDeg", "radToDeg(x)", Arity::Fixed(1), |a| a[0].to_degrees()),
    scalar!("round", "round(x)", Arity::Fixed(1), |a| math::round_half_up(a[0])),
    scalar!("round", "round(x, prec)", Arity::Fixed(2), |a| math::round_to(a[0], a[1])),
    scalar!("sign", "sign(x)", Arity::Fixed(1), |a| math::sign(a[0])),
    scalar!("sin", "sin(x)", Arity::Fixed(1), |a| a[0].sin()),
    scalar!("sqr", "sqr(x)", Arity::Fixed(1), |a| a[0] * a[0]),
    scalar!("sqrt", "sqrt(x)", Arity::Fixed(1), |a| a[0].sqrt()),
    scalar!("tan", "tan(x)", Arity::Fixed(1), |a| a[0].tan()),
    scalar!("max", "max(x, y)", Arity::Fixed(2), |a| math::max(a[0], a[1])),
    scalar!("min", "min(x, y)", Arity::Fixed(2), |a| math::min(a[0], a[1])),
    scalar!("con", "con(cond[, a[, b[, c]]])", Arity::Between(1, 4), math::con),
    // List statistics
    list!("max", stats::max),
    list!("min", stats::min),
    list!("mean", stats::mean),
    list!("median", stats::median),
    list!("mode", stats::mode),
    list!("range", stats::range),
    list!("sdev", stats::sdev),
    list!("sum", stats::sum),
    list!("variance", stats::variance),
    list!("length", stats::length),
    // Random numbers
    FunctionDescriptor {
        name: "rand",
        signature: "rand(x)",
        category: "random",
        arity: Arity::Fixed(1),
        implementation: FunctionImpl::Random(math::rand_uniform),
    },
    FunctionDescriptor {
        name: "randInt",
        signature: "randInt(x)",
        category: "random",
        arity: Arity::Fixed(1),
        implementation: FunctionImpl::Random(math::rand_int),
    },
    // Pixel position
    position!("x", Position::X),
    position!("y", Position::Y),
    position!("width", Position::Width),
    position!("height", Position::Height),
    position!("xmin", Position::XMin),
    position!("ymin", Position::YMin),
    position!("xmax", Position::XMax),
    position!("ymax", Position::YMax),
    position!("xres", Position::XRes),
    position!("yres", Position::YRes),
];

/// Name → table indices, built once.
static INDEX: LazyLock<HashMap<&'static str, Vec<FunctionId>>> = LazyLock::new(|| {
    let mut index: HashMap<&'static str, Vec<FunctionId>> = HashMap::new();
    for (i, descriptor) in FUNCTIONS.iter().enumerate() {
        index
            .entry(descriptor.name)
            .or_default()
            .push(FunctionId(i as u16));
    }
    index
});

/// Look up a function by name and argument count.
pub fn lookup(name: &str, arg_count: usize) -> Option<FunctionId> {
    INDEX
        .get(name)?
        .iter()
        .copied()
        .find(|id| id.descriptor().arity.accepts(arg_count))
}

/// Check if any function has this name, whatever its arity.
pub fn is_known(name: &str) -> bool {
    INDEX.contains_key(name)
}

/// Signatures of every function with this name, for "did you mean" notes.
pub fn signatures(name: &str) -> Vec<&'static str> {
    INDEX
        .get(name)
        .map(|ids| ids.iter().map(|id| id.descriptor().signature).collect())
        .unwrap_or_default()
}

/// Get all function names (with repeats for overloads).
pub fn all_names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|f| f.name)
}

/// Truth value of a number: non-zero and not NaN.
pub fn truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}
