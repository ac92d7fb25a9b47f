//! Scalar and random function implementations.

use crate::truthy;
use rand::{Rng, RngCore};

/// 1.0 for true, 0.0 for false.
pub(crate) fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Round half up: 2.5 → 3, -2.5 → -2.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to the nearest multiple of `prec`.
pub(crate) fn round_to(x: f64, prec: f64) -> f64 {
    round_half_up(x / prec) * prec
}

pub(crate) fn sign(x: f64) -> f64 {
    if x.is_nan() {
        f64::NAN
    } else if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Larger of two values; NaN if either is NaN.
pub(crate) fn max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Smaller of two values; NaN if either is NaN.
pub(crate) fn min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// Conditional function with one to four arguments.
///
/// - `con(c)` → c ? 1 : 0
/// - `con(c, a)` → c ? a : 0
/// - `con(c, a, b)` → c ? a : b
/// - `con(c, a, b, d)` → a if c > 0, b if c == 0, d otherwise
pub(crate) fn con(args: &[f64]) -> f64 {
    match *args {
        [c] => flag(truthy(c)),
        [c, a] => {
            if truthy(c) {
                a
            } else {
                0.0
            }
        }
        [c, a, b] => {
            if truthy(c) {
                a
            } else {
                b
            }
        }
        [c, a, b, d] => {
            if c > 0.0 {
                a
            } else if c == 0.0 {
                b
            } else {
                d
            }
        }
        _ => f64::NAN,
    }
}

/// Uniform value in [0, x).
pub(crate) fn rand_uniform(rng: &mut dyn RngCore, x: f64) -> f64 {
    rng.gen::<f64>() * x
}

/// Integer value in [0, x).
pub(crate) fn rand_int(rng: &mut dyn RngCore, x: f64) -> f64 {
    (rng.gen::<f64>() * x.floor()).floor()
}
