//! Named constants.

use std::f64::consts;

/// Every built-in constant. `NULL` and `NaN` are the same value.
pub static CONSTANTS: &[(&str, f64)] = &[
    ("M_E", consts::E),
    ("M_PI", consts::PI),
    ("M_PI_2", consts::FRAC_PI_2),
    ("M_PI_4", consts::FRAC_PI_4),
    ("M_SQRT2", consts::SQRT_2),
    ("NaN", f64::NAN),
    ("NULL", f64::NAN),
];

/// Value of a named constant.
pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, value)| *value)
}

/// Check if a name is a built-in constant.
pub fn is_constant(name: &str) -> bool {
    constant(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(constant("M_PI"), Some(consts::PI));
        assert!(constant("NULL").unwrap().is_nan());
        assert!(is_constant("M_SQRT2"));
        assert!(!is_constant("m_pi"));
    }
}
