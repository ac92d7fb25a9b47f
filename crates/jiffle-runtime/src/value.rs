//! Runtime values.

use crate::error::{Result, RuntimeError};
use jiffle_functions::truthy;

/// A value on the VM stack or in a variable slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    List(Vec<f64>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(f64::NAN)
    }
}

impl Value {
    /// The number held, or a type error naming `context`.
    pub fn scalar(&self, context: &str) -> Result<f64> {
        match self {
            Value::Scalar(v) => Ok(*v),
            Value::List(_) => Err(RuntimeError::TypeMismatch(format!(
                "{} needs a number, found a list",
                context
            ))),
        }
    }

    /// The elements held, or a type error naming `context`.
    pub fn list(&self, context: &str) -> Result<&[f64]> {
        match self {
            Value::List(items) => Ok(items),
            Value::Scalar(_) => Err(RuntimeError::TypeMismatch(format!(
                "{} needs a list, found a number",
                context
            ))),
        }
    }

    /// Truth value: a non-zero, non-NaN number.
    pub fn is_true(&self, context: &str) -> Result<bool> {
        self.scalar(context).map(truthy)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_checks() {
        assert_eq!(Value::Scalar(2.0).scalar("x").unwrap(), 2.0);
        assert!(matches!(
            Value::List(vec![]).scalar("condition"),
            Err(RuntimeError::TypeMismatch(msg)) if msg.contains("condition")
        ));
        assert_eq!(Value::List(vec![1.0]).list("sum").unwrap(), &[1.0]);
        assert!(!Value::Scalar(f64::NAN).is_true("if").unwrap());
    }
}
