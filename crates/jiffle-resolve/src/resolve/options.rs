//! Options validation.
//!
//! Checks the parsed `options { }` block and turns it into [`ScriptOptions`].
//! The parser's options reader only extracts raw key/value text; this pass
//! decides which keys exist and what their values mean.
//!
//! # Recognised Keys
//!
//! | key       | value                                        |
//! |-----------|----------------------------------------------|
//! | `outside` | fallback for neighbourhood reads beyond the image bounds |
//!
//! Values are a numeric literal (optionally signed), `null` or `NaN`,
//! `true` / `false`, or a built-in constant name.

use jiffle_ast::{CompileError, ErrorKind, Expr, ExprKind, OptionEntry, UnaryOp};
use jiffle_functions::constant;

/// Validated script options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScriptOptions {
    /// Value substituted for out-of-bounds neighbourhood reads.
    /// `None` makes such reads a runtime error.
    pub outside: Option<f64>,
}

/// Every key the `options` block accepts.
pub const OPTION_KEYS: &[&str] = &["outside"];

/// Validate the `options` block. Later duplicates of a key win.
pub fn validate_options(entries: &[OptionEntry]) -> (ScriptOptions, Vec<CompileError>) {
    let mut options = ScriptOptions::default();
    let mut errors = Vec::new();

    for entry in entries {
        match entry.name.as_str() {
            "outside" => match option_value(&entry.value) {
                Some(value) => options.outside = Some(value),
                None => errors.push(CompileError::new(
                    ErrorKind::InvalidOptionValue,
                    entry.value.span,
                    format!("invalid value for option '{}'", entry.name),
                )
                .with_note("expected a number, null, true, false or a constant name".to_string())),
            },
            other => errors.push(
                CompileError::new(
                    ErrorKind::UnknownOption,
                    entry.span,
                    format!("unknown option '{}'", other),
                )
                .with_note(format!("known options: {}", OPTION_KEYS.join(", "))),
            ),
        }
    }

    (options, errors)
}

/// Constant value of an option expression, if it is one of the accepted forms.
fn option_value(expr: &Expr) -> Option<f64> {
    match &expr.kind {
        ExprKind::Number(n) => Some(*n),
        ExprKind::Null => Some(f64::NAN),
        ExprKind::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        ExprKind::Ident(name) => constant(name),
        ExprKind::Unary { op, operand } => match (op, &operand.kind) {
            (UnaryOp::Neg, ExprKind::Number(n)) => Some(-n),
            (UnaryOp::Plus, ExprKind::Number(n)) => Some(*n),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiffle_ast::{NodeId, Span};

    fn entry(name: &str, kind: ExprKind) -> OptionEntry {
        OptionEntry {
            name: name.to_string(),
            value: Expr::new(NodeId(0), kind, Span::zero()),
            span: Span::zero(),
        }
    }

    fn negative(n: f64) -> ExprKind {
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(Expr::new(NodeId(1), ExprKind::Number(n), Span::zero())),
        }
    }

    #[test]
    fn test_outside_values() {
        let (opts, errors) = validate_options(&[entry("outside", ExprKind::Number(0.0))]);
        assert!(errors.is_empty());
        assert_eq!(opts.outside, Some(0.0));

        let (opts, _) = validate_options(&[entry("outside", negative(1.0))]);
        assert_eq!(opts.outside, Some(-1.0));

        let (opts, _) = validate_options(&[entry("outside", ExprKind::Null)]);
        assert!(opts.outside.unwrap().is_nan());

        let (opts, _) = validate_options(&[entry("outside", ExprKind::Ident("M_PI".into()))]);
        assert_eq!(opts.outside, Some(std::f64::consts::PI));
    }

    #[test]
    fn test_no_options_means_no_outside() {
        let (opts, errors) = validate_options(&[]);
        assert!(errors.is_empty());
        assert_eq!(opts.outside, None);
    }

    #[test]
    fn test_unknown_key_and_bad_value() {
        let (_, errors) = validate_options(&[entry("inside", ExprKind::Number(0.0))]);
        assert_eq!(errors[0].kind, ErrorKind::UnknownOption);

        let (opts, errors) = validate_options(&[entry("outside", ExprKind::Ident("foo".into()))]);
        assert_eq!(errors[0].kind, ErrorKind::InvalidOptionValue);
        assert_eq!(opts.outside, None);
    }
}
