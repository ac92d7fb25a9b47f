//! Expression parser using Pratt parsing (precedence climbing).
//!
//! ## Precedence Levels (lowest to highest)
//!
//! 1. `=`, `+=`, `-=`, `*=`, `/=`, `%=`, `<<` (Assignment) - right associative
//! 2. `? :` (Ternary) - right associative
//! 3. `||` (Or) - left associative
//! 4. `^|` (Xor) - left associative
//! 5. `&&` (And) - left associative
//! 6. `==`, `!=`, `<`, `<=`, `>`, `>=` (Comparison) - left associative
//! 7. `+`, `-` (Addition) - left associative
//! 8. `*`, `/`, `%` (Multiplication) - left associative
//! 9. `^` (Power) - right associative
//! 10. Unary `+`, `-`, `!`, prefix `++`/`--`
//! 11. Postfix `++`/`--`
//!
//! Unary operators bind tighter than `^`, so `-2^2` is `(-2)^2`.
//!
//! ## Module Organization
//!
//! - `pratt` - assignment, ternary and binary levels, unary and postfix operators
//! - `atoms` - literals, identifiers, calls, image references, lists, parentheses

mod atoms;
mod pratt;

use super::{ParseError, TokenStream};
use jiffle_ast::Expr;

/// Parse a full expression, including assignment forms.
pub fn parse_expr(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    pratt::parse_assignment(stream)
}

