//! Pratt parser core - precedence climbing for binary and unary operators.

use super::super::{ParseError, TokenStream};
use super::atoms;
use jiffle_ast::{AssignOp, BinaryOp, Expr, ExprKind, StepOp, UnaryOp};
use jiffle_lexer::Token;

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// Get binary operator metadata (precedence, associativity, and operator enum).
///
/// Returns (precedence, associativity, op) where higher precedence = tighter binding.
fn binary_op_info(token: &Token) -> Option<(u8, Assoc, BinaryOp)> {
    match token {
        Token::OrOr => Some((10, Assoc::Left, BinaryOp::Or)),
        Token::Xor => Some((15, Assoc::Left, BinaryOp::Xor)),
        Token::AndAnd => Some((20, Assoc::Left, BinaryOp::And)),
        Token::EqEq => Some((30, Assoc::Left, BinaryOp::Eq)),
        Token::BangEq => Some((30, Assoc::Left, BinaryOp::Ne)),
        Token::Lt => Some((30, Assoc::Left, BinaryOp::Lt)),
        Token::LtEq => Some((30, Assoc::Left, BinaryOp::Le)),
        Token::Gt => Some((30, Assoc::Left, BinaryOp::Gt)),
        Token::GtEq => Some((30, Assoc::Left, BinaryOp::Ge)),
        Token::Plus => Some((40, Assoc::Left, BinaryOp::Add)),
        Token::Minus => Some((40, Assoc::Left, BinaryOp::Sub)),
        Token::Star => Some((50, Assoc::Left, BinaryOp::Mul)),
        Token::Slash => Some((50, Assoc::Left, BinaryOp::Div)),
        Token::Percent => Some((50, Assoc::Left, BinaryOp::Mod)),
        Token::Caret => Some((60, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

/// Assignment operators; `None` marks `<<` (append).
fn assign_op_info(token: &Token) -> Option<Option<AssignOp>> {
    match token {
        Token::Eq => Some(Some(AssignOp::Assign)),
        Token::PlusEq => Some(Some(AssignOp::Add)),
        Token::MinusEq => Some(Some(AssignOp::Sub)),
        Token::StarEq => Some(Some(AssignOp::Mul)),
        Token::SlashEq => Some(Some(AssignOp::Div)),
        Token::PercentEq => Some(Some(AssignOp::Mod)),
        Token::Append => Some(None),
        _ => None,
    }
}

/// Parse the assignment level (lowest precedence, right associative).
pub(super) fn parse_assignment(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let target = parse_ternary(stream)?;

    let Some(info) = stream.peek().and_then(assign_op_info) else {
        return Ok(target);
    };
    let op_span = stream.current_span();
    stream.advance();

    let value = parse_assignment(stream)?;
    let span = stream.span_from(start);

    let kind = match info {
        Some(op) => {
            check_assign_target(&target, op, op_span)?;
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            }
        }
        None => ExprKind::Append {
            target: Box::new(target),
            value: Box::new(value),
        },
    };

    Ok(Expr::new(stream.node_id(), kind, span))
}

/// Assignment targets are variables or a band of an image at the current pixel.
fn check_assign_target(
    target: &Expr,
    op: AssignOp,
    op_span: jiffle_ast::Span,
) -> Result<(), ParseError> {
    match &target.kind {
        ExprKind::Ident(_) => Ok(()),
        ExprKind::Image { pixel: None, .. } => Ok(()),
        ExprKind::Image { name, .. } => Err(ParseError::invalid_syntax(
            format!(
                "cannot assign with '{}' to a neighbourhood position of '{}'",
                op.symbol(),
                name
            ),
            target.span,
        )),
        _ => Err(ParseError::invalid_syntax(
            format!("invalid target for '{}'", op.symbol()),
            op_span,
        )),
    }
}

/// Parse `cond ? a : b`.
fn parse_ternary(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let condition = parse_pratt(stream, 0)?;

    if !stream.eat(&Token::Question) {
        return Ok(condition);
    }

    let then_branch = parse_assignment(stream)?;
    stream.expect(Token::Colon)?;
    let else_branch = parse_assignment(stream)?;
    let span = stream.span_from(start);

    Ok(Expr::new(
        stream.node_id(),
        ExprKind::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        },
        span,
    ))
}

/// Pratt parser - handles binary operators with precedence climbing.
pub(super) fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let mut left = parse_prefix(stream)?;

    while let Some((prec, assoc, op)) = stream.peek().and_then(binary_op_info) {
        if prec < min_prec {
            break;
        }
        stream.advance();

        let next_prec = if assoc == Assoc::Left { prec + 1 } else { prec };
        let right = parse_pratt(stream, next_prec)?;

        let span = stream.span_from(start);
        left = Expr::new(
            stream.node_id(),
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        );
    }

    Ok(left)
}

/// Parse prefix expressions (unary operators, prefix increment, postfix chains).
fn parse_prefix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();

    let unary = match stream.peek() {
        Some(Token::Minus) => Some(UnaryOp::Neg),
        Some(Token::Plus) => Some(UnaryOp::Plus),
        Some(Token::Bang) => Some(UnaryOp::Not),
        _ => None,
    };
    if let Some(op) = unary {
        stream.advance();
        let operand = parse_prefix(stream)?;
        let span = stream.span_from(start);
        return Ok(Expr::new(
            stream.node_id(),
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ));
    }

    let step = match stream.peek() {
        Some(Token::PlusPlus) => Some(StepOp::Increment),
        Some(Token::MinusMinus) => Some(StepOp::Decrement),
        _ => None,
    };
    if let Some(op) = step {
        stream.advance();
        let target = parse_prefix(stream)?;
        return make_step(stream, start, op, true, target);
    }

    parse_postfix(stream)
}

/// Parse an atom followed by an optional postfix `++` or `--`.
fn parse_postfix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let expr = atoms::parse_atom(stream)?;

    let op = match stream.peek() {
        Some(Token::PlusPlus) => StepOp::Increment,
        Some(Token::MinusMinus) => StepOp::Decrement,
        _ => return Ok(expr),
    };
    stream.advance();
    make_step(stream, start, op, false, expr)
}

fn make_step(
    stream: &mut TokenStream,
    start: usize,
    op: StepOp,
    prefix: bool,
    target: Expr,
) -> Result<Expr, ParseError> {
    if !matches!(target.kind, ExprKind::Ident(_)) {
        return Err(ParseError::invalid_syntax(
            format!("'{}' can only be applied to a variable", op.symbol()),
            target.span,
        ));
    }
    let span = stream.span_from(start);
    Ok(Expr::new(
        stream.node_id(),
        ExprKind::Step {
            op,
            prefix,
            target: Box::new(target),
        },
        span,
    ))
}
