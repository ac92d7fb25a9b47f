//! Tree walking utilities.
//!
//! Closure-based pre-order traversal shared by the analysis passes that only
//! need to inspect nodes (not thread scope through them).
//!
//! # Examples
//!
//! ```rust,ignore
//! use jiffle_ast::ast::walk::walk_expr;
//!
//! let mut calls = 0;
//! walk_expr(&expr, &mut |node| {
//!     if matches!(node.kind, ExprKind::Call { .. }) {
//!         calls += 1;
//!     }
//! });
//! ```

use super::{Expr, ExprKind, LoopSource, Stmt, StmtKind};

/// Recursively walk an expression tree in pre-order, calling `visitor` for each node.
pub fn walk_expr<V>(expr: &Expr, visitor: &mut V)
where
    V: FnMut(&Expr),
{
    visitor(expr);

    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Bool(_) | ExprKind::Null | ExprKind::Ident(_) => {}
        ExprKind::Call { args, .. } | ExprKind::List(args) => {
            for arg in args {
                walk_expr(arg, visitor);
            }
        }
        ExprKind::Image { band, pixel, .. } => {
            if let Some(band) = band {
                walk_expr(band, visitor);
            }
            if let Some(pixel) = pixel {
                walk_expr(&pixel.x.value, visitor);
                walk_expr(&pixel.y.value, visitor);
            }
        }
        ExprKind::Unary { operand, .. } => walk_expr(operand, visitor),
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, visitor);
            walk_expr(right, visitor);
        }
        ExprKind::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            walk_expr(condition, visitor);
            walk_expr(then_branch, visitor);
            walk_expr(else_branch, visitor);
        }
        ExprKind::Assign { target, value, .. } | ExprKind::Append { target, value } => {
            walk_expr(target, visitor);
            walk_expr(value, visitor);
        }
        ExprKind::Step { target, .. } => walk_expr(target, visitor),
    }
}

/// Walk every expression reachable from a statement, in source order.
pub fn walk_stmt_exprs<V>(stmt: &Stmt, visitor: &mut V)
where
    V: FnMut(&Expr),
{
    match &stmt.kind {
        StmtKind::Expr(expr) | StmtKind::BreakIf(expr) => walk_expr(expr, visitor),
        StmtKind::Block(stmts) => {
            for inner in stmts {
                walk_stmt_exprs(inner, visitor);
            }
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            walk_expr(condition, visitor);
            walk_stmt_exprs(then_branch, visitor);
            if let Some(else_branch) = else_branch {
                walk_stmt_exprs(else_branch, visitor);
            }
        }
        StmtKind::Foreach { source, body, .. } => {
            match source {
                LoopSource::Range { start, end } => {
                    walk_expr(start, visitor);
                    walk_expr(end, visitor);
                }
                LoopSource::List(list) => walk_expr(list, visitor),
            }
            walk_stmt_exprs(body, visitor);
        }
        StmtKind::While { condition, body } | StmtKind::Until { condition, body } => {
            walk_expr(condition, visitor);
            walk_stmt_exprs(body, visitor);
        }
        StmtKind::Break | StmtKind::Empty => {}
    }
}
