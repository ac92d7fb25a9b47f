//! Pretty printing of the AST back to Jiffle source.
//!
//! Output re-parses to a tree with the same behavior: compound operands are
//! always parenthesized, so printed scripts never depend on precedence rules.

use super::{Coord, Expr, ExprKind, LoopSource, Program, Stmt, StmtKind};
use std::fmt::{self, Display, Formatter, Write};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => write!(f, "{}", n),
            ExprKind::Bool(b) => write!(f, "{}", b),
            ExprKind::Null => f.write_str("null"),
            ExprKind::Ident(name) => f.write_str(name),
            ExprKind::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                f.write_char(')')
            }
            ExprKind::Image { name, band, pixel } => {
                f.write_str(name)?;
                if let Some(band) = band {
                    write!(f, "[{}]", band)?;
                }
                if let Some(pixel) = pixel {
                    write!(f, "[{}, {}]", CoordDisplay(&pixel.x), CoordDisplay(&pixel.y))?;
                }
                Ok(())
            }
            ExprKind::List(items) => {
                f.write_char('[')?;
                write_list(f, items)?;
                f.write_char(']')
            }
            ExprKind::Unary { op, operand } => {
                write!(f, "{}{}", op.symbol(), Operand(operand))
            }
            ExprKind::Binary { op, left, right } => {
                write!(f, "{} {} {}", Operand(left), op.symbol(), Operand(right))
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => write!(
                f,
                "{} ? {} : {}",
                Operand(condition),
                Operand(then_branch),
                Operand(else_branch)
            ),
            ExprKind::Assign { op, target, value } => {
                write!(f, "{} {} {}", target, op.symbol(), value)
            }
            ExprKind::Append { target, value } => write!(f, "{} << {}", target, value),
            ExprKind::Step { op, prefix, target } => {
                if *prefix {
                    write!(f, "{}{}", op.symbol(), target)
                } else {
                    write!(f, "{}{}", target, op.symbol())
                }
            }
        }
    }
}

/// Wraps compound operands in parentheses.
struct Operand<'a>(&'a Expr);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            ExprKind::Binary { .. }
            | ExprKind::Ternary { .. }
            | ExprKind::Assign { .. }
            | ExprKind::Append { .. }
            | ExprKind::Unary { .. } => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

struct CoordDisplay<'a>(&'a Coord);

impl Display for CoordDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.absolute {
            f.write_char('$')?;
        }
        write!(f, "{}", self.0.value)
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_stmt(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = "    ".repeat(depth);
    match &stmt.kind {
        StmtKind::Expr(expr) => writeln!(f, "{}{};", pad, expr),
        StmtKind::Block(stmts) => {
            writeln!(f, "{}{{", pad)?;
            for inner in stmts {
                write_stmt(f, inner, depth + 1)?;
            }
            writeln!(f, "{}}}", pad)
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            writeln!(f, "{}if ({})", pad, condition)?;
            write_stmt(f, then_branch, depth + 1)?;
            if let Some(else_branch) = else_branch {
                writeln!(f, "{}else", pad)?;
                write_stmt(f, else_branch, depth + 1)?;
            }
            Ok(())
        }
        StmtKind::Foreach { var, source, body } => {
            match source {
                LoopSource::Range { start, end } => {
                    writeln!(f, "{}foreach ({} in {}:{})", pad, var, start, end)?
                }
                LoopSource::List(list) => writeln!(f, "{}foreach ({} in {})", pad, var, list)?,
            }
            write_stmt(f, body, depth + 1)
        }
        StmtKind::While { condition, body } => {
            writeln!(f, "{}while ({})", pad, condition)?;
            write_stmt(f, body, depth + 1)
        }
        StmtKind::Until { condition, body } => {
            writeln!(f, "{}until ({})", pad, condition)?;
            write_stmt(f, body, depth + 1)
        }
        StmtKind::Break => writeln!(f, "{}break;", pad),
        StmtKind::BreakIf(condition) => writeln!(f, "{}breakif({});", pad, condition),
        StmtKind::Empty => writeln!(f, "{};", pad),
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.options.is_empty() {
            writeln!(f, "options {{")?;
            for entry in &self.options {
                writeln!(f, "    {} = {};", entry.name, entry.value)?;
            }
            writeln!(f, "}}")?;
        }
        if !self.images.is_empty() {
            writeln!(f, "images {{")?;
            for decl in &self.images {
                writeln!(f, "    {} = {};", decl.name, decl.role.keyword())?;
            }
            writeln!(f, "}}")?;
        }
        if !self.init.is_empty() {
            writeln!(f, "init {{")?;
            for decl in &self.init {
                writeln!(f, "    {} = {};", decl.name, decl.value)?;
            }
            writeln!(f, "}}")?;
        }
        for stmt in &self.body {
            write_stmt(f, stmt, 0)?;
        }
        Ok(())
    }
}
