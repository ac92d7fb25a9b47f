//! Expression transformation pass
//!
//! Lowers a classified [`Program`] to an [`IrProgram`].
//!
//! # Rewrites
//!
//! | source form                 | lowered form                                  |
//! |-----------------------------|-----------------------------------------------|
//! | `x op= e`                   | `SetVar x (x op e)`                           |
//! | `x++`, `--x`                | `SetVar x (x ± 1)`                            |
//! | `xs << e`                   | `AppendVar xs e`                              |
//! | `dest = e`, `dest[b] = e`   | `WriteImage dest b e` (band 0 by default)     |
//! | `c ? a = 1 : b = 2;`        | `If c [a = 1] [b = 2]`                        |
//! | `until (c) s`               | `While !c s`                                  |
//! | `img`, `img[b][dx, $y]`     | `ReadImage` with explicit coordinates         |
//! | `true`, `null`, `M_PI`      | number literals                               |
//! | `x()`, `width()`, ...       | `Position` queries                            |
//!
//! Blocks disappear: scoping was settled by the classifier, so nested
//! statements are flattened into their parent's list.
//!
//! This pass runs only on programs the earlier passes accepted. A node the
//! classifier left unresolved is a compiler defect and is reported as
//! [`ErrorKind::Internal`](jiffle_ast::ErrorKind::Internal).

use crate::resolve::classify::{Classification, Resolved};
use crate::resolve::ir::{ImageSlot, IrCoord, IrExpr, IrProgram, IrStmt, VarSlot};
use crate::resolve::options::ScriptOptions;
use jiffle_ast::{
    BinaryOp, CompileError, Coord, Expr, ExprKind, LoopSource, Program, Stmt, StmtKind, StepOp,
};

/// Lower `program` using the classifier's side table.
pub fn transform(
    program: &Program,
    classification: &Classification,
    options: ScriptOptions,
) -> (IrProgram, Vec<CompileError>) {
    let mut lowerer = Lowerer {
        classification,
        options,
        errors: Vec::new(),
    };

    let mut init = Vec::new();
    for decl in &program.init {
        let value = lowerer.expr(&decl.value);
        match classification.get(decl.id) {
            Some(Resolved::Var(var)) => init.push(IrStmt::SetVar { var, value }),
            _ => lowerer.internal(&decl.value, "init variable has no slot"),
        }
    }

    let mut body = Vec::new();
    for stmt in &program.body {
        lowerer.stmt(stmt, &mut body);
    }

    let ir = IrProgram {
        vars: classification
            .vars
            .iter()
            .map(|v| VarSlot {
                name: v.name.clone(),
                scope: v.scope,
            })
            .collect(),
        images: classification
            .images
            .iter()
            .map(|i| ImageSlot {
                name: i.name.clone(),
                role: i.role,
            })
            .collect(),
        init,
        body,
        options,
    };

    (ir, lowerer.errors)
}

struct Lowerer<'a> {
    classification: &'a Classification,
    options: ScriptOptions,
    errors: Vec<CompileError>,
}

impl Lowerer<'_> {
    fn internal(&mut self, at: &Expr, message: &str) {
        self.errors.push(CompileError::internal(at.span, message));
    }

    fn block(&mut self, stmt: &Stmt) -> Vec<IrStmt> {
        let mut out = Vec::new();
        self.stmt(stmt, &mut out);
        out
    }

    fn stmt(&mut self, stmt: &Stmt, out: &mut Vec<IrStmt>) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.effect(expr, out),
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.stmt(s, out);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.expr(condition);
                let then_branch = self.block(then_branch);
                let else_branch = match else_branch {
                    Some(s) => self.block(s),
                    None => Vec::new(),
                };
                out.push(IrStmt::If {
                    condition,
                    then_branch,
                    else_branch,
                });
            }
            StmtKind::Foreach { source, body, .. } => {
                let Some(Resolved::Var(var)) = self.classification.get(stmt.id) else {
                    self.errors.push(CompileError::internal(
                        stmt.span,
                        "loop variable has no slot",
                    ));
                    return;
                };
                let lowered = match source {
                    LoopSource::Range { start, end } => IrStmt::Range {
                        var,
                        start: self.expr(start),
                        end: self.expr(end),
                        body: self.block(body),
                    },
                    LoopSource::List(list) => IrStmt::Each {
                        var,
                        list: self.expr(list),
                        body: self.block(body),
                    },
                };
                out.push(lowered);
            }
            StmtKind::While { condition, body } => {
                let condition = self.expr(condition);
                let body = self.block(body);
                out.push(IrStmt::While { condition, body });
            }
            StmtKind::Until { condition, body } => {
                let condition = IrExpr::not(self.expr(condition));
                let body = self.block(body);
                out.push(IrStmt::While { condition, body });
            }
            StmtKind::Break => out.push(IrStmt::Break),
            StmtKind::BreakIf(condition) => {
                let condition = self.expr(condition);
                out.push(IrStmt::BreakIf(condition));
            }
            StmtKind::Empty => {}
        }
    }

    /// Lower an expression in statement position.
    fn effect(&mut self, expr: &Expr, out: &mut Vec<IrStmt>) {
        match &expr.kind {
            ExprKind::Assign { op, target, value } => {
                let value = self.expr(value);
                match self.classification.get(target.id) {
                    Some(Resolved::Var(var)) => {
                        let value = match op.binary() {
                            Some(bin) => IrExpr::binary(bin, IrExpr::Var(var), value),
                            None => value,
                        };
                        out.push(IrStmt::SetVar { var, value });
                    }
                    Some(Resolved::Image(image)) if op.binary().is_none() => {
                        let band = match &target.kind {
                            ExprKind::Image {
                                band: Some(band), ..
                            } => self.expr(band),
                            _ => IrExpr::Number(0.0),
                        };
                        out.push(IrStmt::WriteImage { image, band, value });
                    }
                    _ => self.internal(target, "assignment target has no slot"),
                }
            }
            ExprKind::Step { op, target, .. } => match self.classification.get(target.id) {
                Some(Resolved::Var(var)) => {
                    let bin = match op {
                        StepOp::Increment => BinaryOp::Add,
                        StepOp::Decrement => BinaryOp::Sub,
                    };
                    out.push(IrStmt::SetVar {
                        var,
                        value: IrExpr::binary(bin, IrExpr::Var(var), IrExpr::Number(1.0)),
                    });
                }
                _ => self.internal(target, "step target has no slot"),
            },
            ExprKind::Append { target, value } => match self.classification.get(target.id) {
                Some(Resolved::Var(var)) => {
                    let value = self.expr(value);
                    out.push(IrStmt::AppendVar { var, value });
                }
                _ => self.internal(target, "append target has no slot"),
            },
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } if has_effect(then_branch) || has_effect(else_branch) => {
                let condition = self.expr(condition);
                let mut then_stmts = Vec::new();
                self.effect(then_branch, &mut then_stmts);
                let mut else_stmts = Vec::new();
                self.effect(else_branch, &mut else_stmts);
                out.push(IrStmt::If {
                    condition,
                    then_branch: then_stmts,
                    else_branch: else_stmts,
                });
            }
            _ => {
                let value = self.expr(expr);
                out.push(IrStmt::Eval(value));
            }
        }
    }

    /// Lower an expression in value position.
    fn expr(&mut self, expr: &Expr) -> IrExpr {
        match &expr.kind {
            ExprKind::Number(n) => IrExpr::Number(*n),
            ExprKind::Bool(b) => IrExpr::Number(if *b { 1.0 } else { 0.0 }),
            ExprKind::Null => IrExpr::Number(f64::NAN),
            ExprKind::Ident(_) => match self.classification.get(expr.id) {
                Some(Resolved::Var(var)) => IrExpr::Var(var),
                Some(Resolved::Constant(value)) => IrExpr::Number(value),
                Some(Resolved::Image(image)) => IrExpr::ReadImage {
                    image,
                    band: Box::new(IrExpr::Number(0.0)),
                    x: IrCoord::Current,
                    y: IrCoord::Current,
                    outside: self.options.outside,
                },
                _ => self.unresolved(expr),
            },
            ExprKind::Call { args, .. } => match self.classification.get(expr.id) {
                Some(Resolved::Position(position)) => IrExpr::Position(position),
                Some(Resolved::Function(function)) => IrExpr::Call {
                    function,
                    args: args.iter().map(|a| self.expr(a)).collect(),
                },
                _ => self.unresolved(expr),
            },
            ExprKind::Image { band, pixel, .. } => {
                let Some(Resolved::Image(image)) = self.classification.get(expr.id) else {
                    return self.unresolved(expr);
                };
                let band = match band {
                    Some(band) => self.expr(band),
                    None => IrExpr::Number(0.0),
                };
                let (x, y) = match pixel {
                    Some(pixel) => (self.coord(&pixel.x), self.coord(&pixel.y)),
                    None => (IrCoord::Current, IrCoord::Current),
                };
                IrExpr::ReadImage {
                    image,
                    band: Box::new(band),
                    x,
                    y,
                    outside: self.options.outside,
                }
            }
            ExprKind::List(items) => IrExpr::List(items.iter().map(|i| self.expr(i)).collect()),
            ExprKind::Unary { op, operand } => IrExpr::Unary {
                op: *op,
                operand: Box::new(self.expr(operand)),
            },
            ExprKind::Binary { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                IrExpr::binary(*op, left, right)
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => IrExpr::Ternary {
                condition: Box::new(self.expr(condition)),
                then_branch: Box::new(self.expr(then_branch)),
                else_branch: Box::new(self.expr(else_branch)),
            },
            ExprKind::Assign { .. } | ExprKind::Append { .. } | ExprKind::Step { .. } => {
                self.internal(expr, "assignment in value position");
                IrExpr::Number(f64::NAN)
            }
        }
    }

    fn coord(&mut self, coord: &Coord) -> IrCoord {
        let value = Box::new(self.expr(&coord.value));
        if coord.absolute {
            IrCoord::Absolute(value)
        } else {
            IrCoord::Relative(value)
        }
    }

    fn unresolved(&mut self, expr: &Expr) -> IrExpr {
        self.internal(expr, "reference was not resolved");
        IrExpr::Number(f64::NAN)
    }
}

/// True if a statement-position expression assigns, directly or through
/// the branches of a naked ternary.
fn has_effect(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ternary {
            then_branch,
            else_branch,
            ..
        } => has_effect(then_branch) || has_effect(else_branch),
        _ => expr.is_effect(),
    }
}
