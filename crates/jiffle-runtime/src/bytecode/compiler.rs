//! Bytecode compiler from lowered IR.
//!
//! # Compilation Strategy
//!
//! 1. Assign one slot per IR variable, in [`VarId`] order
//! 2. Walk `init`, then the body, emitting opcodes depth-first
//! 3. Allocate temporary slots after the variables (loop bounds, list
//!    cursors); temporaries are never reused
//! 4. Patch forward jumps once their targets are known
//! 5. Run the [verifier](super::verify) over the finished program
//!
//! # Result Register
//!
//! Expression statements, scalar assignments and image writes set the
//! result register, so after a pixel the register holds the value of the
//! last such statement executed. Direct-mode `evaluate` returns it.
//!
//! # Control Flow Layout
//!
//! ```text
//! a && b      a; JumpIfFalse F; b; Truth; Jump E; F: Const 0; E:
//! c ? t : e   c; JumpIfFalse F; t; Jump E; F: e; E:
//! range       start; Store v; end; Store hi;
//!             T: Load v; Load hi; Le; JumpIfFalse X; body; v += 1; Jump T; X:
//! while       T: cond; JumpIfFalse X; body; Jump T; X:
//! ```
//!
//! `break` jumps to the innermost loop's exit; `breakif` does so through
//! `JumpIfTrue`.

use crate::bytecode::opcode::{Axis, Op};
use crate::bytecode::program::{Chunk, UnitProgram};
use crate::bytecode::verify::verify_program;
use jiffle_ast::{BinaryOp, CompileError, Span, UnaryOp};
use jiffle_resolve::ir::{IrCoord, IrExpr, IrProgram, IrStmt};
use jiffle_resolve::VarId;
use tracing::debug;

/// Compile and verify a lowered program.
///
/// # Errors
///
/// Returns an `Internal` diagnostic if the IR is malformed or the emitted
/// bytecode fails verification. Both indicate a compiler defect rather
/// than a problem with the script.
pub fn compile_program(ir: &IrProgram) -> Result<UnitProgram, CompileError> {
    let mut compiler = Compiler::new(ir.vars.len());

    let mut init = Chunk::new();
    compiler.compile_block(&mut init, &ir.init)?;
    let mut body = Chunk::new();
    compiler.compile_block(&mut body, &ir.body)?;

    let program = UnitProgram {
        init,
        body,
        slot_count: compiler.next_slot,
        var_names: ir.vars.iter().map(|v| v.name.clone()).collect(),
        images: ir.images.clone(),
        options: ir.options,
    };
    verify_program(&program)?;
    debug!(
        init = program.init.len(),
        body = program.body.len(),
        slots = program.slot_count,
        "bytecode compiled"
    );
    Ok(program)
}

/// Pending `break` sites of one enclosing loop.
type BreakSites = Vec<usize>;

struct Compiler {
    next_slot: usize,
    loops: Vec<BreakSites>,
}

impl Compiler {
    fn new(var_count: usize) -> Self {
        Self {
            next_slot: var_count,
            loops: Vec::new(),
        }
    }

    fn alloc_temp(&mut self) -> u32 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot as u32
    }

    fn compile_block(&mut self, chunk: &mut Chunk, stmts: &[IrStmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.compile_stmt(chunk, stmt)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, chunk: &mut Chunk, stmt: &IrStmt) -> Result<(), CompileError> {
        match stmt {
            IrStmt::Eval(expr) => {
                self.compile_expr(chunk, expr)?;
                chunk.emit(Op::SetResult);
            }
            IrStmt::SetVar { var, value } => {
                self.compile_expr(chunk, value)?;
                let slot = slot(*var);
                chunk.emit(Op::Store(slot));
                chunk.emit(Op::Load(slot));
                chunk.emit(Op::SetResult);
            }
            IrStmt::AppendVar { var, value } => {
                self.compile_expr(chunk, value)?;
                chunk.emit(Op::Append(slot(*var)));
            }
            IrStmt::WriteImage { image, band, value } => {
                self.compile_expr(chunk, band)?;
                self.compile_expr(chunk, value)?;
                chunk.emit(Op::Write { image: image.0 });
            }
            IrStmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_expr(chunk, condition)?;
                let to_else = chunk.emit(Op::JumpIfFalse(0));
                self.compile_block(chunk, then_branch)?;
                if else_branch.is_empty() {
                    chunk.patch(to_else, chunk.here());
                } else {
                    let to_end = chunk.emit(Op::Jump(0));
                    chunk.patch(to_else, chunk.here());
                    self.compile_block(chunk, else_branch)?;
                    chunk.patch(to_end, chunk.here());
                }
            }
            IrStmt::Range {
                var,
                start,
                end,
                body,
            } => {
                let var = slot(*var);
                let limit = self.alloc_temp();
                self.compile_expr(chunk, start)?;
                chunk.emit(Op::Store(var));
                self.compile_expr(chunk, end)?;
                chunk.emit(Op::Store(limit));

                let top = chunk.here();
                chunk.emit(Op::Load(var));
                chunk.emit(Op::Load(limit));
                chunk.emit(Op::Binary(BinaryOp::Le));
                let exit = chunk.emit(Op::JumpIfFalse(0));
                self.compile_loop_body(chunk, body, |chunk| {
                    let one = chunk.literal(1.0);
                    chunk.emit(Op::Load(var));
                    chunk.emit(Op::Const(one));
                    chunk.emit(Op::Binary(BinaryOp::Add));
                    chunk.emit(Op::Store(var));
                    chunk.emit(Op::Jump(top));
                })?;
                chunk.patch(exit, chunk.here());
            }
            IrStmt::Each { var, list, body } => {
                let var = slot(*var);
                let items = self.alloc_temp();
                let cursor = self.alloc_temp();
                self.compile_expr(chunk, list)?;
                chunk.emit(Op::Store(items));
                let zero = chunk.literal(0.0);
                chunk.emit(Op::Const(zero));
                chunk.emit(Op::Store(cursor));

                let top = chunk.here();
                chunk.emit(Op::Load(cursor));
                chunk.emit(Op::Load(items));
                chunk.emit(Op::Len);
                chunk.emit(Op::Binary(BinaryOp::Lt));
                let exit = chunk.emit(Op::JumpIfFalse(0));
                chunk.emit(Op::Load(items));
                chunk.emit(Op::Load(cursor));
                chunk.emit(Op::Index);
                chunk.emit(Op::Store(var));
                self.compile_loop_body(chunk, body, |chunk| {
                    let one = chunk.literal(1.0);
                    chunk.emit(Op::Load(cursor));
                    chunk.emit(Op::Const(one));
                    chunk.emit(Op::Binary(BinaryOp::Add));
                    chunk.emit(Op::Store(cursor));
                    chunk.emit(Op::Jump(top));
                })?;
                chunk.patch(exit, chunk.here());
            }
            IrStmt::While { condition, body } => {
                let top = chunk.here();
                self.compile_expr(chunk, condition)?;
                let exit = chunk.emit(Op::JumpIfFalse(0));
                self.compile_loop_body(chunk, body, |chunk| {
                    chunk.emit(Op::Jump(top));
                })?;
                chunk.patch(exit, chunk.here());
            }
            IrStmt::Break => {
                let at = chunk.emit(Op::Jump(0));
                self.record_break(at)?;
            }
            IrStmt::BreakIf(condition) => {
                self.compile_expr(chunk, condition)?;
                let at = chunk.emit(Op::JumpIfTrue(0));
                self.record_break(at)?;
            }
        }
        Ok(())
    }

    /// Compile a loop body followed by its back edge, then point every
    /// `break` in the body past the back edge.
    fn compile_loop_body(
        &mut self,
        chunk: &mut Chunk,
        body: &[IrStmt],
        back_edge: impl FnOnce(&mut Chunk),
    ) -> Result<(), CompileError> {
        self.loops.push(Vec::new());
        let compiled = self.compile_block(chunk, body);
        let breaks = self.loops.pop().unwrap_or_default();
        compiled?;
        back_edge(chunk);
        let exit = chunk.here();
        for at in breaks {
            chunk.patch(at, exit);
        }
        Ok(())
    }

    fn record_break(&mut self, at: usize) -> Result<(), CompileError> {
        match self.loops.last_mut() {
            Some(sites) => {
                sites.push(at);
                Ok(())
            }
            None => Err(CompileError::internal(
                Span::zero(),
                "break outside a loop reached code generation",
            )),
        }
    }

    fn compile_expr(&mut self, chunk: &mut Chunk, expr: &IrExpr) -> Result<(), CompileError> {
        match expr {
            IrExpr::Number(value) => {
                let index = chunk.literal(*value);
                chunk.emit(Op::Const(index));
            }
            IrExpr::Var(var) => {
                chunk.emit(Op::Load(slot(*var)));
            }
            IrExpr::List(items) => {
                for item in items {
                    self.compile_expr(chunk, item)?;
                }
                chunk.emit(Op::MakeList(items.len() as u32));
            }
            IrExpr::ReadImage {
                image,
                band,
                x,
                y,
                outside,
            } => {
                self.compile_expr(chunk, band)?;
                let x = self.compile_coord(chunk, x)?;
                let y = self.compile_coord(chunk, y)?;
                let outside = outside.map(|v| chunk.literal(v));
                chunk.emit(Op::Read {
                    image: image.0,
                    x,
                    y,
                    outside,
                });
            }
            IrExpr::Position(position) => {
                chunk.emit(Op::Position(*position));
            }
            IrExpr::Unary { op, operand } => {
                self.compile_expr(chunk, operand)?;
                chunk.emit(match op {
                    UnaryOp::Neg => Op::Neg,
                    UnaryOp::Plus => Op::Num,
                    UnaryOp::Not => Op::Not,
                });
            }
            IrExpr::Binary { op, left, right } => match op {
                BinaryOp::And => self.compile_short_circuit(chunk, left, right, false)?,
                BinaryOp::Or => self.compile_short_circuit(chunk, left, right, true)?,
                _ => {
                    self.compile_expr(chunk, left)?;
                    self.compile_expr(chunk, right)?;
                    chunk.emit(Op::Binary(*op));
                }
            },
            IrExpr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_expr(chunk, condition)?;
                let to_else = chunk.emit(Op::JumpIfFalse(0));
                self.compile_expr(chunk, then_branch)?;
                let to_end = chunk.emit(Op::Jump(0));
                chunk.patch(to_else, chunk.here());
                self.compile_expr(chunk, else_branch)?;
                chunk.patch(to_end, chunk.here());
            }
            IrExpr::Call { function, args } => {
                let argc = u8::try_from(args.len()).map_err(|_| {
                    CompileError::internal(Span::zero(), "function call has too many arguments")
                })?;
                for arg in args {
                    self.compile_expr(chunk, arg)?;
                }
                chunk.emit(Op::Call {
                    function: *function,
                    argc,
                });
            }
        }
        Ok(())
    }

    /// `left && right` (or `||` when `is_or`), yielding 1 or 0.
    fn compile_short_circuit(
        &mut self,
        chunk: &mut Chunk,
        left: &IrExpr,
        right: &IrExpr,
        is_or: bool,
    ) -> Result<(), CompileError> {
        self.compile_expr(chunk, left)?;
        let decided = if is_or {
            chunk.emit(Op::JumpIfTrue(0))
        } else {
            chunk.emit(Op::JumpIfFalse(0))
        };
        self.compile_expr(chunk, right)?;
        chunk.emit(Op::Truth);
        let to_end = chunk.emit(Op::Jump(0));
        chunk.patch(decided, chunk.here());
        let outcome = chunk.literal(if is_or { 1.0 } else { 0.0 });
        chunk.emit(Op::Const(outcome));
        chunk.patch(to_end, chunk.here());
        Ok(())
    }

    fn compile_coord(&mut self, chunk: &mut Chunk, coord: &IrCoord) -> Result<Axis, CompileError> {
        Ok(match coord {
            IrCoord::Current => Axis::Current,
            IrCoord::Relative(offset) => {
                self.compile_expr(chunk, offset)?;
                Axis::Relative
            }
            IrCoord::Absolute(position) => {
                self.compile_expr(chunk, position)?;
                Axis::Absolute
            }
        })
    }
}

fn slot(var: VarId) -> u32 {
    var.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiffle_ast::{ImageRole, SourceFile};
    use jiffle_parser::parse_program;
    use jiffle_resolve::{analyze, RoleMap};

    fn compile(source: &str, roles: &[(&str, ImageRole)]) -> UnitProgram {
        let file = SourceFile::new("test", source);
        let program = parse_program(&file).unwrap();
        let roles: RoleMap = roles
            .iter()
            .map(|(name, role)| (name.to_string(), *role))
            .collect();
        let analysis = analyze(&program, &roles).unwrap();
        compile_program(&analysis.ir).unwrap()
    }

    #[test]
    fn test_expression_statement_sets_result() {
        let program = compile("1 + 2;", &[]);
        assert_eq!(
            program.body.code,
            vec![
                Op::Const(0),
                Op::Const(1),
                Op::Binary(BinaryOp::Add),
                Op::SetResult
            ]
        );
        assert_eq!(program.body.literals, vec![1.0, 2.0]);
    }

    #[test]
    fn test_variables_precede_temporaries() {
        let program = compile("foreach (i in 1:3) { n = i; }", &[]);
        // i and n, plus the loop limit
        assert_eq!(program.var_names.len(), 2);
        assert_eq!(program.slot_count, 3);
    }

    #[test]
    fn test_breaks_jump_past_back_edge() {
        let program = compile("n = 0; while (1) { n += 1; breakif(n > 3); }", &[]);
        let code = &program.body.code;
        let exit = code.len() as u32;
        assert!(code.contains(&Op::JumpIfTrue(exit)));
        assert!(matches!(code.last(), Some(Op::Jump(_))));
    }

    #[test]
    fn test_neighbour_read_layout() {
        let program = compile(
            "options { outside = 0; } dest = src[1, -1];",
            &[("src", ImageRole::Source), ("dest", ImageRole::Destination)],
        );
        assert!(program.body.code.iter().any(|op| matches!(
            op,
            Op::Read {
                x: Axis::Relative,
                y: Axis::Relative,
                outside: Some(_),
                ..
            }
        )));
        assert!(program
            .body
            .code
            .iter()
            .any(|op| matches!(op, Op::Write { .. })));
    }

    #[test]
    fn test_init_compiles_to_its_own_chunk() {
        let program = compile("init { total = 0; } total += 1;", &[]);
        assert_eq!(program.init.code[0], Op::Const(0));
        assert!(!program.body.is_empty());
    }
}
