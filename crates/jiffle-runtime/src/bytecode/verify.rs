//! Static verification of compiled programs.
//!
//! Every program is verified once, before any unit is built from it, so
//! the VM can index slots, literals, images and the function table
//! without re-checking them per instruction.
//!
//! # What Is Checked
//!
//! - jump targets land inside the chunk or exactly at its end
//! - slot, literal and image indices are in range
//! - reads name source images and writes name destination images
//! - `init` touches no image
//! - calls name a table function that accepts the argument count and is
//!   not a position query
//! - the operand stack never underflows, has one depth at every
//!   instruction whatever path reaches it, and is empty at the end
//!
//! Failures are `Internal` diagnostics: they mean the compiler emitted
//! bad code, not that the script is wrong.

use crate::bytecode::opcode::Op;
use crate::bytecode::program::{Chunk, UnitProgram};
use jiffle_ast::{BinaryOp, CompileError, ImageRole, Span};
use jiffle_functions::FunctionImpl;

/// Verify both chunks of a program.
pub fn verify_program(program: &UnitProgram) -> Result<(), CompileError> {
    verify_chunk(program, &program.init, "init")?;
    verify_chunk(program, &program.body, "body")
}

fn verify_chunk(program: &UnitProgram, chunk: &Chunk, name: &str) -> Result<(), CompileError> {
    let fail = |at: usize, what: String| {
        CompileError::internal(
            Span::zero(),
            format!("bytecode verification failed in {} at {}: {}", name, at, what),
        )
    };
    let is_init = name == "init";

    for (at, op) in chunk.code.iter().enumerate() {
        check_operands(program, chunk, *op, is_init).map_err(|what| fail(at, what))?;
    }
    check_stack(chunk).map_err(|(at, what)| fail(at, what))
}

fn check_operands(
    program: &UnitProgram,
    chunk: &Chunk,
    op: Op,
    is_init: bool,
) -> Result<(), String> {
    let slot = |n: u32| {
        if (n as usize) < program.slot_count {
            Ok(())
        } else {
            Err(format!("slot {} out of range ({} slots)", n, program.slot_count))
        }
    };
    let literal = |n: u32| {
        if (n as usize) < chunk.literals.len() {
            Ok(())
        } else {
            Err(format!("literal {} out of range", n))
        }
    };
    let image = |n: u32, role: ImageRole| match program.images.get(n as usize) {
        _ if is_init => Err("image access in init".to_string()),
        Some(slot) if slot.role == role => Ok(()),
        Some(slot) => Err(format!("image '{}' used with the wrong role", slot.name)),
        None => Err(format!("image {} out of range", n)),
    };

    match op {
        Op::Const(n) => literal(n),
        Op::Load(n) | Op::Store(n) | Op::Append(n) => slot(n),
        Op::Read { image: n, outside, .. } => {
            image(n, ImageRole::Source)?;
            outside.map_or(Ok(()), literal)
        }
        Op::Write { image: n } => image(n, ImageRole::Destination),
        Op::Call { function, argc } => {
            let descriptor = function
                .get()
                .ok_or_else(|| format!("unknown function id {}", function.0))?;
            if matches!(descriptor.implementation, FunctionImpl::Position(_)) {
                return Err(format!("position query '{}' compiled as a call", descriptor.name));
            }
            if !descriptor.arity.accepts(argc as usize) {
                return Err(format!(
                    "'{}' called with {} arguments",
                    descriptor.signature, argc
                ));
            }
            Ok(())
        }
        Op::Jump(t) | Op::JumpIfFalse(t) | Op::JumpIfTrue(t) => {
            if t as usize <= chunk.len() {
                Ok(())
            } else {
                Err(format!("jump target {} past end", t))
            }
        }
        Op::MakeList(_)
        | Op::Len
        | Op::Index
        | Op::Pop
        | Op::Neg
        | Op::Not
        | Op::Num
        | Op::Truth
        | Op::Position(_)
        | Op::SetResult => Ok(()),
        Op::Binary(BinaryOp::And | BinaryOp::Or) => {
            Err("short-circuit operator compiled as a binary op".to_string())
        }
        Op::Binary(_) => Ok(()),
    }
}

/// Depth-first walk of every path, tracking operand stack depth.
fn check_stack(chunk: &Chunk) -> Result<(), (usize, String)> {
    let len = chunk.len();
    // depth on entry to each instruction; index `len` is the chunk end
    let mut depth: Vec<Option<usize>> = vec![None; len + 1];
    let mut pending = vec![(0usize, 0usize)];

    while let Some((at, entry)) = pending.pop() {
        match depth[at] {
            Some(seen) if seen == entry => continue,
            Some(seen) => {
                return Err((
                    at,
                    format!("stack depth {} here, {} on another path", entry, seen),
                ))
            }
            None => depth[at] = Some(entry),
        }
        if at == len {
            if entry != 0 {
                return Err((at, format!("{} values left on the stack", entry)));
            }
            continue;
        }

        let op = chunk.code[at];
        let (pops, pushes) = op.stack_effect();
        if pops > entry {
            return Err((at, format!("{:?} pops {} of {} values", op, pops, entry)));
        }
        let exit = entry - pops + pushes;
        if op.falls_through() {
            pending.push((at + 1, exit));
        }
        if let Some(target) = op.jump_target() {
            pending.push((target as usize, exit));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::opcode::Axis;
    use jiffle_functions::lookup;
    use jiffle_resolve::ir::ImageSlot;
    use jiffle_resolve::ScriptOptions;

    fn program(body: Vec<Op>, literals: Vec<f64>) -> UnitProgram {
        UnitProgram {
            init: Chunk::new(),
            body: Chunk {
                code: body,
                literals,
            },
            slot_count: 1,
            var_names: vec!["a".into()],
            images: vec![
                ImageSlot {
                    name: "src".into(),
                    role: ImageRole::Source,
                },
                ImageSlot {
                    name: "dest".into(),
                    role: ImageRole::Destination,
                },
            ],
            options: ScriptOptions::default(),
        }
    }

    #[test]
    fn test_accepts_balanced_branches() {
        // 1 ? 2 : 3
        let p = program(
            vec![
                Op::Const(0),
                Op::JumpIfFalse(4),
                Op::Const(1),
                Op::Jump(5),
                Op::Const(2),
                Op::SetResult,
            ],
            vec![1.0, 2.0, 3.0],
        );
        assert!(verify_program(&p).is_ok());
    }

    #[test]
    fn test_rejects_unbalanced_branches() {
        let p = program(
            vec![Op::Const(0), Op::JumpIfFalse(3), Op::Const(0), Op::Pop],
            vec![1.0],
        );
        let err = verify_program(&p).unwrap_err();
        assert!(err.message.contains("stack depth"));
    }

    #[test]
    fn test_rejects_underflow_and_leftovers() {
        assert!(verify_program(&program(vec![Op::Pop], vec![])).is_err());
        assert!(verify_program(&program(vec![Op::Const(0)], vec![1.0])).is_err());
    }

    #[test]
    fn test_rejects_bad_indices() {
        assert!(verify_program(&program(vec![Op::Load(1), Op::Pop], vec![])).is_err());
        assert!(verify_program(&program(vec![Op::Const(3), Op::Pop], vec![])).is_err());
        assert!(verify_program(&program(vec![Op::Jump(9)], vec![])).is_err());
    }

    #[test]
    fn test_rejects_image_roles() {
        let read_dest = vec![
            Op::Const(0),
            Op::Read {
                image: 1,
                x: Axis::Current,
                y: Axis::Current,
                outside: None,
            },
            Op::Pop,
        ];
        assert!(verify_program(&program(read_dest, vec![0.0])).is_err());
        let write_src = vec![Op::Const(0), Op::Const(0), Op::Write { image: 0 }];
        assert!(verify_program(&program(write_src, vec![0.0])).is_err());
        let write_dest = vec![Op::Const(0), Op::Const(0), Op::Write { image: 1 }];
        assert!(verify_program(&program(write_dest, vec![0.0])).is_ok());
    }

    #[test]
    fn test_rejects_bad_calls() {
        let sin = lookup("sin", 1).unwrap();
        let ok = vec![Op::Const(0), Op::Call { function: sin, argc: 1 }, Op::Pop];
        assert!(verify_program(&program(ok, vec![0.0])).is_ok());
        let wrong_arity = vec![
            Op::Const(0),
            Op::Const(0),
            Op::Call { function: sin, argc: 2 },
            Op::Pop,
        ];
        assert!(verify_program(&program(wrong_arity, vec![0.0])).is_err());
        let x = lookup("x", 0).unwrap();
        let position = vec![Op::Call { function: x, argc: 0 }, Op::Pop];
        assert!(verify_program(&program(position, vec![])).is_err());
        let and = vec![Op::Const(0), Op::Const(0), Op::Binary(BinaryOp::And), Op::Pop];
        assert!(verify_program(&program(and, vec![0.0])).is_err());
    }
}
