//! Instruction set.

use jiffle_ast::BinaryOp;
use jiffle_functions::{FunctionId, Position};

/// How an image read finds one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The pixel being evaluated; nothing is popped
    Current,
    /// Pop an offset from the pixel being evaluated
    Relative,
    /// Pop a coordinate
    Absolute,
}

/// One bytecode instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    // === Stack ===
    /// Push literal `n` of the chunk's literal table.
    Const(u32),
    /// Push a copy of slot `n`.
    Load(u32),
    /// Pop into slot `n`.
    Store(u32),
    /// Pop a number and append it to the list in slot `n`.
    Append(u32),
    /// Pop `n` numbers (first pushed is first element) and push a list.
    MakeList(u32),
    /// Pop a list, push its length.
    Len,
    /// Pop an index, pop a list, push the element.
    Index,
    Pop,

    // === Arithmetic and logic ===
    Neg,
    Not,
    /// Check the top of the stack is a number (unary `+`).
    Num,
    /// Replace the top of the stack with its truth value (1 or 0).
    Truth,
    /// Pop right, pop left, push `left op right`. Never `And`/`Or`;
    /// those compile to jumps.
    Binary(BinaryOp),

    // === Images ===
    /// Pop `y` then `x` (for non-`Current` axes) then the band, and push
    /// the source sample. `outside` is the literal used for reads beyond
    /// the image bounds.
    Read {
        image: u32,
        x: Axis,
        y: Axis,
        outside: Option<u32>,
    },
    /// Pop a value, pop a band, write the current pixel of a destination.
    Write { image: u32 },
    /// Push a pixel position query.
    Position(Position),
    /// Pop `argc` arguments (first pushed is first argument), push the result.
    Call { function: FunctionId, argc: u8 },

    // === Control ===
    Jump(u32),
    /// Pop a condition; jump if it is false.
    JumpIfFalse(u32),
    /// Pop a condition; jump if it is true.
    JumpIfTrue(u32),
    /// Pop a value into the result register.
    SetResult,
}

impl Op {
    /// Values popped and pushed by this instruction.
    pub fn stack_effect(self) -> (usize, usize) {
        match self {
            Op::Const(_) | Op::Load(_) | Op::Position(_) => (0, 1),
            Op::Store(_) | Op::Append(_) | Op::Pop | Op::SetResult => (1, 0),
            Op::MakeList(n) => (n as usize, 1),
            Op::Len | Op::Neg | Op::Not | Op::Num | Op::Truth => (1, 1),
            Op::Index | Op::Binary(_) => (2, 1),
            Op::Read { x, y, .. } => {
                let popped = [x, y].iter().filter(|a| **a != Axis::Current).count();
                (1 + popped, 1)
            }
            Op::Write { .. } => (2, 0),
            Op::Call { argc, .. } => (argc as usize, 1),
            Op::Jump(_) => (0, 0),
            Op::JumpIfFalse(_) | Op::JumpIfTrue(_) => (1, 0),
        }
    }

    /// Jump target, if this is a jump.
    pub fn jump_target(self) -> Option<u32> {
        match self {
            Op::Jump(t) | Op::JumpIfFalse(t) | Op::JumpIfTrue(t) => Some(t),
            _ => None,
        }
    }

    /// True if execution can continue with the next instruction.
    pub fn falls_through(self) -> bool {
        !matches!(self, Op::Jump(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_pops_only_explicit_axes() {
        let current = Op::Read {
            image: 0,
            x: Axis::Current,
            y: Axis::Current,
            outside: None,
        };
        assert_eq!(current.stack_effect(), (1, 1));
        let neighbour = Op::Read {
            image: 0,
            x: Axis::Relative,
            y: Axis::Absolute,
            outside: Some(0),
        };
        assert_eq!(neighbour.stack_effect(), (3, 1));
    }

    #[test]
    fn test_jumps() {
        assert_eq!(Op::JumpIfTrue(4).jump_target(), Some(4));
        assert_eq!(Op::Pop.jump_target(), None);
        assert!(!Op::Jump(0).falls_through());
        assert!(Op::JumpIfFalse(0).falls_through());
    }
}
