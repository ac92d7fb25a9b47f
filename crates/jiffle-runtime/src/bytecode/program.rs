//! Chunks and whole programs.

use crate::bytecode::opcode::Op;
use jiffle_resolve::ir::ImageSlot;
use jiffle_resolve::ScriptOptions;

/// A linear instruction sequence with its literal table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub code: Vec<Op>,
    pub literals: Vec<f64>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction and return its index.
    pub fn emit(&mut self, op: Op) -> usize {
        self.code.push(op);
        self.code.len() - 1
    }

    /// Index of `value` in the literal table, adding it if needed.
    ///
    /// Literals are compared bit for bit, so NaN and -0.0 get their own entries.
    pub fn literal(&mut self, value: f64) -> u32 {
        match self
            .literals
            .iter()
            .position(|v| v.to_bits() == value.to_bits())
        {
            Some(i) => i as u32,
            None => {
                self.literals.push(value);
                (self.literals.len() - 1) as u32
            }
        }
    }

    /// Index the next emitted instruction will get.
    pub fn here(&self) -> u32 {
        self.code.len() as u32
    }

    /// Point the jump at `at` to `target`.
    pub fn patch(&mut self, at: usize, target: u32) {
        if let Some(op) = self.code.get_mut(at) {
            *op = match *op {
                Op::Jump(_) => Op::Jump(target),
                Op::JumpIfFalse(_) => Op::JumpIfFalse(target),
                Op::JumpIfTrue(_) => Op::JumpIfTrue(target),
                other => other,
            };
        }
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// A compiled, verified script.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitProgram {
    /// Runs once per pass
    pub init: Chunk,
    /// Runs once per pixel
    pub body: Chunk,
    /// Variable slots followed by compiler temporaries
    pub slot_count: usize,
    /// Names of the user variable slots, for diagnostics
    pub var_names: Vec<String>,
    pub images: Vec<ImageSlot>,
    pub options: ScriptOptions,
}

impl UnitProgram {
    pub fn image_index(&self, name: &str) -> Option<usize> {
        self.images.iter().position(|slot| slot.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_are_deduplicated() {
        let mut chunk = Chunk::new();
        assert_eq!(chunk.literal(1.0), 0);
        assert_eq!(chunk.literal(2.0), 1);
        assert_eq!(chunk.literal(1.0), 0);
        assert_eq!(chunk.literal(f64::NAN), 2);
        assert_eq!(chunk.literal(f64::NAN), 2);
    }

    #[test]
    fn test_patch_rewrites_jump_target() {
        let mut chunk = Chunk::new();
        let at = chunk.emit(Op::JumpIfFalse(0));
        chunk.emit(Op::Pop);
        chunk.patch(at, chunk.here());
        assert_eq!(chunk.code[0], Op::JumpIfFalse(2));
    }
}
