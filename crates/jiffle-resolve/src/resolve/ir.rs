//! Lowered intermediate representation.
//!
//! The transformer turns a classified AST into an [`IrProgram`]. The IR has
//! no names left in it: variables are [`VarId`] slots, images are
//! [`ImageId`]s, functions are [`FunctionId`]s and constants are folded to
//! numbers. Statement-only forms (compound assignment, `++`, `<<`, naked
//! ternaries, `until`) are rewritten into a small set of primitives the
//! bytecode compiler handles directly.

use crate::resolve::classify::{ImageId, VarId};
use crate::resolve::options::ScriptOptions;
use crate::resolve::scope::ScopeType;
use jiffle_ast::{BinaryOp, ImageRole, UnaryOp};
use jiffle_functions::{FunctionId, Position};

/// A lowered script, ready for code generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrProgram {
    /// Variable slots, indexed by [`VarId`]
    pub vars: Vec<VarSlot>,
    /// Images, indexed by [`ImageId`]
    pub images: Vec<ImageSlot>,
    /// Image-scope initialisation, run once per pass before any pixel
    pub init: Vec<IrStmt>,
    /// Pixel-scope statements, run once per pixel
    pub body: Vec<IrStmt>,
    pub options: ScriptOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSlot {
    pub name: String,
    pub scope: ScopeType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    pub name: String,
    pub role: ImageRole,
}

impl IrProgram {
    /// Images with the given role, in declaration order.
    pub fn images_with_role(&self, role: ImageRole) -> impl Iterator<Item = (ImageId, &ImageSlot)> {
        self.images
            .iter()
            .enumerate()
            .filter(move |(_, slot)| slot.role == role)
            .map(|(i, slot)| (ImageId(i as u32), slot))
    }

    pub fn image_id(&self, name: &str) -> Option<ImageId> {
        self.images
            .iter()
            .position(|slot| slot.name == name)
            .map(|i| ImageId(i as u32))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrStmt {
    /// Evaluate for its value; the last one evaluated is the pixel's result
    Eval(IrExpr),
    SetVar {
        var: VarId,
        value: IrExpr,
    },
    /// Push a value onto a list variable
    AppendVar {
        var: VarId,
        value: IrExpr,
    },
    /// Write a band of the current pixel of a destination image
    WriteImage {
        image: ImageId,
        band: IrExpr,
        value: IrExpr,
    },
    If {
        condition: IrExpr,
        then_branch: Vec<IrStmt>,
        else_branch: Vec<IrStmt>,
    },
    /// Inclusive ascending integer loop; bounds are evaluated once
    Range {
        var: VarId,
        start: IrExpr,
        end: IrExpr,
        body: Vec<IrStmt>,
    },
    /// Loop over the elements of a list
    Each {
        var: VarId,
        list: IrExpr,
        body: Vec<IrStmt>,
    },
    While {
        condition: IrExpr,
        body: Vec<IrStmt>,
    },
    Break,
    BreakIf(IrExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    Number(f64),
    Var(VarId),
    List(Vec<IrExpr>),
    /// Read one band of a source image.
    ///
    /// `outside` replaces reads that fall beyond the image bounds; without
    /// it such a read is a runtime error.
    ReadImage {
        image: ImageId,
        band: Box<IrExpr>,
        x: IrCoord,
        y: IrCoord,
        outside: Option<f64>,
    },
    Position(Position),
    Unary {
        op: UnaryOp,
        operand: Box<IrExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<IrExpr>,
        right: Box<IrExpr>,
    },
    Ternary {
        condition: Box<IrExpr>,
        then_branch: Box<IrExpr>,
        else_branch: Box<IrExpr>,
    },
    Call {
        function: FunctionId,
        args: Vec<IrExpr>,
    },
}

/// One axis of an image read.
#[derive(Debug, Clone, PartialEq)]
pub enum IrCoord {
    /// The pixel being evaluated
    Current,
    /// Offset from the pixel being evaluated
    Relative(Box<IrExpr>),
    /// Fixed coordinate
    Absolute(Box<IrExpr>),
}

impl IrExpr {
    pub fn binary(op: BinaryOp, left: IrExpr, right: IrExpr) -> Self {
        IrExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: IrExpr) -> Self {
        IrExpr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }
}
