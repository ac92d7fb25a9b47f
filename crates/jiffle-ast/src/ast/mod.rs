//! Abstract syntax tree for Jiffle scripts.
//!
//! The parser produces a [`Program`]: optional header blocks (`options`,
//! `images`, `init`) followed by the pixel-scope statement list.
//!
//! Every [`Stmt`] and [`Expr`] carries a [`NodeId`] that is unique within one
//! parse. Semantic passes never annotate nodes in place; they record their
//! findings in side tables keyed by `NodeId` and later passes produce new trees.

mod display;
pub mod walk;

use crate::foundation::Span;
use serde::{Deserialize, Serialize};

/// Stable identifier of a statement or expression node within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Role of an image variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageRole {
    /// Image read by the script
    Source,
    /// Image written by the script
    Destination,
}

impl ImageRole {
    /// Keyword used for this role in an `images` block.
    pub fn keyword(self) -> &'static str {
        match self {
            ImageRole::Source => "read",
            ImageRole::Destination => "write",
        }
    }
}

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    /// Entries of the `options` block, in source order
    pub options: Vec<OptionEntry>,
    /// Entries of the `images` block, in source order
    pub images: Vec<ImageDecl>,
    /// Declarations of the `init` block (image-scope variables)
    pub init: Vec<InitDecl>,
    /// Pixel-scope statements
    pub body: Vec<Stmt>,
}

/// `key = value;` inside `options { }`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `name = read;` or `name = write;` inside `images { }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDecl {
    pub name: String,
    pub role: ImageRole,
    pub span: Span,
}

/// `name = expr;` inside `init { }`.
#[derive(Debug, Clone, PartialEq)]
pub struct InitDecl {
    pub id: NodeId,
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement, including assignments
    Expr(Expr),
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// `if (cond) stmt else stmt`
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `foreach (var in source) stmt`
    Foreach {
        var: String,
        source: LoopSource,
        body: Box<Stmt>,
    },
    /// `while (cond) stmt`
    While { condition: Expr, body: Box<Stmt> },
    /// `until (cond) stmt`
    Until { condition: Expr, body: Box<Stmt> },
    /// `break;`
    Break,
    /// `breakif(cond);`
    BreakIf(Expr),
    /// A lone `;`
    Empty,
}

/// What a `foreach` loop iterates over.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopSource {
    /// Inclusive integer sequence `start:end`
    Range { start: Expr, end: Expr },
    /// Elements of a list value
    List(Expr),
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal (always double precision)
    Number(f64),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// Bare identifier: variable, image at the current pixel, or constant
    Ident(String),
    /// Function call `name(args)`
    Call { name: String, args: Vec<Expr> },
    /// Image reference with band and/or pixel selection
    Image {
        name: String,
        band: Option<Box<Expr>>,
        pixel: Option<PixelRef>,
    },
    /// List literal `[a, b, c]`
    List(Vec<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `cond ? a : b`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `target = value` and compound forms
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `list << value`
    Append { target: Box<Expr>, value: Box<Expr> },
    /// `++x`, `x++`, `--x`, `x--`
    Step {
        op: StepOp,
        prefix: bool,
        target: Box<Expr>,
    },
}

/// Pixel position selector of an image reference: `[x, y]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRef {
    pub x: Coord,
    pub y: Coord,
}

/// One axis of a pixel selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord {
    /// `$`-prefixed: absolute coordinate rather than an offset from the current pixel
    pub absolute: bool,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    Xor,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepOp {
    Increment,
    Decrement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::Xor => "^|",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
        }
    }

    /// The arithmetic operator a compound assignment applies, if any.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
        }
    }
}

impl StepOp {
    pub fn symbol(self) -> &'static str {
        match self {
            StepOp::Increment => "++",
            StepOp::Decrement => "--",
        }
    }
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Name of the variable or image this expression denotes, if it is a plain reference.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            ExprKind::Image { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True for assignment-like forms that are only legal at statement level.
    pub fn is_effect(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Assign { .. } | ExprKind::Append { .. } | ExprKind::Step { .. }
        )
    }
}

impl Stmt {
    pub fn new(id: NodeId, kind: StmtKind, span: Span) -> Self {
        Self { id, kind, span }
    }
}

impl Program {
    /// True when the script has no header blocks and no statements.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.images.is_empty() && self.init.is_empty() && self.body.is_empty()
    }
}
