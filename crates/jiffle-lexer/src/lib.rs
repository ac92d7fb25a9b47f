// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for Jiffle scripts.
//!
//! Tokenization is driven by logos. Comments are real tokens so that they can
//! be routed to a hidden channel by [`lex`]: the parser never sees them, but
//! tools that re-scan the header blocks still can.
//!
//! # Design
//!
//! - `Token`: every lexical element (keywords, operators, literals, identifiers, comments)
//! - All numeric literals lex to `Token::Number(f64)`
//! - A digit run swallows any trailing identifier characters so `1e` or `2x`
//!   is reported as a malformed number instead of silently splitting
//! - Lexing stops at the first error; errors carry a 1-based line and column
//!
//! # Examples
//!
//! ```
//! # use jiffle_lexer::*;
//! let lexed = lex("dest = src[-1, 0]; /* west neighbour */").unwrap();
//! assert_eq!(lexed.tokens.len(), 10);
//! assert_eq!(lexed.comments.len(), 1);
//! ```

use logos::{Lexer, Logos};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

/// Category of lexical error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    /// Character sequence that starts no token
    #[default]
    InvalidToken,
    /// Numeric literal that does not parse as a number
    MalformedNumber,
    /// `/*` without a closing `*/`
    UnterminatedComment,
}

/// Jiffle token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // === Keywords ===
    #[token("options")]
    Options,
    #[token("images")]
    Images,
    #[token("init")]
    Init,
    #[token("foreach")]
    Foreach,
    #[token("in")]
    In,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("until")]
    Until,
    #[token("break")]
    Break,
    #[token("breakif")]
    BreakIf,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Operators ===

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,

    // Comparison
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // Logic
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("^|")]
    Xor,
    #[token("!")]
    Bang,

    // Assignment
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("<<")]
    Append,

    // Other
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("$")]
    Dollar,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]*)?[a-zA-Z0-9_.]*", parse_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]*)?[a-zA-Z0-9_.]*", parse_number)]
    Number(f64),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| Rc::from(lex.slice()))]
    Ident(Rc<str>),

    // === Comments (hidden channel) ===
    #[token("/*", block_comment)]
    BlockComment(Rc<str>),

    #[regex(r"//[^\n]*", |lex| Rc::from(lex.slice()))]
    LineComment(Rc<str>),
}

fn parse_number(lex: &mut Lexer<Token>) -> Result<f64, LexErrorKind> {
    lex.slice()
        .parse::<f64>()
        .map_err(|_| LexErrorKind::MalformedNumber)
}

fn block_comment(lex: &mut Lexer<Token>) -> Result<Rc<str>, LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(Rc::from(lex.slice()))
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

impl Token {
    /// True for comment tokens, which belong on the hidden channel.
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::BlockComment(_) | Token::LineComment(_))
    }

    /// Fixed spelling of keyword, operator and delimiter tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            Token::Options => "options",
            Token::Images => "images",
            Token::Init => "init",
            Token::Foreach => "foreach",
            Token::In => "in",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Until => "until",
            Token::Break => "break",
            Token::BreakIf => "breakif",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Caret => "^",
            Token::EqEq => "==",
            Token::BangEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Xor => "^|",
            Token::Bang => "!",
            Token::Eq => "=",
            Token::PlusEq => "+=",
            Token::MinusEq => "-=",
            Token::StarEq => "*=",
            Token::SlashEq => "/=",
            Token::PercentEq => "%=",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Append => "<<",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Dollar => "$",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Number(_)
            | Token::Ident(_)
            | Token::BlockComment(_)
            | Token::LineComment(_) => return None,
        };
        Some(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(id) => write!(f, "{}", id),
            Token::BlockComment(text) | Token::LineComment(text) => write!(f, "{}", text),
            other => match other.symbol() {
                Some(s) => f.write_str(s),
                None => Ok(()),
            },
        }
    }
}

/// Lexical error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Byte range of the offending text
    pub span: Range<usize>,
    /// 1-based line of the error start
    pub line: u32,
    /// 1-based column of the error start
    pub column: u32,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            LexErrorKind::InvalidToken => "invalid token",
            LexErrorKind::MalformedNumber => "malformed numeric literal",
            LexErrorKind::UnterminatedComment => "unterminated block comment",
        };
        write!(f, "{} at {}:{}", what, self.line, self.column)
    }
}

impl std::error::Error for LexError {}

/// Token stream split into the parser-visible channel and the hidden comment channel.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Tokens seen by the parser, with byte ranges
    pub tokens: Vec<(Token, Range<usize>)>,
    /// Comment tokens, with byte ranges
    pub comments: Vec<(Token, Range<usize>)>,
}

/// Tokenize a whole script.
///
/// Lexing aborts at the first malformed token.
pub fn lex(source: &str) -> Result<Lexed, LexError> {
    let mut lexed = Lexed::default();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        match result {
            Ok(token) if token.is_comment() => lexed.comments.push((token, range)),
            Ok(token) => lexed.tokens.push((token, range)),
            Err(kind) => {
                let (line, column) = line_col(source, range.start);
                return Err(LexError {
                    kind,
                    span: range,
                    line,
                    column,
                });
            }
        }
    }

    Ok(lexed)
}

/// 1-based (line, column) of a byte offset.
fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    (line as u32, (offset - line_start + 1) as u32)
}
