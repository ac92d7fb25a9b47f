//! Parse error types.

use jiffle_ast::error::{CompileError, ErrorKind};
use jiffle_ast::foundation::{SourceFile, Span};
use jiffle_lexer::{LexError, LexErrorKind, Token};
use std::fmt;

/// Parse error with source location and context.
///
/// Parse errors are always fatal for the compile attempt: the parser never
/// hands back a partial tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// Source location where error occurred
    pub span: Span,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer rejected the script before parsing started.
    Lexical(LexErrorKind),

    /// Unexpected token encountered where a specific token was expected.
    ///
    /// Example: expected `;` after a statement, found an identifier.
    UnexpectedToken,

    /// Unexpected end of input while parsing was incomplete.
    ///
    /// Example: reached the end of the script inside an unclosed `{`.
    UnexpectedEof,

    /// Tokens are present but violate the grammar.
    ///
    /// Example: `1 = x;` (a literal is not an assignment target).
    InvalidSyntax,

    /// `options`, `images` or `init` block out of order or after statements.
    MisplacedBlock,
}

impl ParseError {
    /// Create an "expected token" error.
    pub fn expected_token(expected: Token, found: Option<&Token>, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("expected '{}', found '{}'", expected, token),
            None => format!("expected '{}', found end of input", expected),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(found: Option<&Token>, context: &str, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("unexpected '{}' {}", token, context),
            None => format!("unexpected end of input {}", context),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            span,
            message: message.into(),
        }
    }

    /// Create a "misplaced block" error.
    pub fn misplaced_block(block: &str, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::MisplacedBlock,
            span,
            message: format!(
                "'{}' block is out of place: header blocks must come first, in the order options, images, init",
                block
            ),
        }
    }

    /// Convert a lexer failure into a parse error located in `file`.
    pub fn from_lex(error: &LexError, file: &SourceFile) -> Self {
        Self {
            kind: ParseErrorKind::Lexical(error.kind),
            span: file.span_of(&error.span),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> Self {
        CompileError::new(ErrorKind::Syntax, error.span, error.message)
    }
}
