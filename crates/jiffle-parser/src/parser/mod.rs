//! Hand-written recursive descent parser for Jiffle scripts.
//!
//! ## Architecture
//!
//! - `stream`: TokenStream wrapper with lookahead and node id allocation
//! - `error`: ParseError
//! - `expr`: Expression parser using Pratt parsing
//! - `stmt`: Statement parsers (keyword-dispatched)
//! - `blocks`: `options`, `images` and `init` header blocks
//! - `options`: token-level options reader
//!
//! A parse either yields a whole [`Program`] or fails with the first
//! [`ParseError`]; there is no recovery and no partial tree.

mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

mod blocks;
mod expr;
mod options;
mod stmt;

pub use options::read_options;

use jiffle_ast::foundation::SourceFile;
use jiffle_ast::{Expr, Program};
use jiffle_lexer::{lex, Token};

/// Lex and parse a whole script.
///
/// Header blocks must come first and in the order `options`, `images`,
/// `init`; each may be omitted.
pub fn parse_program(file: &SourceFile) -> Result<Program, ParseError> {
    let lexed = lex(&file.source).map_err(|e| ParseError::from_lex(&e, file))?;
    let mut stream = TokenStream::new(&lexed.tokens, file);
    parse_program_tokens(&mut stream)
}

/// Lex and parse a single expression spanning the whole input.
pub fn parse_expression(file: &SourceFile) -> Result<Expr, ParseError> {
    let lexed = lex(&file.source).map_err(|e| ParseError::from_lex(&e, file))?;
    let mut stream = TokenStream::new(&lexed.tokens, file);
    let expr = expr::parse_expr(&mut stream)?;
    if !stream.at_end() {
        return Err(ParseError::unexpected_token(
            stream.peek(),
            "after expression",
            stream.current_span(),
        ));
    }
    Ok(expr)
}

fn parse_program_tokens(stream: &mut TokenStream) -> Result<Program, ParseError> {
    let mut program = Program::default();

    if stream.check(&Token::Options) {
        program.options = blocks::parse_options(stream)?;
    }
    if stream.check(&Token::Images) {
        program.images = blocks::parse_images(stream)?;
    }
    if stream.check(&Token::Init) {
        program.init = blocks::parse_init(stream)?;
    }

    while !stream.at_end() {
        program.body.push(stmt::parse_statement(stream)?);
    }

    Ok(program)
}
