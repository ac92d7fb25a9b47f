//! Header block parsers: `options`, `images` and `init`.

use super::expr::parse_expr;
use super::{ParseError, TokenStream};
use jiffle_ast::{ImageDecl, ImageRole, InitDecl, OptionEntry};
use jiffle_lexer::Token;

/// Parse `options { name = value; ... }`.
pub(super) fn parse_options(stream: &mut TokenStream) -> Result<Vec<OptionEntry>, ParseError> {
    stream.expect(Token::Options)?;
    parse_entries(stream, |stream, start, name| {
        let value = parse_expr(stream)?;
        stream.expect(Token::Semicolon)?;
        Ok(OptionEntry {
            name,
            value,
            span: stream.span_from(start),
        })
    })
}

/// Parse `images { name = read|write; ... }`.
pub(super) fn parse_images(stream: &mut TokenStream) -> Result<Vec<ImageDecl>, ParseError> {
    stream.expect(Token::Images)?;
    parse_entries(stream, |stream, start, name| {
        let (role_word, role_span) = stream.expect_ident("as image role")?;
        let role = match role_word.as_str() {
            "read" => ImageRole::Source,
            "write" => ImageRole::Destination,
            other => {
                return Err(ParseError::invalid_syntax(
                    format!("image role must be 'read' or 'write', found '{}'", other),
                    role_span,
                ))
            }
        };
        stream.expect(Token::Semicolon)?;
        Ok(ImageDecl {
            name,
            role,
            span: stream.span_from(start),
        })
    })
}

/// Parse `init { name = expr; ... }`.
pub(super) fn parse_init(stream: &mut TokenStream) -> Result<Vec<InitDecl>, ParseError> {
    stream.expect(Token::Init)?;
    parse_entries(stream, |stream, start, name| {
        let value = parse_expr(stream)?;
        stream.expect(Token::Semicolon)?;
        Ok(InitDecl {
            id: stream.node_id(),
            name,
            value,
            span: stream.span_from(start),
        })
    })
}

/// Shared `{ (IDENT '=' ...)* }` loop; `entry` parses what follows the `=`.
fn parse_entries<'src, T, F>(
    stream: &mut TokenStream<'src>,
    mut entry: F,
) -> Result<Vec<T>, ParseError>
where
    F: FnMut(&mut TokenStream<'src>, usize, String) -> Result<T, ParseError>,
{
    stream.expect(Token::LBrace)?;

    let mut entries = Vec::new();
    while !stream.eat(&Token::RBrace) {
        let start = stream.current_pos();
        let (name, _) = stream.expect_ident("at start of header block entry")?;
        stream.expect(Token::Eq)?;
        entries.push(entry(stream, start, name)?);
    }

    Ok(entries)
}
