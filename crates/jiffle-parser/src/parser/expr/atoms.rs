//! Atomic expressions - literals, identifiers, calls, image references, lists.

use super::super::{ParseError, TokenStream};
use jiffle_ast::{Coord, Expr, ExprKind, PixelRef};
use jiffle_lexer::Token;

/// Parse atomic expressions.
pub(super) fn parse_atom(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();

    let kind = match stream.peek() {
        Some(Token::Number(value)) => {
            stream.advance();
            ExprKind::Number(*value)
        }
        Some(Token::True) => {
            stream.advance();
            ExprKind::Bool(true)
        }
        Some(Token::False) => {
            stream.advance();
            ExprKind::Bool(false)
        }
        Some(Token::Null) => {
            stream.advance();
            ExprKind::Null
        }
        Some(Token::LParen) => return parse_parenthesized(stream),
        Some(Token::LBracket) => ExprKind::List(parse_list(stream)?),
        Some(Token::Ident(_)) => return parse_identifier(stream),
        other => {
            return Err(ParseError::unexpected_token(
                other,
                "in expression",
                stream.current_span(),
            ))
        }
    };

    let span = stream.span_from(start);
    Ok(Expr::new(stream.node_id(), kind, span))
}

/// Parse `( expr )`; parentheses leave no node behind.
fn parse_parenthesized(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    stream.expect(Token::LParen)?;
    let expr = super::parse_expr(stream)?;
    stream.expect(Token::RParen)?;
    Ok(expr)
}

/// Parse list literal: `[expr, expr, ...]`
fn parse_list(stream: &mut TokenStream) -> Result<Vec<Expr>, ParseError> {
    stream.expect(Token::LBracket)?;

    let mut elements = Vec::new();
    while !stream.check(&Token::RBracket) {
        elements.push(super::parse_expr(stream)?);

        if !stream.check(&Token::RBracket) {
            stream.expect(Token::Comma)?;
        }
    }

    stream.expect(Token::RBracket)?;
    Ok(elements)
}

/// Parse an identifier, function call or image reference.
fn parse_identifier(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let (name, _) = stream.expect_ident("in expression")?;

    let kind = match stream.peek() {
        Some(Token::LParen) => ExprKind::Call {
            name,
            args: parse_call_args(stream)?,
        },
        Some(Token::LBracket) => parse_image_ref(stream, name)?,
        _ => ExprKind::Ident(name),
    };

    let span = stream.span_from(start);
    Ok(Expr::new(stream.node_id(), kind, span))
}

/// Parse function call arguments.
fn parse_call_args(stream: &mut TokenStream) -> Result<Vec<Expr>, ParseError> {
    stream.expect(Token::LParen)?;

    let mut args = Vec::new();
    while !stream.check(&Token::RParen) {
        args.push(super::parse_expr(stream)?);

        if !stream.check(&Token::RParen) {
            stream.expect(Token::Comma)?;
        }
    }

    stream.expect(Token::RParen)?;
    Ok(args)
}

/// Parse the selectors following an image name.
///
/// Forms: `img[b]`, `img[dx, dy]`, `img[b][dx, dy]`, with `$` marking an
/// absolute coordinate on either axis.
fn parse_image_ref(stream: &mut TokenStream, name: String) -> Result<ExprKind, ParseError> {
    stream.expect(Token::LBracket)?;

    let first = parse_coord(stream)?;
    if stream.eat(&Token::Comma) {
        let y = parse_coord(stream)?;
        stream.expect(Token::RBracket)?;
        return Ok(ExprKind::Image {
            name,
            band: None,
            pixel: Some(PixelRef { x: first, y }),
        });
    }
    stream.expect(Token::RBracket)?;

    if first.absolute {
        return Err(ParseError::invalid_syntax(
            "'$' is only allowed in pixel position selectors",
            first.value.span,
        ));
    }
    let band = first.value;

    let pixel = if stream.eat(&Token::LBracket) {
        let x = parse_coord(stream)?;
        stream.expect(Token::Comma)?;
        let y = parse_coord(stream)?;
        stream.expect(Token::RBracket)?;
        Some(PixelRef { x, y })
    } else {
        None
    };

    Ok(ExprKind::Image {
        name,
        band: Some(band),
        pixel,
    })
}

/// Parse one axis of a pixel selector: `$`? expr
fn parse_coord(stream: &mut TokenStream) -> Result<Coord, ParseError> {
    let absolute = stream.eat(&Token::Dollar);
    let value = super::parse_expr(stream)?;
    Ok(Coord {
        absolute,
        value: Box::new(value),
    })
}
