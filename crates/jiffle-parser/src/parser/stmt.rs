//! Statement parsers (keyword-dispatched).

use super::expr::parse_expr;
use super::{ParseError, TokenStream};
use jiffle_ast::{LoopSource, Stmt, StmtKind};
use jiffle_lexer::Token;

/// Parse one statement.
pub(super) fn parse_statement(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();

    let kind = match stream.peek() {
        Some(Token::LBrace) => StmtKind::Block(parse_block(stream)?),
        Some(Token::Foreach) => parse_foreach(stream)?,
        Some(Token::While) => {
            stream.advance();
            let condition = parse_condition(stream)?;
            let body = Box::new(parse_statement(stream)?);
            StmtKind::While { condition, body }
        }
        Some(Token::Until) => {
            stream.advance();
            let condition = parse_condition(stream)?;
            let body = Box::new(parse_statement(stream)?);
            StmtKind::Until { condition, body }
        }
        Some(Token::If) => {
            stream.advance();
            let condition = parse_condition(stream)?;
            let then_branch = Box::new(parse_statement(stream)?);
            let else_branch = if stream.eat(&Token::Else) {
                Some(Box::new(parse_statement(stream)?))
            } else {
                None
            };
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            }
        }
        Some(Token::Break) => {
            stream.advance();
            stream.expect(Token::Semicolon)?;
            StmtKind::Break
        }
        Some(Token::BreakIf) => {
            stream.advance();
            let condition = parse_condition(stream)?;
            stream.expect(Token::Semicolon)?;
            StmtKind::BreakIf(condition)
        }
        Some(Token::Semicolon) => {
            stream.advance();
            StmtKind::Empty
        }
        Some(token @ (Token::Options | Token::Images | Token::Init)) => {
            return Err(ParseError::misplaced_block(
                &token.to_string(),
                stream.current_span(),
            ));
        }
        _ => {
            let expr = parse_expr(stream)?;
            stream.expect(Token::Semicolon)?;
            StmtKind::Expr(expr)
        }
    };

    let span = stream.span_from(start);
    Ok(Stmt::new(stream.node_id(), kind, span))
}

/// Parse `{ statement* }`.
fn parse_block(stream: &mut TokenStream) -> Result<Vec<Stmt>, ParseError> {
    stream.expect(Token::LBrace)?;

    let mut stmts = Vec::new();
    while !stream.check(&Token::RBrace) {
        if stream.at_end() {
            return Err(ParseError::unexpected_token(
                None,
                "inside block, missing '}'",
                stream.current_span(),
            ));
        }
        stmts.push(parse_statement(stream)?);
    }

    stream.expect(Token::RBrace)?;
    Ok(stmts)
}

/// Parse a parenthesized condition: `( expr )`.
fn parse_condition(stream: &mut TokenStream) -> Result<jiffle_ast::Expr, ParseError> {
    stream.expect(Token::LParen)?;
    let condition = parse_expr(stream)?;
    stream.expect(Token::RParen)?;
    Ok(condition)
}

/// Parse `foreach (var in start:end) stmt` or `foreach (var in list) stmt`.
fn parse_foreach(stream: &mut TokenStream) -> Result<StmtKind, ParseError> {
    stream.expect(Token::Foreach)?;
    stream.expect(Token::LParen)?;
    let (var, _) = stream.expect_ident("as foreach loop variable")?;
    stream.expect(Token::In)?;

    let first = parse_expr(stream)?;
    let source = if stream.eat(&Token::Colon) {
        let end = parse_expr(stream)?;
        LoopSource::Range { start: first, end }
    } else {
        LoopSource::List(first)
    };
    stream.expect(Token::RParen)?;

    let body = Box::new(parse_statement(stream)?);
    Ok(StmtKind::Foreach { var, source, body })
}
