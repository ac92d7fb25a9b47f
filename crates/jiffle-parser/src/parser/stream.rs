//! Token stream wrapper for the hand-written parser.

use super::ParseError;
use jiffle_ast::foundation::{SourceFile, Span};
use jiffle_ast::NodeId;
use jiffle_lexer::Token;
use std::ops::Range;

/// Token stream with lookahead, position tracking and node id allocation.
///
/// Each token is paired with its byte range in the script so spans carry
/// accurate line and column information.
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Range<usize>)],
    pos: usize,
    file: &'src SourceFile,
    next_id: u32,
}

impl<'src> TokenStream<'src> {
    /// Create a new token stream over lexed tokens of `file`.
    pub fn new(tokens: &'src [(Token, Range<usize>)], file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            next_id: 0,
        }
    }

    /// Allocate the next node id.
    pub fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'src Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&'src Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the current one.
    pub fn advance(&mut self) -> Option<&'src Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the expected token kind.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Expect a specific token and advance if it matches.
    pub fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        if self.check(&expected) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(ParseError::expected_token(
                expected,
                self.peek(),
                self.current_span(),
            ))
        }
    }

    /// Expect an identifier and return its text.
    pub fn expect_ident(&mut self, context: &str) -> Result<(String, Span), ParseError> {
        let span = self.current_span();
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok((name.to_string(), span))
            }
            other => Err(ParseError::unexpected_token(other, context, span)),
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Get the current position in the token stream.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Create a span from a starting token position to the last consumed token.
    pub fn span_from(&self, start: usize) -> Span {
        let start_byte = match self.tokens.get(start) {
            Some((_, range)) => range.start,
            None => self.eof_offset(),
        };
        let end_byte = match self.pos.checked_sub(1).and_then(|last| self.tokens.get(last)) {
            Some((_, range)) if self.pos > start => range.end,
            _ => start_byte,
        };
        self.file.span(start_byte, end_byte)
    }

    /// Get a span for the current token, or a zero-length span at end of input.
    pub fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, range)) => self.file.span_of(range),
            None => {
                let end = self.eof_offset();
                self.file.span(end, end)
            }
        }
    }

    /// Script being parsed.
    pub fn file(&self) -> &'src SourceFile {
        self.file
    }

    fn eof_offset(&self) -> usize {
        self.tokens.last().map_or(0, |(_, range)| range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_covers_consumed_tokens() {
        let file = SourceFile::new("t", "a = b;");
        let lexed = jiffle_lexer::lex(&file.source).unwrap();
        let mut stream = TokenStream::new(&lexed.tokens, &file);

        stream.advance();
        stream.advance();
        stream.advance();
        let span = stream.span_from(0);
        assert_eq!(file.snippet(&span), "a = b");
    }

    #[test]
    fn test_current_span_at_eof() {
        let file = SourceFile::new("t", "x");
        let lexed = jiffle_lexer::lex(&file.source).unwrap();
        let mut stream = TokenStream::new(&lexed.tokens, &file);
        stream.advance();

        assert!(stream.at_end());
        let span = stream.current_span();
        assert_eq!((span.start, span.end), (1, 1));
    }

    #[test]
    fn test_node_ids_are_sequential() {
        let file = SourceFile::new("t", "");
        let mut stream = TokenStream::new(&[], &file);
        assert_eq!(stream.node_id(), NodeId(0));
        assert_eq!(stream.node_id(), NodeId(1));
    }
}
