//! Lightweight options reader.
//!
//! Extracts the `key = value;` pairs of a leading `options { }` block straight
//! from the token stream, without building a tree and without judging whether
//! keys or values make sense. Later passes need the `outside` value before
//! anything else runs, so this scan works even on scripts whose body would
//! not survive full analysis.

use super::ParseError;
use indexmap::IndexMap;
use jiffle_ast::foundation::SourceFile;
use jiffle_lexer::{lex, Token};

/// Read the options block of a script into an order-preserving name → value-text map.
///
/// Scripts without an options block yield an empty map. Values are the
/// verbatim source text between `=` and `;`. A repeated key keeps its last value.
pub fn read_options(file: &SourceFile) -> Result<IndexMap<String, String>, ParseError> {
    let lexed = lex(&file.source).map_err(|e| ParseError::from_lex(&e, file))?;
    let tokens = &lexed.tokens;
    let mut options = IndexMap::new();

    if !matches!(tokens.first(), Some((Token::Options, _))) {
        return Ok(options);
    }

    let span_at = |idx: usize| match tokens.get(idx) {
        Some((_, range)) => file.span_of(range),
        None => {
            let end = file.source.len();
            file.span(end, end)
        }
    };
    let found = |idx: usize| tokens.get(idx).map(|(token, _)| token);

    if !matches!(found(1), Some(Token::LBrace)) {
        return Err(ParseError::expected_token(Token::LBrace, found(1), span_at(1)));
    }

    let mut idx = 2;
    loop {
        let name = match found(idx) {
            Some(Token::RBrace) => break,
            Some(Token::Ident(name)) => name.to_string(),
            other => {
                return Err(ParseError::unexpected_token(
                    other,
                    "in options block",
                    span_at(idx),
                ))
            }
        };
        if !matches!(found(idx + 1), Some(Token::Eq)) {
            return Err(ParseError::expected_token(
                Token::Eq,
                found(idx + 1),
                span_at(idx + 1),
            ));
        }

        let value_start = idx + 2;
        let mut end = value_start;
        while !matches!(found(end), Some(Token::Semicolon | Token::RBrace) | None) {
            end += 1;
        }
        if !matches!(found(end), Some(Token::Semicolon)) {
            return Err(ParseError::expected_token(
                Token::Semicolon,
                found(end),
                span_at(end),
            ));
        }
        if end == value_start {
            return Err(ParseError::invalid_syntax(
                format!("option '{}' has no value", name),
                span_at(end),
            ));
        }

        let text_start = tokens[value_start].1.start;
        let text_end = tokens[end - 1].1.end;
        options.insert(name, file.source[text_start..text_end].to_string());
        idx = end + 1;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(source: &str) -> Result<IndexMap<String, String>, ParseError> {
        read_options(&SourceFile::new("t", source))
    }

    #[test]
    fn test_reads_pairs_in_order() {
        let options = read("options { outside = -1.5; zeta = M_PI; alpha = 2; } dest = 1;").unwrap();
        let pairs: Vec<_> = options.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("outside", "-1.5"), ("zeta", "M_PI"), ("alpha", "2")]);
    }

    #[test]
    fn test_no_options_block() {
        assert!(read("dest = 1;").unwrap().is_empty());
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let options = read("options { frobnicate = 7; }").unwrap();
        assert_eq!(options.get("frobnicate").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_comments_inside_block_are_ignored() {
        let options = read("options { /* fallback */ outside = 0; // done\n }").unwrap();
        assert_eq!(options.get("outside").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_body_errors_do_not_matter() {
        let options = read("options { outside = 0; } dest = = ;").unwrap();
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_missing_semicolon() {
        assert!(read("options { outside = 0 }").is_err());
    }

    #[test]
    fn test_value_scan_stops_at_block_end() {
        let err = read("options { outside = 0 } dest = 2;").unwrap_err();
        assert!(err.message.contains("expected ';'"));
    }

    #[test]
    fn test_missing_value() {
        let err = read("options { outside = ; }").unwrap_err();
        assert!(err.message.contains("no value"));
    }
}
