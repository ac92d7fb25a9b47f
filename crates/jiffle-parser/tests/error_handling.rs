//! Error handling tests for the Jiffle parser.
//!
//! This test suite verifies that the parser detects and reports:
//! - Lexical failures (malformed numbers, unterminated comments)
//! - Unclosed delimiters and unexpected end of input
//! - Misplaced header blocks
//! - Invalid assignment and increment targets

use jiffle_ast::foundation::SourceFile;
use jiffle_ast::Program;
use jiffle_lexer::LexErrorKind;
use jiffle_parser::{parse_program, ParseError, ParseErrorKind};

/// Helper to verify that parsing fails.
fn expect_error(source: &str) -> ParseError {
    match parse_program(&SourceFile::new("test", source)) {
        Ok(program) => panic!("Expected parse error, but parsing succeeded: {:?}", program),
        Err(error) => error,
    }
}

/// Helper for tests that expect success.
fn parse_ok(source: &str) -> Program {
    parse_program(&SourceFile::new("test", source)).expect("Parse should succeed")
}

// =============================================================================
// Lexical errors
// =============================================================================

#[test]
fn test_malformed_number_is_lexical() {
    let error = expect_error("dest = 1.2.3;");
    assert_eq!(
        error.kind,
        ParseErrorKind::Lexical(LexErrorKind::MalformedNumber)
    );
    assert_eq!((error.span.line, error.span.column), (1, 8));
}

#[test]
fn test_unterminated_comment_reports_position() {
    let error = expect_error("dest = 1;\n/* unfinished");
    assert_eq!(
        error.kind,
        ParseErrorKind::Lexical(LexErrorKind::UnterminatedComment)
    );
    assert_eq!(error.span.line, 2);
}

// =============================================================================
// Unclosed delimiters and EOF
// =============================================================================

#[test]
fn test_unclosed_block() {
    let error = expect_error("if (x > 0) { dest = 1;");
    assert_eq!(error.kind, ParseErrorKind::UnexpectedEof);
}

#[test]
fn test_unclosed_paren() {
    let error = expect_error("dest = (1 + 2;");
    assert_eq!(error.kind, ParseErrorKind::UnexpectedToken);
    assert!(error.message.contains("expected ')'"), "{}", error.message);
}

#[test]
fn test_missing_semicolon() {
    let error = expect_error("dest = 1\nother = 2;");
    assert!(error.message.contains("expected ';'"), "{}", error.message);
    assert_eq!(error.span.line, 2);
}

#[test]
fn test_dangling_operator() {
    let error = expect_error("dest = 1 + ;");
    assert!(error.message.contains("in expression"), "{}", error.message);
}

// =============================================================================
// Header blocks
// =============================================================================

#[test]
fn test_header_blocks_in_order() {
    let program = parse_ok(
        "options { outside = 0; }
         images { src = read; dest = write; }
         init { n = 0; }
         dest = src + n;",
    );
    assert_eq!(program.options.len(), 1);
    assert_eq!(program.images.len(), 2);
    assert_eq!(program.init.len(), 1);
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_options_after_statement_is_misplaced() {
    let error = expect_error("dest = 1; options { outside = 0; }");
    assert_eq!(error.kind, ParseErrorKind::MisplacedBlock);
}

#[test]
fn test_init_before_options_is_misplaced() {
    let error = expect_error("init { n = 0; } options { outside = 0; } dest = n;");
    assert_eq!(error.kind, ParseErrorKind::MisplacedBlock);
    assert!(error.message.contains("'options'"));
}

#[test]
fn test_duplicate_options_block_is_misplaced() {
    let error = expect_error("options { outside = 0; } options { outside = 1; }");
    assert_eq!(error.kind, ParseErrorKind::MisplacedBlock);
}

#[test]
fn test_init_inside_body_block_is_misplaced() {
    let error = expect_error("{ init { n = 0; } }");
    assert_eq!(error.kind, ParseErrorKind::MisplacedBlock);
}

#[test]
fn test_invalid_image_role() {
    let error = expect_error("images { src = readonly; }");
    assert_eq!(error.kind, ParseErrorKind::InvalidSyntax);
}

// =============================================================================
// Invalid targets
// =============================================================================

#[test]
fn test_literal_assignment_target() {
    let error = expect_error("1 = x;");
    assert_eq!(error.kind, ParseErrorKind::InvalidSyntax);
}

#[test]
fn test_neighbourhood_assignment_target() {
    let error = expect_error("dest[1, 1] = 0;");
    assert_eq!(error.kind, ParseErrorKind::InvalidSyntax);
    assert!(error.message.contains("neighbourhood"));
}

#[test]
fn test_band_assignment_target_is_allowed() {
    parse_ok("dest[1] = 0;");
}

#[test]
fn test_increment_needs_variable() {
    let error = expect_error("(a + b)++;");
    assert_eq!(error.kind, ParseErrorKind::InvalidSyntax);
}

#[test]
fn test_dollar_outside_position() {
    let error = expect_error("dest = src[$1];");
    assert_eq!(error.kind, ParseErrorKind::InvalidSyntax);
}
