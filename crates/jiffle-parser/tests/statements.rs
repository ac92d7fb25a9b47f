//! Statement-level parsing and pretty-printer round trips.

use jiffle_ast::foundation::SourceFile;
use jiffle_ast::{LoopSource, Program, Stmt, StmtKind};
use jiffle_parser::parse_program;

fn parse(source: &str) -> Program {
    parse_program(&SourceFile::new("test", source)).expect("Parse failed")
}

fn only_stmt(program: &Program) -> &Stmt {
    assert_eq!(program.body.len(), 1, "expected one statement");
    &program.body[0]
}

#[test]
fn test_foreach_range() {
    let program = parse("foreach (dy in -1:1) { n += src[0, dy]; }");
    match &only_stmt(&program).kind {
        StmtKind::Foreach { var, source, body } => {
            assert_eq!(var, "dy");
            assert!(matches!(source, LoopSource::Range { .. }));
            assert!(matches!(&body.kind, StmtKind::Block(stmts) if stmts.len() == 1));
        }
        other => panic!("expected foreach, got {:?}", other),
    }
}

#[test]
fn test_foreach_list() {
    let program = parse("foreach (v in [1, 2, 3]) total += v;");
    match &only_stmt(&program).kind {
        StmtKind::Foreach { source, .. } => {
            assert!(matches!(source, LoopSource::List(_)));
        }
        other => panic!("expected foreach, got {:?}", other),
    }
}

#[test]
fn test_while_and_until() {
    let program = parse("while (i < 10) i++; until (i == 0) { i--; breakif(i < 3); }");
    assert!(matches!(program.body[0].kind, StmtKind::While { .. }));
    match &program.body[1].kind {
        StmtKind::Until { body, .. } => match &body.kind {
            StmtKind::Block(stmts) => assert!(matches!(stmts[1].kind, StmtKind::BreakIf(_))),
            other => panic!("expected block, got {:?}", other),
        },
        other => panic!("expected until, got {:?}", other),
    }
}

#[test]
fn test_if_else_binds_to_nearest_if() {
    let program = parse("if (a) if (b) x = 1; else x = 2;");
    match &only_stmt(&program).kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert!(else_branch.is_none());
            assert!(matches!(
                then_branch.kind,
                StmtKind::If {
                    else_branch: Some(_),
                    ..
                }
            ));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_break_and_empty() {
    let program = parse("while (1) { break; } ;");
    assert_eq!(program.body.len(), 2);
    assert!(matches!(program.body[1].kind, StmtKind::Empty));
}

#[test]
fn test_comments_do_not_affect_parse() {
    let with = parse("/* header */ dest = 1; // trailing\n dest = 2;");
    let without = parse("dest = 1; dest = 2;");
    assert_eq!(with.body.len(), without.body.len());
}

#[test]
fn test_statement_spans() {
    let program = parse("a = 1;\n  b = a + 2;");
    let span = program.body[1].span;
    assert_eq!((span.line, span.column), (2, 3));
}

#[test]
fn test_printed_program_reparses_to_same_text() {
    let source = "options { outside = -1; }
        images { src = read; dest = write; }
        init { n = 0; }
        foreach (dy in -1:1) {
            foreach (dx in -1:1) n += src[dx, $dy];
        }
        if (n > 4) dest = con(n > 6, 1, 2); else dest = -2^2;
        vals = [1, 2];
        vals << 3;
        n > 0 ? dest = 1 : dest = 0;";

    let first = parse(source).to_string();
    let second = parse(&first).to_string();
    assert_eq!(first, second);
}
