//! Assignment checking pass
//!
//! Validates where assignments may appear and what they may target, using
//! the names the classifier resolved.
//!
//! # Rules
//!
//! - Assignment, compound assignment, `++`/`--` and `<<` are statements.
//!   They may be a whole expression statement or a branch of a
//!   statement-level ternary; anywhere else they are
//!   [`ErrorKind::AssignmentAsValue`]
//! - A loop variable cannot be assigned inside its loop
//! - A `foreach` variable cannot reuse the name of an image, a constant, an
//!   `init` variable or an enclosing loop variable ([`ErrorKind::ScopeConflict`])
//! - `init` variables cannot be named like images or constants, cannot be
//!   declared twice, and their values cannot read images
//! - `<<` needs a list variable on its left; an image cannot receive a list
//!
//! # Pipeline Position
//!
//! ```text
//! Roles → Options → Classify → Assignments → Transform
//!                              ^^^^^^^^^^^
//!                             YOU ARE HERE
//! ```

use crate::resolve::classify::{Classification, Resolved, ValueKind};
use jiffle_ast::ast::walk::walk_expr;
use jiffle_ast::{CompileError, ErrorKind, Expr, ExprKind, LoopSource, Program, Span, Stmt, StmtKind};
use jiffle_functions::is_constant;
use std::collections::HashMap;

/// Check assignment placement and targets across the whole program.
pub fn check_assignments<'a>(
    program: &'a Program,
    classification: &'a Classification,
) -> Vec<CompileError> {
    let mut checker = AssignmentChecker {
        classification,
        diagnostics: Vec::new(),
        init_names: HashMap::new(),
        loop_vars: Vec::new(),
    };

    for decl in &program.init {
        checker.check_value(&decl.value);
        checker.check_init_reads(&decl.value);

        if checker.is_image(&decl.name) || is_constant(&decl.name) {
            checker.error(
                ErrorKind::ScopeConflict,
                decl.span,
                format!(
                    "init variable '{}' has the same name as {}",
                    decl.name,
                    if is_constant(&decl.name) { "a built-in constant" } else { "an image" }
                ),
            );
            continue;
        }
        if let Some(first) = checker.init_names.get(decl.name.as_str()) {
            let first = *first;
            checker.diagnostics.push(
                CompileError::new(
                    ErrorKind::DuplicateDeclaration,
                    decl.span,
                    format!("init variable '{}' is declared twice", decl.name),
                )
                .with_label(first, "first declared here".to_string()),
            );
            continue;
        }
        checker.init_names.insert(decl.name.as_str(), decl.span);
    }

    for stmt in &program.body {
        checker.stmt(stmt);
    }

    checker.diagnostics
}

struct AssignmentChecker<'a> {
    classification: &'a Classification,
    diagnostics: Vec<CompileError>,
    init_names: HashMap<&'a str, Span>,
    /// Names of the loops enclosing the current statement, outermost first
    loop_vars: Vec<&'a str>,
}

impl<'a> AssignmentChecker<'a> {
    fn error(&mut self, kind: ErrorKind, span: Span, message: String) {
        self.diagnostics.push(CompileError::new(kind, span, message));
    }

    fn is_image(&self, name: &str) -> bool {
        self.classification.images.iter().any(|image| image.name == name)
    }

    fn stmt(&mut self, stmt: &'a Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.statement_expr(expr),
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.stmt(s);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_value(condition);
                self.stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch);
                }
            }
            StmtKind::Foreach { var, source, body } => {
                match source {
                    LoopSource::Range { start, end } => {
                        self.check_value(start);
                        self.check_value(end);
                    }
                    LoopSource::List(list) => self.check_value(list),
                }
                self.check_loop_var_name(var, stmt.span);
                self.loop_vars.push(var);
                self.stmt(body);
                self.loop_vars.pop();
            }
            StmtKind::While { condition, body } | StmtKind::Until { condition, body } => {
                self.check_value(condition);
                self.stmt(body);
            }
            StmtKind::BreakIf(condition) => self.check_value(condition),
            StmtKind::Break | StmtKind::Empty => {}
        }
    }

    fn check_loop_var_name(&mut self, var: &str, span: Span) {
        let clash = if self.is_image(var) {
            Some("an image")
        } else if is_constant(var) {
            Some("a built-in constant")
        } else if self.init_names.contains_key(var) {
            Some("an init variable")
        } else if self.loop_vars.iter().any(|v| *v == var) {
            Some("an enclosing loop variable")
        } else {
            None
        };
        if let Some(what) = clash {
            self.error(
                ErrorKind::ScopeConflict,
                span,
                format!("loop variable '{}' has the same name as {}", var, what),
            );
        }
    }

    /// An expression in statement position, where effects are allowed.
    fn statement_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Assign { target, value, .. } => {
                self.check_target(target);
                self.check_value(value);
                if self.is_image_target(target)
                    && self.classification.kind_of(value) == ValueKind::List
                {
                    self.error(
                        ErrorKind::ListToImage,
                        expr.span,
                        "a list cannot be written to an image".to_string(),
                    );
                }
            }
            ExprKind::Step { target, .. } => self.check_target(target),
            ExprKind::Append { target, value } => {
                self.check_append_target(target);
                self.check_value(value);
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_value(condition);
                self.statement_expr(then_branch);
                self.statement_expr(else_branch);
            }
            _ => self.check_value(expr),
        }
    }

    /// An expression whose value is used: no effects anywhere inside.
    fn check_value(&mut self, expr: &Expr) {
        let mut found = Vec::new();
        walk_expr(expr, &mut |node| {
            if node.is_effect() {
                found.push(node.span);
            }
        });
        for span in found {
            self.error(
                ErrorKind::AssignmentAsValue,
                span,
                "assignment cannot be used as a value".to_string(),
            );
        }
    }

    fn check_target(&mut self, target: &Expr) {
        if let Some(Resolved::Var(id)) = self.classification.get(target.id) {
            if let Some(var) = self.classification.var(id).filter(|v| v.loop_var) {
                let message = format!("cannot assign to loop variable '{}'", var.name);
                self.error(ErrorKind::AssignmentToLoopVar, target.span, message);
            }
        }
    }

    fn check_append_target(&mut self, target: &Expr) {
        let ExprKind::Ident(name) = &target.kind else {
            self.error(
                ErrorKind::InvalidAppendTarget,
                target.span,
                "'<<' needs a list variable on its left".to_string(),
            );
            return;
        };
        match self.classification.get(target.id) {
            Some(Resolved::Var(id)) => match self.classification.var(id) {
                Some(var) if var.loop_var => self.error(
                    ErrorKind::AssignmentToLoopVar,
                    target.span,
                    format!("cannot append to loop variable '{}'", name),
                ),
                Some(var) if var.kind == ValueKind::Scalar => self.error(
                    ErrorKind::InvalidAppendTarget,
                    target.span,
                    format!("'{}' does not hold a list", name),
                ),
                _ => {}
            },
            // Undefined names were reported by the classifier.
            None => {}
            Some(_) => self.error(
                ErrorKind::InvalidAppendTarget,
                target.span,
                format!("'{}' is not a list variable", name),
            ),
        }
    }

    fn is_image_target(&self, target: &Expr) -> bool {
        matches!(self.classification.get(target.id), Some(Resolved::Image(_)))
    }

    fn check_init_reads(&mut self, value: &Expr) {
        let mut reads = Vec::new();
        walk_expr(value, &mut |node| {
            let is_image = match &node.kind {
                ExprKind::Image { .. } => true,
                ExprKind::Ident(_) => {
                    matches!(self.classification.get(node.id), Some(Resolved::Image(_)))
                }
                _ => false,
            };
            if is_image {
                if let Some(name) = node.as_name() {
                    reads.push((node.span, name.to_string()));
                }
            }
        });
        for (span, name) in reads {
            self.error(
                ErrorKind::ImageReadInInit,
                span,
                format!("init block cannot read image '{}'", name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::classify::classify;
    use crate::resolve::roles::RoleMap;
    use jiffle_ast::{ImageRole, SourceFile};
    use jiffle_parser::parse_program;

    fn check(source: &str) -> Vec<ErrorKind> {
        let file = SourceFile::new("test", source);
        let program = parse_program(&file).unwrap();
        let mut roles = RoleMap::new();
        roles.insert("src".to_string(), ImageRole::Source);
        roles.insert("dest".to_string(), ImageRole::Destination);
        let (classification, _) = classify(&program, &roles);
        check_assignments(&program, &classification)
            .iter()
            .map(|d| d.kind)
            .collect()
    }

    #[test]
    fn test_clean_script() {
        assert!(check("init { n = 0; } n += 1; dest = src + n;").is_empty());
    }

    #[test]
    fn test_assignment_to_loop_var() {
        assert_eq!(
            check("foreach (i in 1:3) { i = 2; } dest = src;"),
            vec![ErrorKind::AssignmentToLoopVar]
        );
        assert_eq!(
            check("foreach (i in 1:3) i++; dest = src;"),
            vec![ErrorKind::AssignmentToLoopVar]
        );
    }

    #[test]
    fn test_loop_var_scope_conflicts() {
        assert_eq!(
            check("foreach (src in 1:3) { } dest = 1;"),
            vec![ErrorKind::ScopeConflict]
        );
        assert_eq!(
            check("init { n = 1; } foreach (n in 1:3) { } dest = src;"),
            vec![ErrorKind::ScopeConflict]
        );
        assert_eq!(
            check("foreach (i in 1:2) foreach (i in 1:2) { } dest = src;"),
            vec![ErrorKind::ScopeConflict]
        );
        assert_eq!(
            check("foreach (M_PI in 1:2) { } dest = src;"),
            vec![ErrorKind::ScopeConflict]
        );
    }

    #[test]
    fn test_init_rules() {
        assert_eq!(check("init { src = 1; } dest = 1;"), vec![ErrorKind::ScopeConflict]);
        assert_eq!(
            check("init { n = 1; n = 2; } dest = src;"),
            vec![ErrorKind::DuplicateDeclaration]
        );
        assert_eq!(
            check("init { n = src; } dest = n;"),
            vec![ErrorKind::ImageReadInInit]
        );
        assert_eq!(
            check("init { n = src[1, 1]; } dest = n;"),
            vec![ErrorKind::ImageReadInInit]
        );
    }

    #[test]
    fn test_assignment_as_value() {
        assert_eq!(
            check("a = 0; b = (a = 1) + 2; dest = src;"),
            vec![ErrorKind::AssignmentAsValue]
        );
        assert_eq!(
            check("a = 0; if (a++) { } dest = src;"),
            vec![ErrorKind::AssignmentAsValue]
        );
        // Branches of a statement-level ternary may assign.
        assert!(check("a = 0; src > 1 ? a = 1 : a = 2; dest = a;").is_empty());
    }

    #[test]
    fn test_append_targets() {
        assert!(check("xs = []; xs << src; dest = sum(xs);").is_empty());
        assert_eq!(
            check("s = 1; s << 2; dest = src;"),
            vec![ErrorKind::InvalidAppendTarget]
        );
        assert_eq!(
            check("dest << src;"),
            vec![ErrorKind::InvalidAppendTarget]
        );
    }

    #[test]
    fn test_list_to_image() {
        assert_eq!(check("dest = [src, 1];"), vec![ErrorKind::ListToImage]);
        assert_eq!(
            check("xs = [src]; dest = xs;"),
            vec![ErrorKind::ListToImage]
        );
    }
}
