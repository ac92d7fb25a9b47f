//! Variable classification pass
//!
//! Walks the script with a [`ScopeStack`] and decides what every name means:
//! a user variable, a loop variable, a source or destination image, a
//! built-in constant, or a function.
//!
//! # What This Pass Does
//!
//! 1. **Declares variables** - `init` entries become image-scope variables;
//!    the first plain `=` to an unknown name declares a pixel-scope variable
//!    in the current frame; `foreach` declares its loop variable in a fresh
//!    frame around the body
//! 2. **Resolves references** - every identifier, image reference, call and
//!    assignment target gets a [`Resolved`] entry keyed by its `NodeId`
//! 3. **Checks image roles** - source images are read-only, destination
//!    images write-only; neighbourhood selectors need a source image
//! 4. **Looks up functions** - by name and argument count
//! 5. **Warns about unused images**
//!
//! # What This Pass Does NOT Do
//!
//! - **No statement-shape checks** - where assignments may appear, loop
//!   variable writes and `init` restrictions belong to `resolve::assignments`
//! - **No mutation** - the AST is untouched; results live in [`Classification`]
//!
//! # Pipeline Position
//!
//! ```text
//! Roles → Options → Classify → Assignments → Transform
//!                   ^^^^^^^^
//!                 YOU ARE HERE
//! ```

use crate::resolve::roles::{declaration_span, RoleMap};
use crate::resolve::scope::{ScopeStack, ScopeType, Symbol, SymbolType};
use jiffle_ast::{
    AssignOp, CompileError, ErrorKind, Expr, ExprKind, ImageRole, InitDecl, LoopSource, NodeId,
    Program, Span, Stmt, StmtKind,
};
use jiffle_functions::{is_known, lookup, signatures, FunctionId, FunctionImpl, Position, CONSTANTS};
use std::collections::HashMap;

/// Index of a variable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an image in the merged role map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

impl ImageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Static shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    List,
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub name: String,
    pub scope: ScopeType,
    pub loop_var: bool,
    /// `List` once any plain assignment stores a list in it
    pub kind: ValueKind,
    /// Where it was declared
    pub span: Span,
}

/// An image from the merged role map.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub name: String,
    pub role: ImageRole,
    pub used: bool,
}

/// What a name-bearing node refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    Var(VarId),
    Image(ImageId),
    Constant(f64),
    Function(FunctionId),
    Position(Position),
}

/// Result of classification: a side table keyed by node id.
///
/// Entries exist for identifiers, image references, calls, assignment
/// targets, `init` declarations (keyed by the declaration id) and
/// `foreach` statements (keyed by the statement id, naming the loop
/// variable).
#[derive(Debug, Clone, Default)]
pub struct Classification {
    refs: HashMap<NodeId, Resolved>,
    pub vars: Vec<VarInfo>,
    pub images: Vec<ImageInfo>,
}

impl Classification {
    /// What the node with this id refers to.
    pub fn get(&self, id: NodeId) -> Option<Resolved> {
        self.refs.get(&id).copied()
    }

    pub fn var(&self, id: VarId) -> Option<&VarInfo> {
        self.vars.get(id.index())
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageInfo> {
        self.images.get(id.index())
    }

    /// Static shape of an expression's value.
    pub fn kind_of(&self, expr: &Expr) -> ValueKind {
        match &expr.kind {
            ExprKind::List(_) => ValueKind::List,
            ExprKind::Ident(_) => match self.get(expr.id) {
                Some(Resolved::Var(id)) => self.var(id).map_or(ValueKind::Scalar, |v| v.kind),
                _ => ValueKind::Scalar,
            },
            ExprKind::Ternary {
                then_branch,
                else_branch,
                ..
            } => {
                if self.kind_of(then_branch) == ValueKind::List
                    || self.kind_of(else_branch) == ValueKind::List
                {
                    ValueKind::List
                } else {
                    ValueKind::Scalar
                }
            }
            ExprKind::Assign { value, .. } => self.kind_of(value),
            _ => ValueKind::Scalar,
        }
    }
}

/// Classify every name in `program` against the merged role map.
pub fn classify(program: &Program, roles: &RoleMap) -> (Classification, Vec<CompileError>) {
    let mut classifier = Classifier::default();

    classifier.scopes.add_level();
    for (slot, (name, role)) in roles.iter().enumerate() {
        let symbol_type = match role {
            ImageRole::Source => SymbolType::SourceImage,
            ImageRole::Destination => SymbolType::DestImage,
        };
        classifier.out.images.push(ImageInfo {
            name: name.clone(),
            role: *role,
            used: false,
        });
        // Names are unique in the role map, so the frame accepts every image.
        let _ = classifier
            .scopes
            .add_symbol(Symbol::new(name.clone(), symbol_type, ScopeType::Image, slot));
    }
    for (slot, (name, _)) in CONSTANTS.iter().enumerate() {
        // An image shadowing a constant keeps the image.
        let _ = classifier
            .scopes
            .add_symbol(Symbol::new(*name, SymbolType::Constant, ScopeType::Image, slot));
    }

    classifier.scopes.add_level();
    classifier.in_init = true;
    for decl in &program.init {
        classifier.init_decl(decl);
    }
    classifier.in_init = false;

    classifier.scopes.add_level();
    for stmt in &program.body {
        classifier.stmt(stmt);
    }

    let Classifier {
        out,
        mut diagnostics,
        ..
    } = classifier;

    for image in out.images.iter().filter(|image| !image.used) {
        diagnostics.push(CompileError::warning(
            ErrorKind::UnusedImage,
            declaration_span(&program.images, &image.name),
            format!("image '{}' is never used", image.name),
        ));
    }

    (out, diagnostics)
}

#[derive(Default)]
struct Classifier {
    scopes: ScopeStack,
    out: Classification,
    diagnostics: Vec<CompileError>,
    loop_depth: usize,
    in_init: bool,
}

impl Classifier {
    fn error(&mut self, kind: ErrorKind, span: Span, message: String) {
        self.diagnostics.push(CompileError::new(kind, span, message));
    }

    fn lookup(&self, name: &str) -> Option<(SymbolType, usize)> {
        self.scopes.get(name).map(|s| (s.symbol_type, s.slot))
    }

    fn declare(
        &mut self,
        name: &str,
        symbol_type: SymbolType,
        scope: ScopeType,
        kind: ValueKind,
        span: Span,
    ) -> VarId {
        let id = VarId(self.out.vars.len() as u32);
        self.out.vars.push(VarInfo {
            name: name.to_string(),
            scope,
            loop_var: symbol_type == SymbolType::LoopVar,
            kind,
            span,
        });
        if let Err(err) = self
            .scopes
            .add_symbol(Symbol::new(name, symbol_type, scope, id.index()))
        {
            self.diagnostics.push(CompileError::internal(
                span,
                format!("cannot declare '{}': {:?}", name, err),
            ));
        }
        id
    }

    fn mark_used(&mut self, slot: usize) {
        if let Some(image) = self.out.images.get_mut(slot) {
            image.used = true;
        }
    }

    fn resolve_image(&mut self, node: NodeId, slot: usize) {
        self.mark_used(slot);
        self.out
            .refs
            .insert(node, Resolved::Image(ImageId(slot as u32)));
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.add_level();
        f(self);
        self.scopes.drop_level();
    }

    fn init_decl(&mut self, decl: &InitDecl) {
        self.expr(&decl.value);

        // Names taken by images or constants are reported by the assignment checker.
        if matches!(
            self.lookup(&decl.name),
            Some((SymbolType::SourceImage | SymbolType::DestImage | SymbolType::Constant, _))
        ) {
            return;
        }

        let id = match self.scopes.get_local(&decl.name) {
            Some(existing) => VarId(existing.slot as u32),
            None => {
                let kind = self.out.kind_of(&decl.value);
                self.declare(&decl.name, SymbolType::Scalar, ScopeType::Image, kind, decl.span)
            }
        };
        self.out.refs.insert(decl.id, Resolved::Var(id));
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::Block(stmts) => self.nested(|this| {
                for s in stmts {
                    this.stmt(s);
                }
            }),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                self.nested(|this| this.stmt(then_branch));
                if let Some(else_branch) = else_branch {
                    self.nested(|this| this.stmt(else_branch));
                }
            }
            StmtKind::Foreach { var, source, body } => {
                match source {
                    LoopSource::Range { start, end } => {
                        self.expr(start);
                        self.expr(end);
                    }
                    LoopSource::List(list) => self.expr(list),
                }
                self.scopes.add_level();
                let id = self.declare(
                    var,
                    SymbolType::LoopVar,
                    ScopeType::Pixel,
                    ValueKind::Scalar,
                    stmt.span,
                );
                self.out.refs.insert(stmt.id, Resolved::Var(id));
                self.loop_depth += 1;
                self.stmt(body);
                self.loop_depth -= 1;
                self.scopes.drop_level();
            }
            StmtKind::While { condition, body } | StmtKind::Until { condition, body } => {
                self.expr(condition);
                self.loop_depth += 1;
                self.nested(|this| this.stmt(body));
                self.loop_depth -= 1;
            }
            StmtKind::Break => self.check_in_loop("break", stmt.span),
            StmtKind::BreakIf(condition) => {
                self.expr(condition);
                self.check_in_loop("breakif", stmt.span);
            }
            StmtKind::Empty => {}
        }
    }

    fn check_in_loop(&mut self, keyword: &str, span: Span) {
        if self.loop_depth == 0 {
            self.error(
                ErrorKind::BreakOutsideLoop,
                span,
                format!("'{}' outside of a loop", keyword),
            );
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(_) | ExprKind::Bool(_) | ExprKind::Null => {}
            ExprKind::Ident(name) => self.read_name(name, expr),
            ExprKind::Call { name, args } => {
                for arg in args {
                    self.expr(arg);
                }
                self.call(name, args.len(), expr);
            }
            ExprKind::Image { name, band, pixel } => {
                if let Some(band) = band {
                    self.expr(band);
                }
                if let Some(pixel) = pixel {
                    self.expr(&pixel.x.value);
                    self.expr(&pixel.y.value);
                }
                self.read_image(name, pixel.is_some(), expr);
            }
            ExprKind::List(items) => {
                for item in items {
                    self.expr(item);
                }
            }
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                // Branches get their own frames, like `if`/`else`.
                self.expr(condition);
                self.nested(|this| this.expr(then_branch));
                self.nested(|this| this.expr(else_branch));
            }
            ExprKind::Assign { op, target, value } => {
                self.expr(value);
                self.assign_target(target, *op == AssignOp::Assign, Some(value));
            }
            ExprKind::Append { target, value } => {
                self.expr(value);
                self.append_target(target);
            }
            ExprKind::Step { target, .. } => self.assign_target(target, false, None),
        }
    }

    fn read_name(&mut self, name: &str, expr: &Expr) {
        let Some((symbol_type, slot)) = self.lookup(name) else {
            let mut err = CompileError::new(
                ErrorKind::UsedBeforeAssignment,
                expr.span,
                format!("variable '{}' used before assignment", name),
            );
            if is_known(name) {
                err = err.with_note(format!("'{}' is a function: call it as '{}()'", name, name));
            }
            self.diagnostics.push(err);
            return;
        };

        match symbol_type {
            SymbolType::Scalar | SymbolType::LoopVar => {
                self.out
                    .refs
                    .insert(expr.id, Resolved::Var(VarId(slot as u32)));
            }
            SymbolType::SourceImage => self.resolve_image(expr.id, slot),
            SymbolType::DestImage => {
                self.resolve_image(expr.id, slot);
                if !self.in_init {
                    self.error(
                        ErrorKind::ReadingFromDestImage,
                        expr.span,
                        format!("cannot read from destination image '{}'", name),
                    );
                }
            }
            SymbolType::Constant => {
                let value = CONSTANTS.get(slot).map_or(f64::NAN, |(_, v)| *v);
                self.out.refs.insert(expr.id, Resolved::Constant(value));
            }
        }
    }

    fn read_image(&mut self, name: &str, has_pixel: bool, expr: &Expr) {
        match self.lookup(name) {
            Some((SymbolType::SourceImage, slot)) => self.resolve_image(expr.id, slot),
            Some((SymbolType::DestImage, slot)) => {
                self.resolve_image(expr.id, slot);
                if self.in_init {
                    return;
                }
                if has_pixel {
                    self.error(
                        ErrorKind::NbrRefOnDestImage,
                        expr.span,
                        format!("neighbourhood reference on destination image '{}'", name),
                    );
                } else {
                    self.error(
                        ErrorKind::ReadingFromDestImage,
                        expr.span,
                        format!("cannot read from destination image '{}'", name),
                    );
                }
            }
            _ => self.error(
                ErrorKind::NbrRefOnNonImage,
                expr.span,
                format!("'{}' is not an image and cannot take band or pixel selectors", name),
            ),
        }
    }

    fn call(&mut self, name: &str, arg_count: usize, expr: &Expr) {
        match lookup(name, arg_count) {
            Some(id) => {
                let resolved = match id.descriptor().implementation {
                    FunctionImpl::Position(position) => Resolved::Position(position),
                    _ => Resolved::Function(id),
                };
                self.out.refs.insert(expr.id, resolved);
            }
            None => {
                let mut err = CompileError::new(
                    ErrorKind::FunctionUndefined,
                    expr.span,
                    format!(
                        "no function '{}' taking {} argument{}",
                        name,
                        arg_count,
                        if arg_count == 1 { "" } else { "s" }
                    ),
                );
                if is_known(name) {
                    err = err.with_note(format!("available: {}", signatures(name).join(", ")));
                }
                self.diagnostics.push(err);
            }
        }
    }

    /// Resolve the target of `=`, a compound assignment (`plain == false`)
    /// or `++`/`--`.
    fn assign_target(&mut self, target: &Expr, plain: bool, value: Option<&Expr>) {
        let name = match &target.kind {
            ExprKind::Ident(name) => name,
            ExprKind::Image { name, band, pixel } => {
                if let Some(band) = band {
                    self.expr(band);
                }
                if let Some(pixel) = pixel {
                    self.expr(&pixel.x.value);
                    self.expr(&pixel.y.value);
                }
                match self.lookup(name) {
                    Some((SymbolType::SourceImage | SymbolType::DestImage, _)) => {}
                    _ => {
                        self.error(
                            ErrorKind::NbrRefOnNonImage,
                            target.span,
                            format!("'{}' is not an image and cannot take a band selector", name),
                        );
                        return;
                    }
                }
                name
            }
            _ => {
                self.expr(target);
                return;
            }
        };

        match self.lookup(name) {
            None if plain => {
                let kind = value.map_or(ValueKind::Scalar, |v| self.out.kind_of(v));
                let id = self.declare(name, SymbolType::Scalar, ScopeType::Pixel, kind, target.span);
                self.out.refs.insert(target.id, Resolved::Var(id));
            }
            None => self.error(
                ErrorKind::UsedBeforeAssignment,
                target.span,
                format!("variable '{}' used before assignment", name),
            ),
            Some((SymbolType::Scalar, slot)) => {
                if plain && value.is_some_and(|v| self.out.kind_of(v) == ValueKind::List) {
                    if let Some(var) = self.out.vars.get_mut(slot) {
                        var.kind = ValueKind::List;
                    }
                }
                self.out
                    .refs
                    .insert(target.id, Resolved::Var(VarId(slot as u32)));
            }
            Some((SymbolType::LoopVar, slot)) => {
                self.out
                    .refs
                    .insert(target.id, Resolved::Var(VarId(slot as u32)));
            }
            Some((SymbolType::SourceImage, slot)) => {
                self.resolve_image(target.id, slot);
                self.error(
                    ErrorKind::AssignmentToSourceImage,
                    target.span,
                    format!("cannot assign to source image '{}'", name),
                );
            }
            Some((SymbolType::DestImage, slot)) => {
                self.resolve_image(target.id, slot);
                if !plain {
                    self.error(
                        ErrorKind::ReadingFromDestImage,
                        target.span,
                        format!("updating destination image '{}' reads from it", name),
                    );
                }
            }
            Some((SymbolType::Constant, _)) => self.error(
                ErrorKind::AssignmentToConstant,
                target.span,
                format!("cannot assign to constant '{}'", name),
            ),
        }
    }

    fn append_target(&mut self, target: &Expr) {
        let ExprKind::Ident(name) = &target.kind else {
            self.expr(target);
            return;
        };
        match self.lookup(name) {
            None => self.error(
                ErrorKind::UsedBeforeAssignment,
                target.span,
                format!("variable '{}' used before assignment", name),
            ),
            Some((SymbolType::Scalar | SymbolType::LoopVar, slot)) => {
                self.out
                    .refs
                    .insert(target.id, Resolved::Var(VarId(slot as u32)));
            }
            Some((SymbolType::SourceImage | SymbolType::DestImage, slot)) => {
                self.resolve_image(target.id, slot);
            }
            Some((SymbolType::Constant, slot)) => {
                let value = CONSTANTS.get(slot).map_or(f64::NAN, |(_, v)| *v);
                self.out.refs.insert(target.id, Resolved::Constant(value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiffle_ast::SourceFile;
    use jiffle_parser::parse_program;

    fn run(source: &str, roles: &[(&str, ImageRole)]) -> (Classification, Vec<CompileError>) {
        let file = SourceFile::new("test", source);
        let program = parse_program(&file).unwrap();
        let roles: RoleMap = roles
            .iter()
            .map(|(name, role)| (name.to_string(), *role))
            .collect();
        classify(&program, &roles)
    }

    fn kinds(diagnostics: &[CompileError]) -> Vec<ErrorKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_plain_assignment_declares_pixel_variable() {
        let (c, diags) = run("x = 1; y = x + 2;", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(c.vars.len(), 2);
        assert_eq!(c.vars[0].name, "x");
        assert_eq!(c.vars[0].scope, ScopeType::Pixel);
    }

    #[test]
    fn test_init_variables_are_image_scope() {
        let (c, diags) = run("init { n = 0; } n = n + 1;", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(c.vars.len(), 1);
        assert_eq!(c.vars[0].scope, ScopeType::Image);
    }

    #[test]
    fn test_use_before_assignment() {
        let (_, diags) = run("y = x + 1;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::UsedBeforeAssignment]);

        // Self-reference on first assignment is still a read of an undefined name.
        let (_, diags) = run("x = x + 1;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::UsedBeforeAssignment]);

        let (_, diags) = run("x += 1;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::UsedBeforeAssignment]);
    }

    #[test]
    fn test_block_variable_not_visible_after_block() {
        let (_, diags) = run("if (1) { t = 2; } u = t;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::UsedBeforeAssignment]);
    }

    #[test]
    fn test_ternary_branch_variable_not_visible_after_statement() {
        let (_, diags) = run("x() == 0 ? a = 5 : b = 1; c = a;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::UsedBeforeAssignment]);

        // Variables declared before the statement are updated in place.
        let (c, diags) = run("a = 0; x() == 0 ? a = 5 : a = 1; c = a;", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(c.vars.len(), 2);
    }

    #[test]
    fn test_image_roles() {
        let roles = [("src", ImageRole::Source), ("dest", ImageRole::Destination)];
        let (_, diags) = run("dest = src;", &roles);
        assert!(diags.is_empty(), "{:?}", diags);

        let (_, diags) = run("src = dest;", &roles);
        let k = kinds(&diags);
        assert!(k.contains(&ErrorKind::AssignmentToSourceImage));
        assert!(k.contains(&ErrorKind::ReadingFromDestImage));

        let (_, diags) = run("dest += 1; x = src;", &roles);
        assert_eq!(kinds(&diags), vec![ErrorKind::ReadingFromDestImage]);
    }

    #[test]
    fn test_neighbourhood_references() {
        let roles = [("src", ImageRole::Source), ("dest", ImageRole::Destination)];
        let (_, diags) = run("dest = src[-1, 1] + src[$0, $0] + src[1][0, 0];", &roles);
        assert!(diags.is_empty(), "{:?}", diags);

        let (_, diags) = run("x = src; dest = dest[1, 0];", &roles);
        assert_eq!(kinds(&diags), vec![ErrorKind::NbrRefOnDestImage]);

        let (_, diags) = run("x = 1; dest = x[1, 0] + src;", &roles);
        assert_eq!(kinds(&diags), vec![ErrorKind::NbrRefOnNonImage]);
    }

    #[test]
    fn test_unused_image_warning() {
        let roles = [("src", ImageRole::Source), ("dest", ImageRole::Destination)];
        let (_, diags) = run("dest = 1;", &roles);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ErrorKind::UnusedImage);
        assert!(!diags[0].is_error());
        assert!(diags[0].message.contains("src"));
    }

    #[test]
    fn test_functions_and_constants() {
        let (c, diags) = run("a = sin(M_PI) + x() + max(1, 2);", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(c.vars.len(), 1);

        let (_, diags) = run("a = nosuch(1);", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::FunctionUndefined]);

        let (_, diags) = run("a = sin(1, 2);", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::FunctionUndefined]);
        assert!(diags[0].notes[0].contains("sin(x)"));

        let (_, diags) = run("M_PI = 3;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::AssignmentToConstant]);
    }

    #[test]
    fn test_break_outside_loop() {
        let (_, diags) = run("break;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::BreakOutsideLoop]);

        let (_, diags) = run("n = 0; while (n < 3) { n++; breakif(n == 2); }", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_loop_variable_scoped_to_body() {
        let (c, diags) = run("s = 0; foreach (i in 1:3) s += i;", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
        assert!(c.vars.iter().any(|v| v.name == "i" && v.loop_var));

        let (_, diags) = run("foreach (i in 1:3) { } t = i;", &[]);
        assert_eq!(kinds(&diags), vec![ErrorKind::UsedBeforeAssignment]);
    }

    #[test]
    fn test_list_kind_tracking() {
        let (c, diags) = run("a = [1, 2]; b = a; c = 3;", &[]);
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(c.vars[0].kind, ValueKind::List);
        assert_eq!(c.vars[1].kind, ValueKind::List);
        assert_eq!(c.vars[2].kind, ValueKind::Scalar);
    }
}
