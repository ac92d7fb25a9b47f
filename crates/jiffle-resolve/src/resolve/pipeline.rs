//! Semantic pipeline for Jiffle scripts.
//!
//! This module orchestrates the resolution passes that take a parsed
//! [`Program`] to an [`IrProgram`].
//!
//! All analysis passes (roles, options, classification, assignment
//! checks) run before the pipeline decides whether to stop, so one compile
//! reports every problem it can find. Lowering runs only when none of them
//! produced an error.

use crate::resolve::assignments::check_assignments;
use crate::resolve::classify::classify;
use crate::resolve::ir::IrProgram;
use crate::resolve::options::validate_options;
use crate::resolve::roles::{merge_roles, RoleMap};
use crate::resolve::transform::transform;
use jiffle_ast::error::has_errors;
use jiffle_ast::{CompileError, Program, Severity};
use tracing::{debug, instrument, warn};

/// Output of a successful analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ir: IrProgram,
    /// Caller roles merged with the script's `images` block
    pub roles: RoleMap,
    /// Non-fatal diagnostics (unused images and the like)
    pub warnings: Vec<CompileError>,
}

/// Analyse and lower a parsed program.
///
/// `caller_roles` are the image roles supplied by the host; the script's
/// own `images` block is merged into them.
///
/// # Errors
///
/// Returns every diagnostic collected (warnings included) when any pass
/// reports an error.
#[instrument(skip_all, fields(statements = program.body.len()))]
pub fn analyze(program: &Program, caller_roles: &RoleMap) -> Result<Analysis, Vec<CompileError>> {
    let mut diagnostics = Vec::new();

    let (roles, errors) = merge_roles(caller_roles, &program.images);
    debug!(pass = "roles", images = roles.len(), diagnostics = errors.len());
    diagnostics.extend(errors);

    let (options, errors) = validate_options(&program.options);
    debug!(pass = "options", outside = ?options.outside, diagnostics = errors.len());
    diagnostics.extend(errors);

    let (classification, errors) = classify(program, &roles);
    debug!(
        pass = "classify",
        vars = classification.vars.len(),
        diagnostics = errors.len()
    );
    diagnostics.extend(errors);

    let errors = check_assignments(program, &classification);
    debug!(pass = "assignments", diagnostics = errors.len());
    diagnostics.extend(errors);

    if has_errors(&diagnostics) {
        debug!(
            errors = diagnostics.iter().filter(|d| d.is_error()).count(),
            "analysis failed"
        );
        return Err(diagnostics);
    }

    let (ir, errors) = transform(program, &classification, options);
    debug!(
        pass = "transform",
        init = ir.init.len(),
        body = ir.body.len(),
        diagnostics = errors.len()
    );
    if !errors.is_empty() {
        diagnostics.extend(errors);
        return Err(diagnostics);
    }

    for warning in diagnostics.iter().filter(|d| d.severity == Severity::Warning) {
        warn!(kind = warning.kind.name(), "{}", warning.message);
    }

    Ok(Analysis {
        ir,
        roles,
        warnings: diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiffle_ast::{ErrorKind, ImageRole, SourceFile};
    use jiffle_parser::parse_program;

    fn run(source: &str, roles: &[(&str, ImageRole)]) -> Result<Analysis, Vec<CompileError>> {
        let file = SourceFile::new("test", source);
        let program = parse_program(&file).unwrap();
        let roles: RoleMap = roles
            .iter()
            .map(|(name, role)| (name.to_string(), *role))
            .collect();
        analyze(&program, &roles)
    }

    #[test]
    fn test_clean_script() {
        let analysis = run(
            "dest = src * 2;",
            &[("src", ImageRole::Source), ("dest", ImageRole::Destination)],
        )
        .unwrap();
        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.ir.images.len(), 2);
    }

    #[test]
    fn test_errors_from_several_passes_are_reported_together() {
        let errors = run(
            "options { colour = 1; } src = 1; foreach (i in 1:2) i = 3;",
            &[("src", ImageRole::Source)],
        )
        .unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ErrorKind::UnknownOption));
        assert!(kinds.contains(&ErrorKind::AssignmentToSourceImage));
        assert!(kinds.contains(&ErrorKind::AssignmentToLoopVar));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let analysis = run(
            "images { other = read; } dest = 1;",
            &[("dest", ImageRole::Destination)],
        )
        .unwrap();
        assert_eq!(analysis.warnings.len(), 1);
        assert_eq!(analysis.warnings[0].kind, ErrorKind::UnusedImage);
        assert_eq!(analysis.roles.len(), 2);
    }

    #[test]
    fn test_script_declares_its_own_images() {
        let analysis = run("images { a = read; b = write; } b = a;", &[]).unwrap();
        assert_eq!(analysis.ir.image_id("b").map(|id| id.0), Some(1));
    }
}
