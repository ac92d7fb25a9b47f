//! Image role merging.
//!
//! Image roles come from two places: the caller (through
//! `Jiffle::set_image_roles`) and the script's own `images { }` block. Both
//! sources are merged into one [`RoleMap`] before any other pass runs. A
//! name may appear in both only if the roles agree.
//!
//! # Pipeline Position
//!
//! ```text
//! Parse → Roles → Options → Classify → Assignments → Transform
//!         ^^^^^
//!      YOU ARE HERE
//! ```

use indexmap::IndexMap;
use jiffle_ast::{CompileError, ErrorKind, ImageDecl, ImageRole, Span};

/// Image name → role, in declaration order (caller first, then script).
pub type RoleMap = IndexMap<String, ImageRole>;

/// Merge caller-supplied roles with the script's `images` block.
///
/// Returns the merged map and one [`ErrorKind::ImageRoleConflict`] per name
/// that is given two different roles. Conflicting names keep the caller's
/// role so later passes still see a consistent map.
pub fn merge_roles(caller: &RoleMap, declared: &[ImageDecl]) -> (RoleMap, Vec<CompileError>) {
    let mut roles = caller.clone();
    let mut errors = Vec::new();
    let mut seen: IndexMap<&str, &ImageDecl> = IndexMap::new();

    for decl in declared {
        if let Some(previous) = seen.get(decl.name.as_str()) {
            if previous.role != decl.role {
                errors.push(
                    CompileError::new(
                        ErrorKind::ImageRoleConflict,
                        decl.span,
                        format!(
                            "image '{}' is declared both '{}' and '{}'",
                            decl.name,
                            previous.role.keyword(),
                            decl.role.keyword()
                        ),
                    )
                    .with_label(previous.span, "first declared here".to_string()),
                );
            }
            continue;
        }
        seen.insert(&decl.name, decl);

        match roles.get(&decl.name) {
            Some(&role) if role != decl.role => errors.push(
                CompileError::new(
                    ErrorKind::ImageRoleConflict,
                    decl.span,
                    format!(
                        "image '{}' is declared '{}' but the caller binds it as '{}'",
                        decl.name,
                        decl.role.keyword(),
                        role.keyword()
                    ),
                ),
            ),
            Some(_) => {}
            None => {
                roles.insert(decl.name.clone(), decl.role);
            }
        }
    }

    (roles, errors)
}

/// Span of the `images` block entry for `name`, or a zero span for
/// caller-supplied images.
pub fn declaration_span(declared: &[ImageDecl], name: &str) -> Span {
    declared
        .iter()
        .find(|decl| decl.name == name)
        .map(|decl| decl.span)
        .unwrap_or_else(Span::zero)
}
