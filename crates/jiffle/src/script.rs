//! The script object.

use crate::error::{CompileReport, JiffleError};
use jiffle_ast::{CompileError, ImageRole, SourceFile};
use indexmap::IndexMap;
use jiffle_parser::{parse_program, read_options};
use jiffle_resolve::{analyze, RoleMap};
use jiffle_runtime::{compile_program, EvaluationModel, RuntimeConfig, RuntimeUnit, UnitProgram};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Output of a successful compile.
#[derive(Debug, Clone)]
struct Compiled {
    program: Arc<UnitProgram>,
    roles: RoleMap,
    warnings: Vec<CompileError>,
}

/// A Jiffle script: its text, image roles and, once compiled, the program
/// runtime units are created from.
///
/// Changing the script or the roles discards the compiled program.
#[derive(Debug, Clone)]
pub struct Jiffle {
    name: String,
    script: Option<String>,
    roles: RoleMap,
    config: RuntimeConfig,
    compiled: Option<Compiled>,
}

impl Default for Jiffle {
    fn default() -> Self {
        Self::new()
    }
}

impl Jiffle {
    pub fn new() -> Self {
        Self::named("jiffle")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: None,
            roles: RoleMap::new(),
            config: RuntimeConfig::default(),
            compiled: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn set_script(&mut self, script: impl Into<String>) {
        self.script = Some(script.into());
        self.compiled = None;
    }

    /// The script's `options` block as name → value text, read without
    /// compiling. Works on scripts whose body would not compile.
    pub fn options(&self) -> Result<IndexMap<String, String>, JiffleError> {
        let script = self.script.as_deref().ok_or(JiffleError::NoScript)?;
        let source = SourceFile::new(self.name.clone(), script);
        read_options(&source).map_err(|e| report(&source, vec![CompileError::from(e)]))
    }

    /// Replace the caller's image roles.
    pub fn set_image_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = (S, ImageRole)>,
        S: Into<String>,
    {
        self.roles = roles
            .into_iter()
            .map(|(name, role)| (name.into(), role))
            .collect();
        self.compiled = None;
    }

    /// Image roles: merged with the script's `images` block once compiled,
    /// the caller's roles before that.
    pub fn image_roles(&self) -> &RoleMap {
        match &self.compiled {
            Some(compiled) => &compiled.roles,
            None => &self.roles,
        }
    }

    /// Configuration given to runtime units created from now on.
    pub fn set_runtime_config(&mut self, config: RuntimeConfig) {
        self.config = config;
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Warnings from the last successful compile.
    pub fn warnings(&self) -> &[CompileError] {
        self.compiled
            .as_ref()
            .map_or(&[][..], |compiled| compiled.warnings.as_slice())
    }

    /// The compiled program, shared by every unit created from it.
    pub fn program(&self) -> Option<&Arc<UnitProgram>> {
        self.compiled.as_ref().map(|compiled| &compiled.program)
    }

    /// Run the full compile pipeline.
    ///
    /// # Errors
    ///
    /// [`JiffleError::NoScript`] without a script, otherwise
    /// [`JiffleError::Compile`] with every diagnostic collected.
    #[instrument(skip_all, fields(script = %self.name))]
    pub fn compile(&mut self) -> Result<(), JiffleError> {
        self.compiled = None;
        let script = self.script.as_deref().ok_or(JiffleError::NoScript)?;
        let source = SourceFile::new(self.name.clone(), script);

        let options =
            read_options(&source).map_err(|e| report(&source, vec![CompileError::from(e)]))?;
        debug!(options = ?options.keys().collect::<Vec<_>>(), "options read");

        let program = parse_program(&source)
            .map_err(|e| report(&source, vec![CompileError::from(e)]))?;
        debug!(statements = program.body.len(), "parsed");

        let analysis = analyze(&program, &self.roles).map_err(|d| report(&source, d))?;
        let unit_program = compile_program(&analysis.ir)
            .map_err(|e| report(&source, vec![e]))?;

        info!(
            images = analysis.roles.len(),
            warnings = analysis.warnings.len(),
            "script compiled"
        );
        self.compiled = Some(Compiled {
            program: Arc::new(unit_program),
            roles: analysis.roles,
            warnings: analysis.warnings,
        });
        Ok(())
    }

    /// Create an unbound runtime unit from the compiled program.
    pub fn runtime_unit(&self, model: EvaluationModel) -> Result<RuntimeUnit, JiffleError> {
        let compiled = self.compiled.as_ref().ok_or(JiffleError::NotCompiled)?;
        Ok(RuntimeUnit::new(
            self.name.clone(),
            Arc::clone(&compiled.program),
            model,
            self.config.clone(),
        ))
    }
}

fn report(source: &SourceFile, diagnostics: Vec<CompileError>) -> JiffleError {
    JiffleError::Compile(CompileReport::new(source.clone(), diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiffle_ast::ErrorKind;

    #[test]
    fn test_compile_requires_script() {
        let mut jiffle = Jiffle::new();
        assert!(matches!(jiffle.compile(), Err(JiffleError::NoScript)));
        assert!(matches!(
            jiffle.runtime_unit(EvaluationModel::Direct),
            Err(JiffleError::NotCompiled)
        ));
    }

    #[test]
    fn test_changes_discard_compiled_program() {
        let mut jiffle = Jiffle::new();
        jiffle.set_script("dest = 1;");
        jiffle.set_image_roles([("dest", ImageRole::Destination)]);
        jiffle.compile().unwrap();
        assert!(jiffle.is_compiled());

        jiffle.set_image_roles([("dest", ImageRole::Destination)]);
        assert!(!jiffle.is_compiled());
        jiffle.compile().unwrap();
        jiffle.set_script("dest = 2;");
        assert!(!jiffle.is_compiled());
    }

    #[test]
    fn test_options_are_read_without_compiling() {
        let mut jiffle = Jiffle::new();
        assert!(matches!(jiffle.options(), Err(JiffleError::NoScript)));

        jiffle.set_script("options { outside = -1; colour = red; } dest = undefined_var;");
        let options = jiffle.options().unwrap();
        assert_eq!(options.get("outside").map(String::as_str), Some("-1"));
        assert_eq!(options.get("colour").map(String::as_str), Some("red"));
        assert!(!jiffle.is_compiled());
    }

    #[test]
    fn test_malformed_options_block_fails_compile() {
        let mut jiffle = Jiffle::new();
        jiffle.set_script("options { outside 0; } dest = 1;");
        let err = jiffle.compile().unwrap_err();
        assert!(err.report().unwrap().has_kind(ErrorKind::Syntax));
    }

    #[test]
    fn test_syntax_error_is_a_compile_failure() {
        let mut jiffle = Jiffle::new();
        jiffle.set_script("dest = (1 + ;");
        let err = jiffle.compile().unwrap_err();
        let report = err.report().unwrap();
        assert!(report.has_kind(ErrorKind::Syntax));
        assert!(!jiffle.is_compiled());
    }

    #[test]
    fn test_script_images_block_merges_with_roles() {
        let mut jiffle = Jiffle::new();
        jiffle.set_script("images { out = write; } out = src;");
        jiffle.set_image_roles([("src", ImageRole::Source)]);
        jiffle.compile().unwrap();
        assert_eq!(jiffle.image_roles().len(), 2);
        assert_eq!(
            jiffle.image_roles().get("out"),
            Some(&ImageRole::Destination)
        );
    }

    #[test]
    fn test_units_share_one_program() {
        let mut jiffle = Jiffle::new();
        jiffle.set_script("1;");
        jiffle.compile().unwrap();
        let a = jiffle.runtime_unit(EvaluationModel::Direct).unwrap();
        let b = jiffle.runtime_unit(EvaluationModel::Indirect).unwrap();
        assert!(Arc::ptr_eq(a.program(), b.program()));
    }
}
