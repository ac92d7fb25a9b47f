//! Runtime units.
//!
//! A [`RuntimeUnit`] is one compiled program plus everything needed to run
//! it: raster bindings, variable slots, a random generator and the
//! evaluation bounds. Units are created from a shared [`UnitProgram`], so
//! creating many units from one compile costs no recompilation.
//!
//! # Lifecycle
//!
//! ```text
//! Compiled ──bind──► Bound ──evaluate_all──► Running ──► Completed
//!                      ▲                                 Failed
//!                      └──────────── rebind ──────────── Cancelled
//! ```
//!
//! Rebinding between passes is allowed and never recompiles. Each pass
//! reruns `init`, so image-scope variables start fresh.
//!
//! # Evaluation Models
//!
//! - [`EvaluationModel::Direct`]: every pixel runs the body and writes
//!   straight to the bound destinations.
//! - [`EvaluationModel::Indirect`]: writes are captured and memoized per
//!   coordinate. `evaluate(x, y)` and `value_at` compute a pixel on demand;
//!   `evaluate_all` copies the memoized values into the destinations.

use crate::bytecode::UnitProgram;
use crate::cancel::CancelToken;
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::progress::{Progress, ProgressListener};
use crate::raster::{RasterSurface, Rect};
use crate::value::Value;
use crate::vm::{Frame, ImageEnv, Vm};
use jiffle_ast::ImageRole;
use jiffle_functions::PixelContext;
use jiffle_resolve::ir::ImageSlot;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// How a unit's pixels are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EvaluationModel {
    /// Bulk row-major scan
    #[default]
    Direct,
    /// On-demand, memoized per coordinate
    Indirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Created, nothing bound yet
    Compiled,
    /// At least one raster bound; ready to evaluate
    Bound,
    /// A pass is in progress
    Running,
    Completed,
    Failed,
    Cancelled,
}

enum Binding {
    Unbound,
    Source(Arc<dyn RasterSurface>),
    Destination(Box<dyn RasterSurface>),
}

/// A destination write held back by the indirect model.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CapturedWrite {
    image: usize,
    band: i64,
    value: f64,
}

/// Rasters bound to a unit, indexed like the program's images.
struct ImageTable {
    slots: Vec<ImageSlot>,
    bindings: Vec<Binding>,
    capture: Option<Vec<CapturedWrite>>,
}

impl ImageTable {
    fn new(slots: Vec<ImageSlot>) -> Self {
        let bindings = slots.iter().map(|_| Binding::Unbound).collect();
        Self {
            slots,
            bindings,
            capture: None,
        }
    }

    fn raster(&self, image: usize) -> Option<&dyn RasterSurface> {
        match self.bindings.get(image)? {
            Binding::Unbound => None,
            Binding::Source(raster) => Some(raster.as_ref()),
            Binding::Destination(raster) => Some(raster.as_ref()),
        }
    }

    fn band(&self, image: usize, raster: &dyn RasterSurface, band: i64) -> Result<usize> {
        if band >= 0 && (band as usize) < raster.bands() {
            Ok(band as usize)
        } else {
            Err(RuntimeError::InvalidBand {
                image: self.name(image).to_string(),
                band,
            })
        }
    }

    /// Write straight to the destination raster.
    fn store(&mut self, image: usize, x: i64, y: i64, band: i64, value: f64) -> Result<()> {
        let name = self.name(image).to_string();
        let raster = match self.bindings.get_mut(image) {
            Some(Binding::Destination(raster)) => raster,
            Some(Binding::Unbound) => return Err(RuntimeError::UnboundImage(name)),
            _ => return Err(RuntimeError::Internal(format!("write to non-destination '{}'", name))),
        };
        if band < 0 || band as usize >= raster.bands() {
            return Err(RuntimeError::InvalidBand { image: name, band });
        }
        if raster.set_sample(x, y, band as usize, value) {
            Ok(())
        } else {
            Err(RuntimeError::OutOfBounds { image: name, x, y })
        }
    }
}

impl ImageEnv for ImageTable {
    fn name(&self, image: usize) -> &str {
        self.slots.get(image).map_or("?", |slot| slot.name.as_str())
    }

    fn read(&self, image: usize, x: i64, y: i64, band: i64) -> Result<Option<f64>> {
        let raster = match self.bindings.get(image) {
            Some(Binding::Source(raster)) => raster.as_ref(),
            Some(Binding::Unbound) => {
                return Err(RuntimeError::UnboundImage(self.name(image).to_string()))
            }
            _ => {
                return Err(RuntimeError::Internal(format!(
                    "read from non-source '{}'",
                    self.name(image)
                )))
            }
        };
        let band = self.band(image, raster, band)?;
        Ok(raster.get_sample(x, y, band))
    }

    fn write(&mut self, image: usize, x: i64, y: i64, band: i64, value: f64) -> Result<()> {
        if self.capture.is_none() {
            return self.store(image, x, y, band, value);
        }
        match self.raster(image) {
            Some(raster) => {
                self.band(image, raster, band)?;
            }
            None if band < 0 => {
                return Err(RuntimeError::InvalidBand {
                    image: self.name(image).to_string(),
                    band,
                })
            }
            None => {}
        }
        if let Some(captured) = self.capture.as_mut() {
            captured.push(CapturedWrite { image, band, value });
        }
        Ok(())
    }
}

/// Outcome of one memoized pixel.
#[derive(Debug, Clone, Default)]
struct PixelResult {
    result: Option<f64>,
    writes: Vec<CapturedWrite>,
}

/// An evaluable instance of a compiled script.
pub struct RuntimeUnit {
    name: String,
    program: Arc<UnitProgram>,
    model: EvaluationModel,
    config: RuntimeConfig,
    state: UnitState,
    images: ImageTable,
    bounds: Option<Rect>,
    slots: Vec<Value>,
    initialized: bool,
    rng: StdRng,
    vm: Vm,
    memo: HashMap<(i64, i64), PixelResult>,
    cancel: CancelToken,
}

impl RuntimeUnit {
    pub fn new(
        name: impl Into<String>,
        program: Arc<UnitProgram>,
        model: EvaluationModel,
        config: RuntimeConfig,
    ) -> Self {
        let name = name.into();
        info!(
            unit = %name,
            ?model,
            images = program.images.len(),
            slots = program.slot_count,
            "runtime unit created"
        );
        Self {
            images: ImageTable::new(program.images.clone()),
            slots: vec![Value::default(); program.slot_count],
            rng: seeded_rng(config.seed),
            name,
            program,
            model,
            config,
            state: UnitState::Compiled,
            bounds: None,
            initialized: false,
            vm: Vm::new(),
            memo: HashMap::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> EvaluationModel {
        self.model
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn program(&self) -> &Arc<UnitProgram> {
        &self.program
    }

    /// Image names and roles, in declaration order.
    pub fn images(&self) -> impl Iterator<Item = (&str, ImageRole)> {
        self.program
            .images
            .iter()
            .map(|slot| (slot.name.as_str(), slot.role))
    }

    /// Token that cancels passes of this unit. Cancellation is checked
    /// before each row.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Bind a source raster to the image `name`.
    pub fn bind_source(&mut self, name: &str, raster: Arc<dyn RasterSurface>) -> Result<()> {
        let index = self.image_index(name, ImageRole::Source)?;
        self.images.bindings[index] = Binding::Source(raster);
        self.rebound();
        Ok(())
    }

    /// Bind a destination raster to the image `name`.
    pub fn bind_destination(&mut self, name: &str, raster: Box<dyn RasterSurface>) -> Result<()> {
        let index = self.image_index(name, ImageRole::Destination)?;
        self.images.bindings[index] = Binding::Destination(raster);
        self.rebound();
        Ok(())
    }

    /// The raster bound to destination `name`.
    pub fn destination(&self, name: &str) -> Option<&dyn RasterSurface> {
        let index = self.program.image_index(name)?;
        match &self.images.bindings[index] {
            Binding::Destination(raster) => Some(raster.as_ref()),
            _ => None,
        }
    }

    /// Unbind destination `name` and hand its raster back.
    pub fn take_destination(&mut self, name: &str) -> Option<Box<dyn RasterSurface>> {
        let index = self.program.image_index(name)?;
        match std::mem::replace(&mut self.images.bindings[index], Binding::Unbound) {
            Binding::Destination(raster) => Some(raster),
            other => {
                self.images.bindings[index] = other;
                None
            }
        }
    }

    /// Names of destination images that currently have a raster bound.
    pub fn bound_destinations(&self) -> Vec<String> {
        self.program
            .images
            .iter()
            .zip(&self.images.bindings)
            .filter(|(_, binding)| is_destination(binding))
            .map(|(slot, _)| slot.name.clone())
            .collect()
    }

    /// Fix the evaluation bounds instead of deriving them from bindings.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.memo.clear();
    }

    /// Evaluation bounds: explicit, else the first bound destination's,
    /// else the first bound source's, else the single pixel at the origin.
    pub fn bounds(&self) -> Rect {
        if let Some(bounds) = self.bounds {
            return bounds;
        }
        let first = |want: fn(&Binding) -> bool| {
            self.images
                .bindings
                .iter()
                .position(want)
                .and_then(|i| self.images.raster(i))
                .map(|raster| raster.bounds())
        };
        first(is_destination)
            .or_else(|| first(is_source))
            .unwrap_or(Rect::sized(1, 1))
    }

    /// Evaluate one pixel.
    ///
    /// Direct units run the body and return the value of the last
    /// value-producing statement (NaN if there was none). Indirect units
    /// return the first destination's band 0 value, computed once per
    /// coordinate.
    pub fn evaluate(&mut self, x: i64, y: i64) -> Result<f64> {
        self.ensure_init()?;
        match self.model {
            EvaluationModel::Direct => Ok(self.run_pixel(x, y)?.unwrap_or(f64::NAN)),
            EvaluationModel::Indirect => {
                let first_dest = self.first_destination();
                let pixel = self.resolve_pixel(x, y)?;
                Ok(first_dest
                    .and_then(|image| captured_value(pixel, image))
                    .or(pixel.result)
                    .unwrap_or(f64::NAN))
            }
        }
    }

    /// Band 0 value of destination `name` at `(x, y)`. Indirect units only.
    pub fn value_at(&mut self, name: &str, x: i64, y: i64) -> Result<f64> {
        if self.model != EvaluationModel::Indirect {
            return Err(RuntimeError::InvalidState(
                "value_at needs the indirect evaluation model".to_string(),
            ));
        }
        let image = self.image_index(name, ImageRole::Destination)?;
        self.ensure_init()?;
        let pixel = self.resolve_pixel(x, y)?;
        Ok(captured_value(pixel, image).unwrap_or(f64::NAN))
    }

    /// Run one full pass over the evaluation bounds.
    ///
    /// `init` runs first, then every pixel, rows top to bottom. On success
    /// the listener has seen a complete progress sequence. A cancelled pass
    /// returns [`RuntimeError::Cancelled`].
    #[instrument(skip_all, fields(unit = %self.name))]
    pub fn evaluate_all(&mut self, listener: &mut dyn ProgressListener) -> Result<()> {
        self.initialized = false;
        self.memo.clear();
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let bounds = self.bounds();
        self.state = UnitState::Running;

        let outcome = self.scan(bounds, listener);
        self.state = match &outcome {
            Ok(()) => UnitState::Completed,
            Err(RuntimeError::Cancelled) => UnitState::Cancelled,
            Err(_) => UnitState::Failed,
        };
        match &outcome {
            Ok(()) => info!(%bounds, pixels = bounds.area(), "pass completed"),
            Err(error) => info!(%bounds, %error, "pass stopped"),
        }
        outcome
    }

    fn scan(&mut self, bounds: Rect, listener: &mut dyn ProgressListener) -> Result<()> {
        self.ensure_init()?;
        let mut progress = Progress::start(listener, bounds.area(), self.config.progress);
        if !bounds.is_empty() {
            for y in bounds.y..=bounds.max_y() {
                if self.cancel.is_cancelled() {
                    return Err(RuntimeError::Cancelled);
                }
                for x in bounds.x..=bounds.max_x() {
                    match self.model {
                        EvaluationModel::Direct => {
                            self.run_pixel(x, y)?;
                        }
                        EvaluationModel::Indirect => self.flush_pixel(x, y)?,
                    }
                    progress.tick();
                }
            }
        }
        progress.finish();
        Ok(())
    }

    fn image_index(&self, name: &str, role: ImageRole) -> Result<usize> {
        let index = self
            .program
            .image_index(name)
            .ok_or_else(|| RuntimeError::UnknownImage(name.to_string()))?;
        if self.program.images[index].role != role {
            return Err(RuntimeError::RoleMismatch {
                name: name.to_string(),
                expected: role_name(self.program.images[index].role),
            });
        }
        Ok(index)
    }

    fn first_destination(&self) -> Option<usize> {
        self.program
            .images
            .iter()
            .position(|slot| slot.role == ImageRole::Destination)
    }

    fn rebound(&mut self) {
        self.memo.clear();
        self.initialized = false;
        self.state = UnitState::Bound;
    }

    fn pixel_context(&self, x: i64, y: i64) -> PixelContext {
        let bounds = self.bounds();
        PixelContext {
            x,
            y,
            min_x: bounds.x,
            min_y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }

    fn ensure_init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.slots = vec![Value::default(); self.program.slot_count];
        let bounds = self.bounds();
        let pixel = self.pixel_context(bounds.x, bounds.y);
        let mut frame = Frame {
            slots: &mut self.slots,
            images: &mut self.images,
            rng: &mut self.rng,
            pixel,
        };
        self.vm.run(&self.program.init, &mut frame)?;
        self.initialized = true;
        Ok(())
    }

    fn run_pixel(&mut self, x: i64, y: i64) -> Result<Option<f64>> {
        let pixel = self.pixel_context(x, y);
        let mut frame = Frame {
            slots: &mut self.slots,
            images: &mut self.images,
            rng: &mut self.rng,
            pixel,
        };
        self.vm.run(&self.program.body, &mut frame)
    }

    /// Memoized pixel for the indirect model.
    fn resolve_pixel(&mut self, x: i64, y: i64) -> Result<&PixelResult> {
        if !self.memo.contains_key(&(x, y)) {
            self.images.capture = Some(Vec::new());
            let outcome = self.run_pixel(x, y);
            let writes = self.images.capture.take().unwrap_or_default();
            let result = outcome?;
            self.memo.insert((x, y), PixelResult { result, writes });
        }
        self.memo
            .get(&(x, y))
            .ok_or_else(|| RuntimeError::Internal("memoized pixel missing".to_string()))
    }

    fn flush_pixel(&mut self, x: i64, y: i64) -> Result<()> {
        let writes = self.resolve_pixel(x, y)?.writes.clone();
        for write in writes {
            self.images.store(write.image, x, y, write.band, write.value)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RuntimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeUnit")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("state", &self.state)
            .field("bounds", &self.bounds())
            .finish_non_exhaustive()
    }
}

fn is_destination(binding: &Binding) -> bool {
    matches!(binding, Binding::Destination(_))
}

fn is_source(binding: &Binding) -> bool {
    matches!(binding, Binding::Source(_))
}

fn captured_value(pixel: &PixelResult, image: usize) -> Option<f64> {
    pixel
        .writes
        .iter()
        .rev()
        .find(|w| w.image == image && w.band == 0)
        .map(|w| w.value)
}

fn role_name(role: ImageRole) -> &'static str {
    match role {
        ImageRole::Source => "source",
        ImageRole::Destination => "destination",
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
