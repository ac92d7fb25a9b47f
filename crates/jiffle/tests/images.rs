//! Scripts evaluated over bound rasters.

use jiffle::mapcalc::to_jiffle;
use jiffle::{
    EvaluationModel, ImageRole, Jiffle, MemoryRaster, NullProgressListener, RasterSurface,
    Rect, RuntimeError, RuntimeUnit, SampleType, UnitState,
};
use std::sync::Arc;

fn unit(script: &str, roles: &[(&str, ImageRole)], model: EvaluationModel) -> RuntimeUnit {
    let mut jiffle = Jiffle::new();
    jiffle.set_script(script);
    jiffle.set_image_roles(roles.iter().copied());
    jiffle.compile().expect("script should compile");
    jiffle.runtime_unit(model).unwrap()
}

fn constant(value: f64) -> Arc<dyn RasterSurface> {
    Arc::new(MemoryRaster::filled(4, 4, value))
}

fn ramp(width: i64, height: i64) -> Arc<dyn RasterSurface> {
    Arc::new(MemoryRaster::from_fn(width, height, |x, y| (y * width + x) as f64))
}

fn band(unit: &RuntimeUnit, name: &str) -> Vec<f64> {
    let dest = unit.destination(name).unwrap();
    let bounds = dest.bounds();
    let mut values = Vec::new();
    for y in bounds.y..=bounds.max_y() {
        for x in bounds.x..=bounds.max_x() {
            values.push(dest.get_sample(x, y, 0).unwrap());
        }
    }
    values
}

#[test]
fn test_sum_of_two_sources() {
    let mut unit = unit(
        "dest = foo + bar;",
        &[
            ("foo", ImageRole::Source),
            ("bar", ImageRole::Source),
            ("dest", ImageRole::Destination),
        ],
        EvaluationModel::Direct,
    );
    unit.bind_source("foo", constant(2.0)).unwrap();
    unit.bind_source("bar", constant(3.0)).unwrap();
    unit.bind_destination("dest", Box::new(MemoryRaster::new(4, 4, 1)))
        .unwrap();
    unit.evaluate_all(&mut NullProgressListener).unwrap();

    assert_eq!(unit.state(), UnitState::Completed);
    assert_eq!(band(&unit, "dest"), vec![5.0; 16]);
}

#[test]
fn test_outside_option_replaces_out_of_bounds_reads() {
    let roles = [("world", ImageRole::Source), ("dest", ImageRole::Destination)];

    let mut with_outside = unit(
        "options { outside = 0; } dest = world[-1, -1];",
        &roles,
        EvaluationModel::Direct,
    );
    with_outside.bind_source("world", constant(9.0)).unwrap();
    with_outside
        .bind_destination("dest", Box::new(MemoryRaster::new(4, 4, 1)))
        .unwrap();
    assert_eq!(with_outside.evaluate(0, 0).unwrap(), 0.0);
    assert_eq!(with_outside.evaluate(1, 1).unwrap(), 9.0);

    let mut without = unit("dest = world[-1, -1];", &roles, EvaluationModel::Direct);
    without.bind_source("world", constant(9.0)).unwrap();
    without
        .bind_destination("dest", Box::new(MemoryRaster::new(4, 4, 1)))
        .unwrap();
    assert!(matches!(
        without.evaluate(0, 0),
        Err(RuntimeError::OutOfBounds { x: -1, y: -1, .. })
    ));
    let err = without.evaluate_all(&mut NullProgressListener).unwrap_err();
    assert!(matches!(err, RuntimeError::OutOfBounds { .. }));
    assert_eq!(without.state(), UnitState::Failed);
}

#[test]
fn test_three_by_three_mean() {
    let mut unit = unit(
        "options { outside = NaN; }
         n = 0; s = 0;
         foreach (dy in -1:1) {
             foreach (dx in -1:1) {
                 v = src[dx, dy];
                 if (!isnan(v)) { n += 1; s += v; }
             }
         }
         dest = s / n;",
        &[("src", ImageRole::Source), ("dest", ImageRole::Destination)],
        EvaluationModel::Direct,
    );
    unit.bind_source("src", ramp(3, 3)).unwrap();
    unit.bind_destination("dest", Box::new(MemoryRaster::new(3, 3, 1)))
        .unwrap();
    unit.evaluate_all(&mut NullProgressListener).unwrap();
    let values = band(&unit, "dest");
    assert_eq!(values[4], 4.0);
    // corner (0, 0) averages 0, 1, 3 and 4
    assert_eq!(values[0], 2.0);
}

#[test]
fn test_integral_destination_rounds_half_up() {
    let mut unit = unit(
        "dest = src / 2;",
        &[("src", ImageRole::Source), ("dest", ImageRole::Destination)],
        EvaluationModel::Direct,
    );
    unit.bind_source("src", ramp(4, 1)).unwrap();
    unit.bind_destination(
        "dest",
        Box::new(MemoryRaster::with_bounds(Rect::sized(4, 1), 1, SampleType::Byte)),
    )
    .unwrap();
    unit.evaluate_all(&mut NullProgressListener).unwrap();
    assert_eq!(band(&unit, "dest"), vec![0.0, 1.0, 1.0, 2.0]);
}

#[test]
fn test_rebinding_needs_no_recompile() {
    let mut unit = unit(
        "dest = src + 1;",
        &[("src", ImageRole::Source), ("dest", ImageRole::Destination)],
        EvaluationModel::Direct,
    );
    unit.bind_destination("dest", Box::new(MemoryRaster::new(4, 4, 1)))
        .unwrap();
    unit.bind_source("src", constant(1.0)).unwrap();
    unit.evaluate_all(&mut NullProgressListener).unwrap();
    assert_eq!(band(&unit, "dest")[0], 2.0);

    unit.bind_source("src", constant(10.0)).unwrap();
    assert_eq!(unit.state(), UnitState::Bound);
    unit.evaluate_all(&mut NullProgressListener).unwrap();
    assert_eq!(band(&unit, "dest")[0], 11.0);
}

#[test]
fn test_image_scope_variables_and_position() {
    let mut unit = unit(
        "init { half = width() / 2; } dest = x() < half ? 0 : 1;",
        &[("dest", ImageRole::Destination)],
        EvaluationModel::Direct,
    );
    unit.bind_destination("dest", Box::new(MemoryRaster::new(4, 1, 1)))
        .unwrap();
    unit.evaluate_all(&mut NullProgressListener).unwrap();
    assert_eq!(band(&unit, "dest"), vec![0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_indirect_model_is_memoized() {
    let mut unit = unit(
        "dest = src * 10 + rand(1);",
        &[("src", ImageRole::Source), ("dest", ImageRole::Destination)],
        EvaluationModel::Indirect,
    );
    unit.bind_source("src", ramp(2, 2)).unwrap();
    unit.bind_destination("dest", Box::new(MemoryRaster::new(2, 2, 1)))
        .unwrap();

    let first = unit.evaluate(1, 1).unwrap();
    assert_eq!(unit.evaluate(1, 1).unwrap(), first);
    assert!((30.0..31.0).contains(&first));
    assert_eq!(unit.value_at("dest", 1, 1).unwrap(), first);
}

#[test]
fn test_mapcalc_round_trip() {
    let mapcalc = "a = src * 2\nb = if(a > 4, a, 0)\ndest = b + 1\n";
    let script = to_jiffle(mapcalc);
    assert_eq!(script.lines().count(), 3);

    let roles = [("src", ImageRole::Source), ("dest", ImageRole::Destination)];
    let run = |script: &str| {
        let mut unit = unit(script, &roles, EvaluationModel::Direct);
        unit.bind_source("src", ramp(4, 1)).unwrap();
        unit.bind_destination("dest", Box::new(MemoryRaster::new(4, 1, 1)))
            .unwrap();
        unit.evaluate_all(&mut NullProgressListener).unwrap();
        band(&unit, "dest")
    };

    let converted = run(&script);
    let handwritten = run("a = src * 2; b = a > 4 ? a : 0; dest = b + 1;");
    assert_eq!(converted, handwritten);
    assert_eq!(converted, vec![1.0, 1.0, 1.0, 7.0]);
}
