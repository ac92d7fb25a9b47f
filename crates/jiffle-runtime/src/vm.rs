//! Bytecode interpreter.
//!
//! The VM executes one [`Chunk`] at a time against a [`Frame`]: the slot
//! table, the unit's images, its random generator and the current pixel.
//! It holds nothing between runs except the reusable stack buffers.
//!
//! Chunks reaching the VM have been through the verifier, so stack
//! underflow and bad indices are reported as `Internal` rather than
//! checked for politely.

use crate::bytecode::{Axis, Chunk, Op};
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use jiffle_ast::BinaryOp;
use jiffle_functions::{truthy, FunctionImpl, PixelContext};
use rand::RngCore;

/// Image access for a running chunk.
pub trait ImageEnv {
    /// Script name of an image.
    fn name(&self, image: usize) -> &str;

    /// Sample of a source image, or `None` if `(x, y)` is outside it.
    fn read(&self, image: usize, x: i64, y: i64, band: i64) -> Result<Option<f64>>;

    /// Write a sample of a destination image.
    fn write(&mut self, image: usize, x: i64, y: i64, band: i64, value: f64) -> Result<()>;
}

/// Everything a chunk can touch.
pub struct Frame<'a> {
    pub slots: &'a mut [Value],
    pub images: &'a mut dyn ImageEnv,
    pub rng: &'a mut dyn RngCore,
    pub pixel: PixelContext,
}

/// Stack machine for [`Op`] sequences.
#[derive(Debug, Default)]
pub struct Vm {
    stack: Vec<Value>,
    args: Vec<f64>,
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `chunk` to its end.
    ///
    /// Returns the last scalar passed to `SetResult`, if any.
    pub fn run(&mut self, chunk: &Chunk, frame: &mut Frame<'_>) -> Result<Option<f64>> {
        self.stack.clear();
        let mut result = None;
        let mut pc = 0;

        while let Some(&op) = chunk.code.get(pc) {
            pc += 1;
            match op {
                Op::Const(n) => {
                    let value = chunk
                        .literals
                        .get(n as usize)
                        .copied()
                        .ok_or_else(|| internal("literal out of range"))?;
                    self.stack.push(Value::Scalar(value));
                }
                Op::Load(n) => {
                    let value = slot(frame.slots, n)?.clone();
                    self.stack.push(value);
                }
                Op::Store(n) => {
                    let value = self.pop()?;
                    *slot(frame.slots, n)? = value;
                }
                Op::Append(n) => {
                    let value = self.pop_scalar("appended value")?;
                    match slot(frame.slots, n)? {
                        Value::List(items) => items.push(value),
                        Value::Scalar(_) => {
                            return Err(RuntimeError::TypeMismatch(
                                "'<<' needs a list variable, found a number".to_string(),
                            ))
                        }
                    }
                }
                Op::MakeList(n) => {
                    let start = self
                        .stack
                        .len()
                        .checked_sub(n as usize)
                        .ok_or_else(|| internal("stack underflow"))?;
                    let items = self
                        .stack
                        .drain(start..)
                        .map(|v| v.scalar("list element"))
                        .collect::<Result<Vec<_>>>()?;
                    self.stack.push(Value::List(items));
                }
                Op::Len => {
                    let len = self.pop()?.list("foreach")?.len();
                    self.stack.push(Value::Scalar(len as f64));
                }
                Op::Index => {
                    let index = self.pop_scalar("list index")?;
                    let list = self.pop()?;
                    let item = list
                        .list("foreach")?
                        .get(index as usize)
                        .copied()
                        .ok_or_else(|| internal("list cursor out of range"))?;
                    self.stack.push(Value::Scalar(item));
                }
                Op::Pop => {
                    self.pop()?;
                }
                Op::Neg => {
                    let v = self.pop_scalar("'-'")?;
                    self.stack.push(Value::Scalar(-v));
                }
                Op::Not => {
                    let v = self.pop_truth("'!'")?;
                    self.stack.push(flag(!v));
                }
                Op::Num => {
                    let v = self.pop_scalar("'+'")?;
                    self.stack.push(Value::Scalar(v));
                }
                Op::Truth => {
                    let v = self.pop_truth("logical operator")?;
                    self.stack.push(flag(v));
                }
                Op::Binary(op) => {
                    let right = self.pop_scalar(op.symbol())?;
                    let left = self.pop_scalar(op.symbol())?;
                    self.stack.push(Value::Scalar(binary(op, left, right)?));
                }
                Op::Read {
                    image,
                    x,
                    y,
                    outside,
                } => {
                    let y = self.coordinate(y, frame.pixel.y)?;
                    let x = self.coordinate(x, frame.pixel.x)?;
                    let band = self.pop_scalar("band index")?;
                    let image = image as usize;
                    let sample = match (x, y) {
                        (Some(x), Some(y)) => frame.images.read(image, x, y, round_band(band))?,
                        _ => None,
                    };
                    let value = match (sample, outside) {
                        (Some(v), _) => v,
                        (None, Some(n)) => chunk
                            .literals
                            .get(n as usize)
                            .copied()
                            .ok_or_else(|| internal("literal out of range"))?,
                        (None, None) => {
                            return Err(RuntimeError::OutOfBounds {
                                image: frame.images.name(image).to_string(),
                                x: x.unwrap_or(i64::MIN),
                                y: y.unwrap_or(i64::MIN),
                            })
                        }
                    };
                    self.stack.push(Value::Scalar(value));
                }
                Op::Write { image } => {
                    let value = self.pop_scalar("image write")?;
                    let band = self.pop_scalar("band index")?;
                    frame.images.write(
                        image as usize,
                        frame.pixel.x,
                        frame.pixel.y,
                        round_band(band),
                        value,
                    )?;
                    result = Some(value);
                }
                Op::Position(position) => {
                    self.stack.push(Value::Scalar(position.value(&frame.pixel)));
                }
                Op::Call { function, argc } => {
                    let value = self.call(function, argc as usize, frame)?;
                    self.stack.push(Value::Scalar(value));
                }
                Op::Jump(target) => pc = target as usize,
                Op::JumpIfFalse(target) => {
                    if !self.pop_truth("condition")? {
                        pc = target as usize;
                    }
                }
                Op::JumpIfTrue(target) => {
                    if self.pop_truth("condition")? {
                        pc = target as usize;
                    }
                }
                Op::SetResult => {
                    if let Value::Scalar(v) = self.pop()? {
                        result = Some(v);
                    }
                }
            }
        }
        Ok(result)
    }

    fn pop(&mut self) -> Result<Value> {
        self.stack.pop().ok_or_else(|| internal("stack underflow"))
    }

    fn pop_scalar(&mut self, context: &str) -> Result<f64> {
        self.pop()?.scalar(context)
    }

    fn pop_truth(&mut self, context: &str) -> Result<bool> {
        self.pop()?.is_true(context)
    }

    /// Pop and resolve one axis of an image read. `None` if the value is
    /// not a finite coordinate.
    fn coordinate(&mut self, axis: Axis, current: i64) -> Result<Option<i64>> {
        Ok(match axis {
            Axis::Current => Some(current),
            Axis::Relative => round_coordinate(self.pop_scalar("pixel offset")?)
                .and_then(|offset| current.checked_add(offset)),
            Axis::Absolute => round_coordinate(self.pop_scalar("pixel position")?),
        })
    }

    fn call(
        &mut self,
        function: jiffle_functions::FunctionId,
        argc: usize,
        frame: &mut Frame<'_>,
    ) -> Result<f64> {
        let descriptor = function
            .get()
            .ok_or_else(|| internal("unknown function id"))?;
        let start = self
            .stack
            .len()
            .checked_sub(argc)
            .ok_or_else(|| internal("stack underflow"))?;

        match descriptor.implementation {
            FunctionImpl::List(f) => {
                let arg = self.pop()?;
                let items = arg.list(descriptor.name)?;
                Ok(f(items))
            }
            FunctionImpl::Scalar(f) => {
                self.args.clear();
                for value in self.stack.drain(start..) {
                    self.args.push(value.scalar(descriptor.name)?);
                }
                Ok(f(&self.args))
            }
            FunctionImpl::Random(f) => {
                let bound = self.pop_scalar(descriptor.name)?;
                Ok(f(&mut *frame.rng, bound))
            }
            FunctionImpl::Position(_) => Err(internal("position query compiled as a call")),
        }
    }
}

fn slot<'s>(slots: &'s mut [Value], n: u32) -> Result<&'s mut Value> {
    slots
        .get_mut(n as usize)
        .ok_or_else(|| internal("slot out of range"))
}

fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64> {
    Ok(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Eq => bool_value(a == b),
        BinaryOp::Ne => bool_value(a != b),
        BinaryOp::Lt => bool_value(a < b),
        BinaryOp::Le => bool_value(a <= b),
        BinaryOp::Gt => bool_value(a > b),
        BinaryOp::Ge => bool_value(a >= b),
        BinaryOp::Xor => bool_value(truthy(a) != truthy(b)),
        BinaryOp::And | BinaryOp::Or => {
            return Err(internal("short-circuit operator reached the VM"))
        }
    })
}

fn bool_value(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn flag(b: bool) -> Value {
    Value::Scalar(bool_value(b))
}

/// Round half up to a pixel coordinate.
fn round_coordinate(v: f64) -> Option<i64> {
    if v.is_finite() {
        Some((v + 0.5).floor() as i64)
    } else {
        None
    }
}

/// Round half up to a band index; non-finite bands become -1 and are
/// rejected by the image table.
fn round_band(v: f64) -> i64 {
    round_coordinate(v).unwrap_or(-1)
}

fn internal(what: &str) -> RuntimeError {
    RuntimeError::Internal(what.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile_program;
    use jiffle_ast::{ImageRole, SourceFile};
    use jiffle_parser::parse_program;
    use jiffle_resolve::{analyze, RoleMap};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    /// One 3x3 source image "src" (value = 10y + x) and one destination.
    #[derive(Default)]
    struct TestImages {
        written: HashMap<(i64, i64, i64), f64>,
    }

    impl ImageEnv for TestImages {
        fn name(&self, image: usize) -> &str {
            ["src", "dest"][image]
        }

        fn read(&self, _image: usize, x: i64, y: i64, band: i64) -> Result<Option<f64>> {
            if band != 0 {
                return Err(RuntimeError::InvalidBand {
                    image: "src".into(),
                    band,
                });
            }
            Ok(((0..3).contains(&x) && (0..3).contains(&y)).then(|| (10 * y + x) as f64))
        }

        fn write(&mut self, _image: usize, x: i64, y: i64, band: i64, value: f64) -> Result<()> {
            self.written.insert((x, y, band), value);
            Ok(())
        }
    }

    struct Outcome {
        result: Option<f64>,
        slots: Vec<Value>,
        images: TestImages,
    }

    fn run_at(source: &str, x: i64, y: i64) -> Result<Outcome> {
        let file = SourceFile::new("test", source);
        let program = parse_program(&file).unwrap();
        let roles: RoleMap = [
            ("src".to_string(), ImageRole::Source),
            ("dest".to_string(), ImageRole::Destination),
        ]
        .into_iter()
        .collect();
        let analysis = analyze(&program, &roles).unwrap();
        let unit = compile_program(&analysis.ir).unwrap();

        let mut slots = vec![Value::default(); unit.slot_count];
        let mut images = TestImages::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut vm = Vm::new();
        let mut frame = Frame {
            slots: &mut slots,
            images: &mut images,
            rng: &mut rng,
            pixel: PixelContext {
                x,
                y,
                min_x: 0,
                min_y: 0,
                width: 3,
                height: 3,
            },
        };
        vm.run(&unit.init, &mut frame)?;
        let result = vm.run(&unit.body, &mut frame)?;
        Ok(Outcome {
            result,
            slots,
            images,
        })
    }

    fn eval(source: &str) -> f64 {
        run_at(source, 1, 1).unwrap().result.unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("dest = src; 1 + 2 * 3;"), 7.0);
        assert_eq!(eval("dest = src; 2 ^ 3 ^ 2;"), 512.0);
        assert_eq!(eval("dest = src; -7 % 3;"), -1.0);
        assert!(eval("dest = src; 0 / 0;").is_nan());
    }

    #[test]
    fn test_logic_short_circuits() {
        assert_eq!(eval("dest = src; 0 && (1 / 0);"), 0.0);
        assert_eq!(eval("dest = src; 2 || 0;"), 1.0);
        assert_eq!(eval("dest = src; 3 && 4;"), 1.0);
        assert_eq!(eval("dest = src; 1 ^| 1;"), 0.0);
        assert_eq!(eval("dest = src; null == null;"), 0.0);
        assert_eq!(eval("dest = src; !null;"), 1.0);
    }

    #[test]
    fn test_last_statement_is_result() {
        assert_eq!(eval("dest = src; a = 4; a * 2; b = 9;"), 9.0);
        assert_eq!(eval("dest = src * 3;"), 33.0);
    }

    #[test]
    fn test_loops() {
        assert_eq!(eval("dest = src; n = 0; foreach (i in 1:4) n += i; n;"), 10.0);
        assert_eq!(
            eval("dest = src; n = 0; foreach (v in [2, 5, 7]) { n += v; } n;"),
            14.0
        );
        assert_eq!(
            eval("dest = src; n = 0; while (n < 100) { n += 1; breakif(n == 5); } n;"),
            5.0
        );
        assert_eq!(eval("dest = src; n = 0; until (n >= 3) n++; n;"), 3.0);
    }

    #[test]
    fn test_descending_range_runs_zero_times() {
        // start > end is an empty loop, not a reversed one
        assert_eq!(eval("dest = src; n = 0; foreach (i in 1:-1) n += 1; n;"), 0.0);
    }

    #[test]
    fn test_lists_and_list_functions() {
        assert_eq!(eval("dest = src; v = [3, 1, 2]; v << 10; sum(v);"), 16.0);
        assert_eq!(eval("dest = src; median([5, 1, 3]);"), 3.0);
        let err = run_at("dest = src; v = 4; max(v);", 1, 1).err();
        assert!(matches!(err, Some(RuntimeError::TypeMismatch(_))));
    }

    #[test]
    fn test_list_is_not_a_condition() {
        let err = run_at("dest = src; v = [1]; r = 0; if (v) { r = 1; } r;", 1, 1).err();
        assert!(matches!(err, Some(RuntimeError::TypeMismatch(msg)) if msg.contains("condition")));
        let err = run_at("dest = src; v = [1]; !v;", 1, 1).err();
        assert!(matches!(err, Some(RuntimeError::TypeMismatch(msg)) if msg.contains("'!'")));
    }

    #[test]
    fn test_neighbour_reads() {
        assert_eq!(eval("dest = src[1, 1];"), 22.0);
        assert_eq!(eval("dest = src[$0, $2];"), 20.0);
        assert_eq!(eval("dest = src[0.5, -0.5];"), 12.0);
        let err = run_at("dest = src[-1, 0];", 0, 0).err();
        assert_eq!(
            err,
            Some(RuntimeError::OutOfBounds {
                image: "src".into(),
                x: -1,
                y: 0
            })
        );
        let outcome = run_at("options { outside = -5; } dest = src[-1, 0];", 0, 0).unwrap();
        assert_eq!(outcome.result, Some(-5.0));
    }

    #[test]
    fn test_writes_go_to_current_pixel() {
        let outcome = run_at("dest = src; dest[1] = 4;", 2, 1).unwrap();
        assert_eq!(outcome.images.written.get(&(2, 1, 0)), Some(&12.0));
        assert_eq!(outcome.images.written.get(&(2, 1, 1)), Some(&4.0));
    }

    #[test]
    fn test_position_functions() {
        assert_eq!(eval("dest = src; x() + 10 * y();"), 11.0);
        assert_eq!(eval("dest = src; xmax() + width();"), 5.0);
    }

    #[test]
    fn test_seeded_random_is_repeatable() {
        let a = eval("dest = src; rand(1);");
        let b = eval("dest = src; rand(1);");
        assert_eq!(a, b);
        assert!((0.0..1.0).contains(&a));
    }

    #[test]
    fn test_init_variables_persist_in_slots() {
        let outcome = run_at("init { total = 5; } dest = src; total += 1;", 0, 0).unwrap();
        assert_eq!(outcome.slots[0], Value::Scalar(6.0));
    }
}
