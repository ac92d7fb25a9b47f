//! Raster surfaces.
//!
//! The runtime never opens files or manages tiles. Hosts hand it objects
//! implementing [`RasterSurface`]; [`MemoryRaster`] is the in-memory
//! implementation used by tests and by hosts that already hold pixel data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `width` × `height` rectangle at the origin.
    pub fn sized(width: i64, height: i64) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// Largest x inside the rectangle.
    pub fn max_x(&self) -> i64 {
        self.x + self.width - 1
    }

    /// Largest y inside the rectangle.
    pub fn max_y(&self) -> i64 {
        self.y + self.height - 1
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Storage type of raster samples.
///
/// Scripts compute in `f64`; values are converted only when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleType {
    Byte,
    Short,
    UShort,
    Int,
    Float,
    #[default]
    Double,
}

impl SampleType {
    /// Convert a computed value to what this type can store.
    ///
    /// Integral types round half up and clamp to their range; NaN becomes 0.
    /// `Float` rounds through `f32`.
    pub fn coerce(self, value: f64) -> f64 {
        let (lo, hi) = match self {
            SampleType::Double => return value,
            SampleType::Float => return value as f32 as f64,
            SampleType::Byte => (0.0, u8::MAX as f64),
            SampleType::Short => (i16::MIN as f64, i16::MAX as f64),
            SampleType::UShort => (0.0, u16::MAX as f64),
            SampleType::Int => (i32::MIN as f64, i32::MAX as f64),
        };
        if value.is_nan() {
            return 0.0;
        }
        (value + 0.5).floor().clamp(lo, hi)
    }

    pub fn is_integral(self) -> bool {
        !matches!(self, SampleType::Float | SampleType::Double)
    }
}

/// A raster the runtime reads from or writes to.
pub trait RasterSurface: Send + Sync {
    /// Pixel rectangle covered by this raster.
    fn bounds(&self) -> Rect;

    /// Number of bands.
    fn bands(&self) -> usize;

    fn sample_type(&self) -> SampleType;

    /// Sample at `(x, y)` in `band`, or `None` outside the bounds or band range.
    fn get_sample(&self, x: i64, y: i64, band: usize) -> Option<f64>;

    /// Store a sample. Returns `false` outside the bounds or band range.
    fn set_sample(&mut self, x: i64, y: i64, band: usize, value: f64) -> bool;
}

/// Band-interleaved in-memory raster.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRaster {
    bounds: Rect,
    bands: usize,
    sample_type: SampleType,
    data: Vec<f64>,
}

impl MemoryRaster {
    /// Zero-filled `Double` raster at the origin.
    pub fn new(width: i64, height: i64, bands: usize) -> Self {
        Self::with_bounds(Rect::sized(width, height), bands, SampleType::Double)
    }

    /// Zero-filled raster covering `bounds`.
    pub fn with_bounds(bounds: Rect, bands: usize, sample_type: SampleType) -> Self {
        let len = bounds.area() as usize * bands;
        Self {
            bounds,
            bands,
            sample_type,
            data: vec![0.0; len],
        }
    }

    /// Single-band `Double` raster with every sample set to `value`.
    pub fn filled(width: i64, height: i64, value: f64) -> Self {
        let mut raster = Self::new(width, height, 1);
        raster.data.fill(value);
        raster
    }

    /// Single-band `Double` raster with samples from `f(x, y)`.
    pub fn from_fn(width: i64, height: i64, f: impl Fn(i64, i64) -> f64) -> Self {
        let mut raster = Self::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                raster.set_sample(x, y, 0, f(x, y));
            }
        }
        raster
    }

    fn index(&self, x: i64, y: i64, band: usize) -> Option<usize> {
        if !self.bounds.contains(x, y) || band >= self.bands {
            return None;
        }
        let col = (x - self.bounds.x) as usize;
        let row = (y - self.bounds.y) as usize;
        Some((row * self.bounds.width as usize + col) * self.bands + band)
    }

    /// Samples of one band in row-major order.
    pub fn band_values(&self, band: usize) -> Vec<f64> {
        self.data
            .iter()
            .skip(band)
            .step_by(self.bands.max(1))
            .copied()
            .collect()
    }
}

impl RasterSurface for MemoryRaster {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn bands(&self) -> usize {
        self.bands
    }

    fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    fn get_sample(&self, x: i64, y: i64, band: usize) -> Option<f64> {
        self.index(x, y, band).map(|i| self.data[i])
    }

    fn set_sample(&mut self, x: i64, y: i64, band: usize, value: f64) -> bool {
        match self.index(x, y, band) {
            Some(i) => {
                self.data[i] = self.sample_type.coerce(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect() {
        let r = Rect::new(2, 3, 4, 5);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 7));
        assert!(!r.contains(6, 7));
        assert!(!r.contains(1, 3));
        assert_eq!(r.area(), 20);
        assert_eq!((r.max_x(), r.max_y()), (5, 7));
        assert_eq!(Rect::sized(0, 4).area(), 0);
    }

    #[test]
    fn test_integral_coercion() {
        assert_eq!(SampleType::Byte.coerce(2.5), 3.0);
        assert_eq!(SampleType::Byte.coerce(-2.5), 0.0);
        assert_eq!(SampleType::Byte.coerce(300.0), 255.0);
        assert_eq!(SampleType::Short.coerce(-2.5), -2.0);
        assert_eq!(SampleType::Int.coerce(f64::NAN), 0.0);
        assert_eq!(SampleType::UShort.coerce(1e9), 65535.0);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(SampleType::Float.coerce(0.1), 0.1f32 as f64);
        assert!(SampleType::Double.coerce(f64::NAN).is_nan());
        assert_eq!(SampleType::Double.coerce(0.1), 0.1);
    }

    #[test]
    fn test_memory_raster_access() {
        let mut r = MemoryRaster::with_bounds(Rect::new(10, 10, 2, 2), 2, SampleType::Byte);
        assert!(r.set_sample(11, 10, 1, 7.6));
        assert_eq!(r.get_sample(11, 10, 1), Some(8.0));
        assert_eq!(r.get_sample(11, 10, 0), Some(0.0));
        assert_eq!(r.get_sample(9, 10, 0), None);
        assert_eq!(r.get_sample(10, 10, 2), None);
        assert!(!r.set_sample(12, 10, 0, 1.0));
        assert_eq!(r.band_values(1), vec![0.0, 8.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_fn_row_major() {
        let r = MemoryRaster::from_fn(3, 2, |x, y| (y * 10 + x) as f64);
        assert_eq!(r.band_values(0), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }
}
