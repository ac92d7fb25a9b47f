//! Pixel position functions.

/// Where the evaluator currently is, and the bounds it iterates over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelContext {
    pub x: i64,
    pub y: i64,
    pub min_x: i64,
    pub min_y: i64,
    pub width: i64,
    pub height: i64,
}

/// Position query behind `x()`, `width()`, `xmax()` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    X,
    Y,
    Width,
    Height,
    XMin,
    YMin,
    XMax,
    YMax,
    /// Pixel size along x; pixel space is unit-sized
    XRes,
    /// Pixel size along y; pixel space is unit-sized
    YRes,
}

impl Position {
    /// Value of this query in `ctx`.
    pub fn value(self, ctx: &PixelContext) -> f64 {
        let v = match self {
            Position::X => ctx.x,
            Position::Y => ctx.y,
            Position::Width => ctx.width,
            Position::Height => ctx.height,
            Position::XMin => ctx.min_x,
            Position::YMin => ctx.min_y,
            Position::XMax => ctx.min_x + ctx.width - 1,
            Position::YMax => ctx.min_y + ctx.height - 1,
            Position::XRes | Position::YRes => 1,
        };
        v as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_values() {
        let ctx = PixelContext {
            x: 3,
            y: 7,
            min_x: 2,
            min_y: 5,
            width: 10,
            height: 4,
        };
        assert_eq!(Position::X.value(&ctx), 3.0);
        assert_eq!(Position::Y.value(&ctx), 7.0);
        assert_eq!(Position::XMax.value(&ctx), 11.0);
        assert_eq!(Position::YMax.value(&ctx), 8.0);
        assert_eq!(Position::Width.value(&ctx), 10.0);
        assert_eq!(Position::XRes.value(&ctx), 1.0);
    }
}
