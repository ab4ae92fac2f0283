//! Basic geometric types for PDF

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0)
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// A rectangle defined by two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Lower-left corner
    pub lower_left: Point,
    /// Upper-right corner
    pub upper_right: Point,
}

impl Rectangle {
    /// Create a new rectangle from two points
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        Self {
            lower_left,
            upper_right,
        }
    }

    /// Create a rectangle from its corner coordinates
    pub fn from_coordinates(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self {
            lower_left: Point::new(llx, lly),
            upper_right: Point::new(urx, ury),
        }
    }

    /// Get the width
    pub fn width(&self) -> f64 {
        self.upper_right.x - self.lower_left.x
    }

    /// Get the height
    pub fn height(&self) -> f64 {
        self.upper_right.y - self.lower_left.y
    }
}

/// A 2D affine transformation matrix.
///
/// Laid out as the PDF `cm` operand order `[a b c d e f]`, mapping
/// `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    /// The identity transform
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// A translation by (tx, ty)
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    /// A scaling by (sx, sy)
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// A counter-clockwise rotation by `angle` radians
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Concatenate `op` onto this transform.
    ///
    /// Applying the result is equivalent to applying `op` first and then
    /// `self`, which is how a `cm` operator composes with the transform
    /// already in effect when it is emitted.
    pub fn then(&self, op: &Matrix) -> Matrix {
        Matrix {
            a: op.a * self.a + op.b * self.c,
            b: op.a * self.b + op.b * self.d,
            c: op.c * self.a + op.d * self.c,
            d: op.c * self.b + op.d * self.d,
            e: op.e * self.a + op.f * self.c + self.e,
            f: op.e * self.b + op.f * self.d + self.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}
