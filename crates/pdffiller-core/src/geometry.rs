/// Rectangle in PDF user space (bottom-left origin).
///
/// Coordinates follow the PDF array convention `[x0 y0 x1 y1]`:
/// - `x0`: left edge
/// - `y0`: bottom edge
/// - `x1`: right edge
/// - `y1`: top edge
///
/// [`Rect::new`] normalizes the corners so that `x0 <= x1` and `y0 <= y1`,
/// since PDF writers may emit any two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// The empty rectangle at the origin.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Returns `true` if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// Affine transformation matrix `[a b c d e f]` as used by the `cm` operator
/// and the `/Matrix` entry of form XObjects.
///
/// A point `(x, y)` maps to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Build a matrix from a 6-element slice, or `None` if the length is wrong.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    /// Apply this transform to a point.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transform all four corners of `rect` and return their bounding box.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.x0, rect.y0),
            self.transform_point(rect.x1, rect.y0),
            self.transform_point(rect.x0, rect.y1),
            self.transform_point(rect.x1, rect.y1),
        ];
        let (mut x0, mut y0) = corners[0];
        let (mut x1, mut y1) = corners[0];
        for &(x, y) in &corners[1..] {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Rect::new(x0, y0, x1, y1)
    }

    /// Matrix that maps `from` onto `to` with independent x/y scaling.
    ///
    /// A degenerate axis in `from` keeps a unit scale on that axis.
    pub fn rect_to_rect(from: &Rect, to: &Rect) -> Self {
        let sx = if from.width() != 0.0 {
            to.width() / from.width()
        } else {
            1.0
        };
        let sy = if from.height() != 0.0 {
            to.height() / from.height()
        } else {
            1.0
        };
        Self::new(sx, 0.0, 0.0, sy, to.x0 - from.x0 * sx, to.y0 - from.y0 * sy)
    }

    /// Format as the operand list of a `cm` operator.
    pub fn to_operands(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            fmt_number(self.a),
            fmt_number(self.b),
            fmt_number(self.c),
            fmt_number(self.d),
            fmt_number(self.e),
            fmt_number(self.f)
        )
    }
}

/// Format a number for a content stream: at most 4 decimals, no trailing zeros.
pub fn fmt_number(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}
