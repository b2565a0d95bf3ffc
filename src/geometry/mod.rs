//! Geometric primitives for layout reconstruction.
//!
//! Positions come straight from PDF transformation matrices, so everything
//! here is expressed in PDF user-space units (y grows upward).

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use cert_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D affine transform in PDF order `[a b c d e f]`.
///
/// `a..d` carry scale, rotation and skew; `e` and `f` are the translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix(pub [f64; 6]);

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Create a matrix from its six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Matrix([a, b, c, d, e, f])
    }

    /// An unscaled transform that only moves the origin to `(x, y)`.
    pub fn translate(x: f64, y: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, x, y])
    }

    /// The translation terms (the last two coefficients) as a point.
    ///
    /// # Examples
    ///
    /// ```
    /// use cert_oxide::geometry::Matrix;
    ///
    /// let tm = Matrix::new(8.0, 0.0, 0.0, 8.0, 45.355, 595.252);
    /// let origin = tm.translation();
    /// assert_eq!(origin.x, 45.355);
    /// assert_eq!(origin.y, 595.252);
    /// ```
    pub fn translation(&self) -> Point {
        Point::new(self.0[4], self.0[5])
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}

/// Check whether two coordinates are aligned within `tolerance` (inclusive).
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
