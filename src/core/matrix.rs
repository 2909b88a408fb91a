//! Affine and projective matrices used by the transform/clip walk.
//!
//! `Matrix2D` uses the row-vector convention: `p' = p * M`, so composing
//! `a.multiply(&b)` applies `a` first, then `b`.

use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Rect};

const DETERMINANT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix2D {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix2D {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            dx: 0.0,
            dy: 0.0,
        }
    }

    #[must_use]
    pub const fn translation(dx: f64, dy: f64) -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            dx,
            dy,
        }
    }

    #[must_use]
    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            m11: sx,
            m12: 0.0,
            m21: 0.0,
            m22: sy,
            dx: 0.0,
            dy: 0.0,
        }
    }

    #[must_use]
    pub fn rotation(angle_radians: f64) -> Self {
        let (sin, cos) = angle_radians.sin_cos();
        Self {
            m11: cos,
            m12: sin,
            m21: -sin,
            m22: cos,
            dx: 0.0,
            dy: 0.0,
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.m11.is_finite()
            && self.m12.is_finite()
            && self.m21.is_finite()
            && self.m22.is_finite()
            && self.dx.is_finite()
            && self.dy.is_finite()
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::identity()
    }

    /// True when the matrix has no rotation or shear component.
    ///
    /// Rect clips stay rects under such matrices; anything else degenerates
    /// them into polygons.
    #[must_use]
    pub fn is_scale_translate_only(self) -> bool {
        self.m12 == 0.0 && self.m21 == 0.0
    }

    /// Applies `self` first, then `other`.
    #[must_use]
    pub fn multiply(self, other: &Self) -> Self {
        Self {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            dx: self.dx * other.m11 + self.dy * other.m21 + other.dx,
            dy: self.dx * other.m12 + self.dy * other.m22 + other.dy,
        }
    }

    #[must_use]
    pub fn transform_point(self, point: Point) -> Point {
        Point::new(
            point.x * self.m11 + point.y * self.m21 + self.dx,
            point.x * self.m12 + point.y * self.m22 + self.dy,
        )
    }

    /// Exact for scale/translate matrices, tight bounds otherwise.
    #[must_use]
    pub fn transform_rect(self, rect: Rect) -> Rect {
        if self.is_scale_translate_only() {
            let a = self.transform_point(Point::new(rect.x, rect.y));
            let b = self.transform_point(Point::new(rect.right(), rect.bottom()));
            return Rect::from_corners(a, b);
        }

        let corners = rect.corners().map(|corner| self.transform_point(corner));
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for corner in corners {
            min_x = min_x.min(corner.x);
            min_y = min_y.min(corner.y);
            max_x = max_x.max(corner.x);
            max_y = max_y.max(corner.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Returns `None` for singular matrices.
    #[must_use]
    pub fn invert(self) -> Option<Self> {
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        if det.abs() < DETERMINANT_EPSILON {
            return None;
        }

        Some(Self {
            m11: self.m22 / det,
            m12: -self.m12 / det,
            m21: -self.m21 / det,
            m22: self.m11 / det,
            dx: (self.m21 * self.dy - self.m22 * self.dx) / det,
            dy: (self.m12 * self.dx - self.m11 * self.dy) / det,
        })
    }

    /// Horizontal and vertical scale magnitudes, used for rasterization-scale
    /// decisions.
    #[must_use]
    pub fn scale_dimensions(self) -> (f64, f64) {
        (self.m11.hypot(self.m12), self.m21.hypot(self.m22))
    }
}

/// Row-major 4x4 matrix for projection frames, row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4x4 {
    pub m: [[f64; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4x4 {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// CSS-style perspective with the vanishing point at `depth` on +z.
    #[must_use]
    pub fn perspective(depth: f64) -> Self {
        let mut result = Self::identity();
        if depth != 0.0 {
            result.m[2][3] = -1.0 / depth;
        }
        result
    }

    #[must_use]
    pub fn from_matrix2d(matrix: Matrix2D) -> Self {
        let mut result = Self::identity();
        result.m[0][0] = matrix.m11;
        result.m[0][1] = matrix.m12;
        result.m[1][0] = matrix.m21;
        result.m[1][1] = matrix.m22;
        result.m[3][0] = matrix.dx;
        result.m[3][1] = matrix.dy;
        result
    }

    /// Applies `self` first, then `other`.
    #[must_use]
    pub fn multiply(self, other: &Self) -> Self {
        let mut result = [[0.0; 4]; 4];
        for (row, result_row) in result.iter_mut().enumerate() {
            for (col, cell) in result_row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[row][k] * other.m[k][col]).sum();
            }
        }
        Self { m: result }
    }

    /// True when z-plane points map without any perspective contribution, so
    /// the matrix collapses losslessly to its 2D affine part.
    #[must_use]
    pub fn is_affine_2d(self) -> bool {
        self.m[0][3] == 0.0 && self.m[1][3] == 0.0 && self.m[3][3] == 1.0
    }

    #[must_use]
    pub fn to_matrix2d(self) -> Option<Matrix2D> {
        if !self.is_affine_2d() {
            return None;
        }
        Some(Matrix2D {
            m11: self.m[0][0],
            m12: self.m[0][1],
            m21: self.m[1][0],
            m22: self.m[1][1],
            dx: self.m[3][0],
            dy: self.m[3][1],
        })
    }

    /// Transforms a z=0 point with perspective divide.
    ///
    /// Returns `None` for points at or behind the eye (non-positive `w`).
    #[must_use]
    pub fn transform_point(self, point: Point) -> Option<Point> {
        let x = point.x * self.m[0][0] + point.y * self.m[1][0] + self.m[3][0];
        let y = point.x * self.m[0][1] + point.y * self.m[1][1] + self.m[3][1];
        let w = point.x * self.m[0][3] + point.y * self.m[1][3] + self.m[3][3];
        if w <= DETERMINANT_EPSILON {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }
}

#[cfg(test)]
mod tests {
    use super::{Matrix2D, Matrix4x4};
    use crate::core::types::{Point, Rect};

    #[test]
    fn multiply_applies_left_operand_first() {
        let scale = Matrix2D::scaling(2.0, 2.0);
        let translate = Matrix2D::translation(10.0, 0.0);

        let scale_then_translate = scale.multiply(&translate);
        let p = scale_then_translate.transform_point(Point::new(1.0, 1.0));
        assert_eq!((p.x, p.y), (12.0, 2.0));

        let translate_then_scale = translate.multiply(&scale);
        let p = translate_then_scale.transform_point(Point::new(1.0, 1.0));
        assert_eq!((p.x, p.y), (22.0, 2.0));
    }

    #[test]
    fn invert_round_trips_points() {
        let matrix = Matrix2D::rotation(0.7)
            .multiply(&Matrix2D::scaling(3.0, 0.5))
            .multiply(&Matrix2D::translation(-4.0, 9.0));
        let inverse = matrix.invert().expect("invertible");

        let original = Point::new(12.5, -3.25);
        let round_tripped = inverse.transform_point(matrix.transform_point(original));
        assert!((round_tripped.x - original.x).abs() <= 1e-9);
        assert!((round_tripped.y - original.y).abs() <= 1e-9);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix2D::scaling(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn transform_rect_scale_translate_is_exact() {
        let matrix = Matrix2D::scaling(2.0, 3.0).multiply(&Matrix2D::translation(1.0, 1.0));
        let rect = matrix.transform_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(rect, Rect::new(1.0, 1.0, 20.0, 30.0));
    }

    #[test]
    fn rotation_scale_dimensions_are_unit() {
        let (sx, sy) = Matrix2D::rotation(1.1).scale_dimensions();
        assert!((sx - 1.0).abs() <= 1e-12);
        assert!((sy - 1.0).abs() <= 1e-12);
    }

    #[test]
    fn matrix4x4_embeds_and_flattens_affine_2d() {
        let affine = Matrix2D::rotation(0.3).multiply(&Matrix2D::translation(5.0, -2.0));
        let embedded = Matrix4x4::from_matrix2d(affine);
        assert!(embedded.is_affine_2d());
        assert_eq!(embedded.to_matrix2d().expect("affine"), affine);
    }

    #[test]
    fn perspective_divides_by_w() {
        let projection = Matrix4x4::perspective(100.0);
        assert!(!projection.is_affine_2d());
        // z=0 points are unaffected by a pure perspective matrix.
        let p = projection
            .transform_point(Point::new(10.0, 20.0))
            .expect("in front of eye");
        assert!((p.x - 10.0).abs() <= 1e-12);
        assert!((p.y - 20.0).abs() <= 1e-12);
    }
}
