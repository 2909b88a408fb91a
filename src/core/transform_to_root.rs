//! Flattened node-to-root transform accumulator.
//!
//! Stays on a cheap 2D affine path until a non-affine projection frame is
//! appended, then promotes itself to a full 4x4 product for the rest of its
//! life. Used for rasterization-scale and hit-testing computations.

use crate::core::matrix::{Matrix2D, Matrix4x4};
use crate::core::transform_stack::TransformAndClipFrame;
use crate::core::types::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformToRoot {
    matrix_2d: Matrix2D,
    matrix_4x4: Option<Matrix4x4>,
}

impl Default for TransformToRoot {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformToRoot {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            matrix_2d: Matrix2D::identity(),
            matrix_4x4: None,
        }
    }

    #[must_use]
    pub fn is_2d(&self) -> bool {
        self.matrix_4x4.is_none()
    }

    /// Appends one frame on the root side of the accumulated transform.
    pub fn append_frame(&mut self, frame: &TransformAndClipFrame) {
        self.append_matrix(frame.transform);
        if let Some(projection) = frame.projection {
            match projection.to_matrix2d() {
                Some(affine) => self.append_matrix(affine),
                None => self.append_projection(projection),
            }
        }
    }

    pub fn append_matrix(&mut self, matrix: Matrix2D) {
        match &mut self.matrix_4x4 {
            Some(combined) => {
                *combined = combined.multiply(&Matrix4x4::from_matrix2d(matrix));
            }
            None => {
                self.matrix_2d = self.matrix_2d.multiply(&matrix);
            }
        }
    }

    pub fn append_projection(&mut self, projection: Matrix4x4) {
        let combined = match self.matrix_4x4 {
            Some(existing) => existing.multiply(&projection),
            None => Matrix4x4::from_matrix2d(self.matrix_2d).multiply(&projection),
        };
        self.matrix_4x4 = Some(combined);
    }

    /// The accumulated 2D affine part when no projection was appended.
    #[must_use]
    pub fn to_matrix2d(&self) -> Option<Matrix2D> {
        match self.matrix_4x4 {
            Some(combined) => combined.to_matrix2d(),
            None => Some(self.matrix_2d),
        }
    }

    /// Horizontal/vertical scale magnitudes for rasterization decisions.
    ///
    /// For projective transforms this reports the scale of the affine part,
    /// which is the scale at the projection plane.
    #[must_use]
    pub fn scale_dimensions(&self) -> (f64, f64) {
        match self.matrix_4x4 {
            Some(combined) => {
                let m11 = combined.m[0][0];
                let m12 = combined.m[0][1];
                let m21 = combined.m[1][0];
                let m22 = combined.m[1][1];
                (m11.hypot(m12), m21.hypot(m22))
            }
            None => self.matrix_2d.scale_dimensions(),
        }
    }

    /// Returns `None` when the point lands at or behind the eye.
    #[must_use]
    pub fn transform_point(&self, point: Point) -> Option<Point> {
        match self.matrix_4x4 {
            Some(combined) => combined.transform_point(point),
            None => Some(self.matrix_2d.transform_point(point)),
        }
    }

    /// Bounds of the transformed rect; `None` when any corner projects
    /// behind the eye.
    #[must_use]
    pub fn transform_rect_bounds(&self, rect: Rect) -> Option<Rect> {
        if self.matrix_4x4.is_none() {
            return Some(self.matrix_2d.transform_rect(rect));
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for corner in rect.corners() {
            let projected = self.transform_point(corner)?;
            min_x = min_x.min(projected.x);
            min_y = min_y.min(projected.y);
            max_x = max_x.max(projected.x);
            max_y = max_y.max(projected.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

#[cfg(test)]
mod tests {
    use super::TransformToRoot;
    use crate::core::matrix::{Matrix2D, Matrix4x4};
    use crate::core::types::{Point, Rect};

    #[test]
    fn stays_2d_for_affine_appends() {
        let mut accumulator = TransformToRoot::identity();
        accumulator.append_matrix(Matrix2D::scaling(2.0, 3.0));
        accumulator.append_matrix(Matrix2D::translation(10.0, 20.0));
        assert!(accumulator.is_2d());

        let p = accumulator
            .transform_point(Point::new(1.0, 1.0))
            .expect("2d path never rejects");
        assert_eq!((p.x, p.y), (12.0, 23.0));
        assert_eq!(accumulator.scale_dimensions(), (2.0, 3.0));
    }

    #[test]
    fn projection_promotes_to_4x4_permanently() {
        let mut accumulator = TransformToRoot::identity();
        accumulator.append_projection(Matrix4x4::perspective(500.0));
        assert!(!accumulator.is_2d());

        // Affine appends after promotion keep the 4x4 path.
        accumulator.append_matrix(Matrix2D::translation(5.0, 0.0));
        assert!(!accumulator.is_2d());
        assert!(accumulator.to_matrix2d().is_none());
    }

    #[test]
    fn affine_projection_frame_flattens_to_2d_math() {
        let mut accumulator = TransformToRoot::identity();
        accumulator.append_projection(Matrix4x4::from_matrix2d(Matrix2D::translation(7.0, 0.0)));
        // Promoted representation, but the math is still affine.
        let flattened = accumulator.to_matrix2d().expect("affine 4x4");
        assert_eq!(flattened, Matrix2D::translation(7.0, 0.0));
    }

    #[test]
    fn rect_bounds_match_2d_transform() {
        let mut accumulator = TransformToRoot::identity();
        accumulator.append_matrix(Matrix2D::scaling(2.0, 2.0));
        let bounds = accumulator
            .transform_rect_bounds(Rect::new(1.0, 1.0, 4.0, 4.0))
            .expect("bounded");
        assert_eq!(bounds, Rect::new(2.0, 2.0, 8.0, 8.0));
    }
}
