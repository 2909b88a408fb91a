//! 2D clip region supporting rectangle and convex-polygon representations.
//!
//! Clips start infinite, become rectangular through `set_rect`, and degenerate
//! into convex polygons once a non-scale/translate transform touches them.
//! Degeneration is one-directional: only `reset`/`set_rect`, or an
//! intersection that happens to produce exactly four axis-aligned points,
//! bring a clip back to the rectangular fast path.

use smallvec::SmallVec;

use crate::core::matrix::Matrix2D;
use crate::core::types::{Point, Rect};

/// Inline capacity covering the common rect-vs-rotated-rect intersections.
pub type PolygonPoints = SmallVec<[Point; 8]>;

const AREA_EPSILON: f64 = 1e-9;
const CONTAINMENT_EPSILON: f64 = 1e-9;
const AXIS_ALIGNED_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
enum ClipShape {
    Infinite,
    Rect(Rect),
    Polygon(PolygonPoints),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HwClip {
    shape: ClipShape,
}

impl Default for HwClip {
    fn default() -> Self {
        Self::infinite()
    }
}

impl HwClip {
    #[must_use]
    pub const fn infinite() -> Self {
        Self {
            shape: ClipShape::Infinite,
        }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            shape: ClipShape::Empty,
        }
    }

    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        if rect.is_empty() {
            return Self::empty();
        }
        Self {
            shape: ClipShape::Rect(rect),
        }
    }

    pub fn set_rect(&mut self, rect: Rect) {
        *self = Self::from_rect(rect);
    }

    pub fn reset(&mut self) {
        self.shape = ClipShape::Infinite;
    }

    #[must_use]
    pub fn is_infinite(&self) -> bool {
        matches!(self.shape, ClipShape::Infinite)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.shape, ClipShape::Empty)
    }

    #[must_use]
    pub fn is_rectilinear(&self) -> bool {
        matches!(self.shape, ClipShape::Rect(_))
    }

    /// Tight bounding rectangle; `None` for infinite or empty clips.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match &self.shape {
            ClipShape::Infinite | ClipShape::Empty => None,
            ClipShape::Rect(rect) => Some(*rect),
            ClipShape::Polygon(points) => point_bounds(points),
        }
    }

    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        match &self.shape {
            ClipShape::Infinite => true,
            ClipShape::Empty => false,
            ClipShape::Rect(rect) => rect.contains_point(point, CONTAINMENT_EPSILON),
            ClipShape::Polygon(points) => convex_contains(points, point),
        }
    }

    /// Transforms the clip in place.
    ///
    /// Scale/translate-only matrices keep rects rectangular; any other matrix
    /// degenerates the representation into a convex polygon.
    pub fn transform(&mut self, matrix: &Matrix2D) {
        match &mut self.shape {
            ClipShape::Infinite | ClipShape::Empty => {}
            ClipShape::Rect(rect) => {
                if matrix.is_scale_translate_only() {
                    let transformed = matrix.transform_rect(*rect);
                    self.shape = if transformed.is_empty() {
                        ClipShape::Empty
                    } else {
                        ClipShape::Rect(transformed)
                    };
                } else {
                    let points: PolygonPoints = rect
                        .corners()
                        .iter()
                        .map(|corner| matrix.transform_point(*corner))
                        .collect();
                    self.adopt_polygon(points);
                }
            }
            ClipShape::Polygon(points) => {
                let transformed: PolygonPoints = points
                    .iter()
                    .map(|point| matrix.transform_point(*point))
                    .collect();
                self.adopt_polygon(transformed);
            }
        }
    }

    /// Intersects `self` with `other` in place.
    ///
    /// Rect-with-rect stays rectangular; every other combination runs the
    /// convex polygon clipper.
    pub fn intersect(&mut self, other: &Self) {
        match (&self.shape, &other.shape) {
            (_, ClipShape::Infinite) => {}
            (ClipShape::Infinite, _) => {
                self.shape = other.shape.clone();
            }
            (ClipShape::Empty, _) | (_, ClipShape::Empty) => {
                self.shape = ClipShape::Empty;
            }
            (ClipShape::Rect(a), ClipShape::Rect(b)) => {
                self.shape = match a.intersect(*b) {
                    Some(rect) => ClipShape::Rect(rect),
                    None => ClipShape::Empty,
                };
            }
            _ => {
                let subject = self.polygon_points();
                let clip = other.polygon_points();
                let clipped = clip_convex_polygons(&subject, &clip);
                self.adopt_polygon(clipped);
                self.collapse_axis_aligned();
            }
        }
    }

    fn polygon_points(&self) -> PolygonPoints {
        match &self.shape {
            ClipShape::Rect(rect) => rect.corners().into_iter().collect(),
            ClipShape::Polygon(points) => points.clone(),
            ClipShape::Infinite | ClipShape::Empty => PolygonPoints::new(),
        }
    }

    /// Installs a polygon result, re-validating winding and convexity.
    ///
    /// Floating-point error can introduce spurious concavity after a
    /// transform or intersection; the convex hull recovers a valid polygon.
    fn adopt_polygon(&mut self, mut points: PolygonPoints) {
        points = dedup_consecutive(points);

        if points.len() < 3 || polygon_area(&points).abs() < AREA_EPSILON {
            self.shape = ClipShape::Empty;
            return;
        }

        ensure_counter_clockwise(&mut points);
        if !is_convex(&points) {
            points = convex_hull(&points);
            if points.len() < 3 || polygon_area(&points).abs() < AREA_EPSILON {
                self.shape = ClipShape::Empty;
                return;
            }
        }

        self.shape = ClipShape::Polygon(points);
    }

    /// Collapses an axis-aligned quad back to the rect fast path.
    ///
    /// Only intersection results may return to `Rect`; a transform that
    /// degenerated the clip keeps it a polygon even when the points happen
    /// to line up with the axes again.
    fn collapse_axis_aligned(&mut self) {
        if let ClipShape::Polygon(points) = &self.shape {
            if let Some(rect) = try_axis_aligned_rect(points) {
                self.shape = ClipShape::Rect(rect);
            }
        }
    }
}

fn dedup_consecutive(points: PolygonPoints) -> PolygonPoints {
    let mut result = PolygonPoints::new();
    for point in points {
        let duplicate = result.last().is_some_and(|last: &Point| {
            (last.x - point.x).abs() < AXIS_ALIGNED_EPSILON
                && (last.y - point.y).abs() < AXIS_ALIGNED_EPSILON
        });
        if !duplicate {
            result.push(point);
        }
    }
    if result.len() > 1 {
        let first = result[0];
        let last = result[result.len() - 1];
        if (first.x - last.x).abs() < AXIS_ALIGNED_EPSILON
            && (first.y - last.y).abs() < AXIS_ALIGNED_EPSILON
        {
            result.pop();
        }
    }
    result
}

/// Signed area, positive for counter-clockwise winding in y-down space.
fn polygon_area(points: &[Point]) -> f64 {
    let mut doubled = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        doubled += a.x * b.y - b.x * a.y;
    }
    doubled / 2.0
}

fn ensure_counter_clockwise(points: &mut PolygonPoints) {
    if polygon_area(points) < 0.0 {
        points.reverse();
    }
}

fn cross(origin: Point, a: Point, b: Point) -> f64 {
    (a.x - origin.x) * (b.y - origin.y) - (a.y - origin.y) * (b.x - origin.x)
}

fn is_convex(points: &[Point]) -> bool {
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let c = points[(i + 2) % points.len()];
        if cross(a, b, c) < -AREA_EPSILON {
            return false;
        }
    }
    true
}

fn convex_contains(points: &[Point], point: Point) -> bool {
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        if cross(a, b, point) < -CONTAINMENT_EPSILON {
            return false;
        }
    }
    true
}

/// Monotone-chain convex hull; output is counter-clockwise.
fn convex_hull(points: &[Point]) -> PolygonPoints {
    let mut sorted: PolygonPoints = points.iter().copied().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted = dedup_consecutive(sorted);
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: PolygonPoints = PolygonPoints::new();
    for point in &sorted {
        while lower.len() >= 2
            && cross(lower[lower.len() - 2], lower[lower.len() - 1], *point) <= 0.0
        {
            lower.pop();
        }
        lower.push(*point);
    }

    let mut upper: PolygonPoints = PolygonPoints::new();
    for point in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(upper[upper.len() - 2], upper[upper.len() - 1], *point) <= 0.0
        {
            upper.pop();
        }
        upper.push(*point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Sutherland-Hodgman clip of one convex polygon by another.
///
/// Both inputs are counter-clockwise; allocation stays bounded by the sum of
/// input vertex counts per pass.
fn clip_convex_polygons(subject: &[Point], clip: &[Point]) -> PolygonPoints {
    let mut output: PolygonPoints = subject.iter().copied().collect();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let edge_start = clip[i];
        let edge_end = clip[(i + 1) % clip.len()];

        let input = output;
        output = PolygonPoints::new();

        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            let current_inside = cross(edge_start, edge_end, current) >= -AREA_EPSILON;
            let previous_inside = cross(edge_start, edge_end, previous) >= -AREA_EPSILON;

            if current_inside {
                if !previous_inside {
                    if let Some(p) = line_intersection(previous, current, edge_start, edge_end) {
                        output.push(p);
                    }
                }
                output.push(current);
            } else if previous_inside {
                if let Some(p) = line_intersection(previous, current, edge_start, edge_end) {
                    output.push(p);
                }
            }
        }
    }

    output
}

fn line_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let da = Point::new(a2.x - a1.x, a2.y - a1.y);
    let db = Point::new(b2.x - b1.x, b2.y - b1.y);
    let denominator = da.x * db.y - da.y * db.x;
    if denominator.abs() < AREA_EPSILON {
        return None;
    }
    let t = ((b1.x - a1.x) * db.y - (b1.y - a1.y) * db.x) / denominator;
    Some(Point::new(a1.x + t * da.x, a1.y + t * da.y))
}

fn try_axis_aligned_rect(points: &[Point]) -> Option<Rect> {
    if points.len() != 4 {
        return None;
    }
    for i in 0..4 {
        let a = points[i];
        let b = points[(i + 1) % 4];
        let horizontal = (a.y - b.y).abs() < AXIS_ALIGNED_EPSILON;
        let vertical = (a.x - b.x).abs() < AXIS_ALIGNED_EPSILON;
        if !horizontal && !vertical {
            return None;
        }
    }
    point_bounds(points)
}

fn point_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let seed = Rect::new(first.x, first.y, 0.0, 0.0);
    Some(rest.iter().fold(seed, |acc, &point| acc.union_point(point)))
}
