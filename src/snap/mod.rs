//! Snap points: user-declared offset/zoom values the view comes to rest at
//! when inertia settles nearby.
//!
//! One ordered-set abstraction serves all three dimensions (horizontal
//! scroll, vertical scroll, zoom); zoom factors are widened to `f64` at the
//! boundary. Each point owns an applicable range; ranges are recomputed on
//! every mutation and on viewport changes so neighboring points never
//! overlap.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{ScrollError, ScrollResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SnapPoint {
    /// A single resting value, optionally limited to an explicit range.
    Irregular {
        value: f64,
        applicable_range: Option<(f64, f64)>,
    },
    /// Evenly spaced resting values `offset + k * interval` inside
    /// `[start, end]`.
    Repeated {
        offset: f64,
        interval: f64,
        start: f64,
        end: f64,
    },
}

impl SnapPoint {
    pub fn validate(self) -> ScrollResult<Self> {
        match self {
            Self::Irregular {
                value,
                applicable_range,
            } => {
                if !value.is_finite() {
                    return Err(ScrollError::InvalidArgument(
                        "snap point value must be finite".to_owned(),
                    ));
                }
                if let Some((start, end)) = applicable_range {
                    if !start.is_finite() || !end.is_finite() || start > value || end < value {
                        return Err(ScrollError::InvalidArgument(
                            "snap point applicable range must be finite and contain the value"
                                .to_owned(),
                        ));
                    }
                }
                Ok(self)
            }
            Self::Repeated {
                offset,
                interval,
                start,
                end,
            } => {
                if !offset.is_finite() || !start.is_finite() || !end.is_finite() {
                    return Err(ScrollError::InvalidArgument(
                        "repeated snap point bounds must be finite".to_owned(),
                    ));
                }
                if !interval.is_finite() || interval <= 0.0 {
                    return Err(ScrollError::InvalidArgument(
                        "repeated snap point interval must be finite and > 0".to_owned(),
                    ));
                }
                if start >= end {
                    return Err(ScrollError::InvalidArgument(
                        "repeated snap point start must be < end".to_owned(),
                    ));
                }
                Ok(self)
            }
        }
    }

    /// Key establishing the set ordering.
    #[must_use]
    pub fn comparison_key(self) -> OrderedFloat<f64> {
        match self {
            Self::Irregular { value, .. } => OrderedFloat(value),
            Self::Repeated { start, .. } => OrderedFloat(start),
        }
    }

    /// Interval of values this point can produce.
    fn anchor_interval(self) -> (f64, f64) {
        match self {
            Self::Irregular { value, .. } => (value, value),
            Self::Repeated { start, end, .. } => (start, end),
        }
    }

    fn explicit_range(self) -> Option<(f64, f64)> {
        match self {
            Self::Irregular {
                applicable_range, ..
            } => applicable_range,
            Self::Repeated { start, end, .. } => Some((start, end)),
        }
    }

    /// The resting value this point resolves `natural` to.
    fn resolve(self, natural: f64) -> f64 {
        match self {
            Self::Irregular { value, .. } => value,
            Self::Repeated {
                offset,
                interval,
                start,
                end,
            } => {
                let clamped = natural.clamp(start, end);
                let k = ((clamped - offset) / interval).round();
                (offset + k * interval).clamp(start, end)
            }
        }
    }
}

/// A snap point plus its computed application range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapPointWrapper {
    pub point: SnapPoint,
    pub applicable_start: f64,
    pub applicable_end: f64,
}

/// Ordered set of snap points for one dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapPointSet {
    wrappers: Vec<SnapPointWrapper>,
    bounds: Option<(f64, f64)>,
}

impl SnapPointSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    #[must_use]
    pub fn wrappers(&self) -> &[SnapPointWrapper] {
        &self.wrappers
    }

    /// Inserts a point, replacing any existing point with the same
    /// comparison key.
    pub fn insert(&mut self, point: SnapPoint) -> ScrollResult<()> {
        let point = point.validate()?;
        let key = point.comparison_key();
        self.wrappers
            .retain(|wrapper| wrapper.point.comparison_key() != key);
        self.wrappers.push(SnapPointWrapper {
            point,
            applicable_start: f64::NEG_INFINITY,
            applicable_end: f64::INFINITY,
        });
        self.recompute_applicable_ranges();
        Ok(())
    }

    /// Removes the point with a matching comparison key.
    pub fn remove(&mut self, point: &SnapPoint) -> bool {
        let key = point.comparison_key();
        let before = self.wrappers.len();
        self.wrappers
            .retain(|wrapper| wrapper.point.comparison_key() != key);
        let removed = self.wrappers.len() != before;
        if removed {
            self.recompute_applicable_ranges();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.wrappers.clear();
    }

    /// Constrains application ranges to the scrollable bounds; called when
    /// viewport or extent changes.
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        self.bounds = Some((min, max));
        self.recompute_applicable_ranges();
    }

    /// Resolves the inertia resting value for a natural resting position.
    ///
    /// Returns `natural` unchanged when no snap point's range applies.
    #[must_use]
    pub fn resting_value_for(&self, natural: f64) -> f64 {
        for wrapper in &self.wrappers {
            if natural >= wrapper.applicable_start && natural <= wrapper.applicable_end {
                return wrapper.point.resolve(natural);
            }
        }
        natural
    }

    /// Neighbor-midpoint range assignment over the sorted points, narrowed by
    /// any explicit ranges and the scrollable bounds.
    fn recompute_applicable_ranges(&mut self) {
        self.wrappers
            .sort_by_key(|wrapper| wrapper.point.comparison_key());

        let (lower_bound, upper_bound) = self
            .bounds
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));

        let anchors: Vec<(f64, f64)> = self
            .wrappers
            .iter()
            .map(|wrapper| wrapper.point.anchor_interval())
            .collect();

        for (index, wrapper) in self.wrappers.iter_mut().enumerate() {
            let mut start = if index == 0 {
                lower_bound
            } else {
                let previous_end = anchors[index - 1].1;
                (previous_end + anchors[index].0) / 2.0
            };
            let mut end = if index + 1 == anchors.len() {
                upper_bound
            } else {
                let next_start = anchors[index + 1].0;
                (anchors[index].1 + next_start) / 2.0
            };

            if let Some((explicit_start, explicit_end)) = wrapper.point.explicit_range() {
                start = start.max(explicit_start);
                end = end.min(explicit_end);
            }

            wrapper.applicable_start = start;
            wrapper.applicable_end = end;
        }
    }
}
