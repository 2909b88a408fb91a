use serde::{Deserialize, Serialize};

use crate::core::types::{Size, Vector2D, Viewport};

/// Single source of truth for the presenter's offsets and zoom factor.
///
/// Mutated only by completion reconciliation and the tracker's
/// `ValuesChanged` callback; every other path reads it to decide clamping
/// and no-op short-circuits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ViewState {
    pub zoomed_horizontal_offset: f64,
    pub zoomed_vertical_offset: f64,
    pub zoom_factor: f32,
    pub viewport: Viewport,
    pub content_extent: Size,
    pub min_zoom_factor: f32,
    pub max_zoom_factor: f32,
}

impl ViewState {
    pub fn new(viewport: Viewport, content_extent: Size) -> Self {
        Self {
            zoomed_horizontal_offset: 0.0,
            zoomed_vertical_offset: 0.0,
            zoom_factor: 1.0,
            viewport,
            content_extent,
            min_zoom_factor: 0.1,
            max_zoom_factor: 10.0,
        }
    }

    /// Loaded and laid out; requests made earlier return the no-op sentinel.
    pub fn is_ready(&self) -> bool {
        self.viewport.is_valid()
            && self.content_extent.is_valid()
            && self.content_extent.width > 0.0
            && self.content_extent.height > 0.0
    }

    pub fn offsets(&self) -> Vector2D {
        Vector2D::new(self.zoomed_horizontal_offset, self.zoomed_vertical_offset)
    }

    pub fn min_position(&self) -> Vector2D {
        Vector2D::ZERO
    }

    /// Derived from the unzoomed extent, viewport size, and zoom factor;
    /// callers re-read it after any of those change.
    pub fn max_position(&self) -> Vector2D {
        let zoom = f64::from(self.zoom_factor);
        Vector2D::new(
            (self.content_extent.width * zoom - f64::from(self.viewport.width)).max(0.0),
            (self.content_extent.height * zoom - f64::from(self.viewport.height)).max(0.0),
        )
    }

    pub fn clamp_offsets(&self, offsets: Vector2D) -> Vector2D {
        let min = self.min_position();
        let max = self.max_position();
        Vector2D::new(offsets.x.clamp(min.x, max.x), offsets.y.clamp(min.y, max.y))
    }

    pub fn clamp_zoom(&self, factor: f32) -> f32 {
        factor.clamp(self.min_zoom_factor, self.max_zoom_factor)
    }

    pub fn zoom_in_bounds(&self, factor: f32) -> bool {
        factor >= self.min_zoom_factor && factor <= self.max_zoom_factor
    }

    pub fn snapshot(&self) -> ViewStateSnapshot {
        ViewStateSnapshot {
            horizontal_offset: self.zoomed_horizontal_offset,
            vertical_offset: self.zoomed_vertical_offset,
            zoom_factor: self.zoom_factor,
            min_position: self.min_position(),
            max_position: self.max_position(),
        }
    }
}

/// Public read-only view of the authoritative state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewStateSnapshot {
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub zoom_factor: f32,
    pub min_position: Vector2D,
    pub max_position: Vector2D,
}

#[cfg(test)]
mod tests {
    use super::ViewState;
    use crate::core::types::{Size, Vector2D, Viewport};

    fn state() -> ViewState {
        ViewState::new(Viewport::new(100, 100), Size::new(500.0, 500.0))
    }

    #[test]
    fn max_position_tracks_zoom() {
        let mut view = state();
        assert_eq!(view.max_position(), Vector2D::new(400.0, 400.0));

        view.zoom_factor = 2.0;
        assert_eq!(view.max_position(), Vector2D::new(900.0, 900.0));

        // Content smaller than the viewport pins the max at zero.
        view.zoom_factor = 0.1;
        assert_eq!(view.max_position(), Vector2D::ZERO);
    }

    #[test]
    fn clamp_offsets_respects_bounds() {
        let view = state();
        let clamped = view.clamp_offsets(Vector2D::new(-50.0, 1000.0));
        assert_eq!(clamped, Vector2D::new(0.0, 400.0));
    }

    #[test]
    fn readiness_requires_viewport_and_extent() {
        let mut view = state();
        assert!(view.is_ready());
        view.viewport = Viewport::new(0, 100);
        assert!(!view.is_ready());
    }
}
