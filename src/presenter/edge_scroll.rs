//! Constant-rate scrolling driven by pointer proximity to the viewport
//! edges, typically used during drag-and-drop auto scrolling.

use tracing::debug;

use crate::core::types::{Point, Vector2D};
use crate::error::{ScrollError, ScrollResult};
use crate::presenter::ScrollingPresenter;
use crate::presenter::request::{ViewChangeRequest, ViewChangeTrigger};
use crate::tracker::InteractionTracker;

/// How far from each viewport edge the activation band extends and how fast
/// the content may move when the pointer is fully inside the band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeScrollConfig {
    /// Band depth from each viewport edge (px).
    pub activation_band: f64,
    /// Velocity at full band penetration (px/s).
    pub max_velocity: f64,
}

impl Default for EdgeScrollConfig {
    fn default() -> Self {
        Self {
            activation_band: 40.0,
            max_velocity: 600.0,
        }
    }
}

impl EdgeScrollConfig {
    pub fn validate(self) -> ScrollResult<Self> {
        if !self.activation_band.is_finite() || self.activation_band <= 0.0 {
            return Err(ScrollError::InvalidArgument(
                "edge scroll activation band must be finite and > 0".to_owned(),
            ));
        }
        if !self.max_velocity.is_finite() || self.max_velocity <= 0.0 {
            return Err(ScrollError::InvalidArgument(
                "edge scroll max velocity must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// One active edge-scroll gesture; at most one exists per presenter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeScrollSession {
    pub pointer_id: u32,
    pub config: EdgeScrollConfig,
    /// Last reported pointer position in viewport coordinates; `None` until
    /// the first update.
    pub pointer_position: Option<Point>,
    /// Velocity last submitted to the tracker, to avoid re-submitting
    /// unchanged motion every tick.
    pub last_velocity: Vector2D,
}

impl<T: InteractionTracker> ScrollingPresenter<T> {
    /// Begins tracking a pointer for edge scrolling. Replaces any session
    /// already in progress.
    pub fn start_edge_scroll_with_pointer(
        &mut self,
        pointer_id: u32,
        config: EdgeScrollConfig,
    ) -> ScrollResult<()> {
        let config = config.validate()?;
        if !self.is_ready() {
            return Err(ScrollError::InvalidArgument(
                "presenter is not ready for edge scrolling".to_owned(),
            ));
        }
        debug!(pointer_id, "edge scroll session started");
        self.edge_scroll = Some(EdgeScrollSession {
            pointer_id,
            config,
            pointer_position: None,
            last_velocity: Vector2D::ZERO,
        });
        Ok(())
    }

    /// Reports a new pointer position in viewport coordinates. Positions for
    /// pointers other than the session's are ignored.
    pub fn update_edge_scroll_pointer(&mut self, pointer_id: u32, position: Point) {
        if let Some(session) = &mut self.edge_scroll {
            if session.pointer_id == pointer_id && position.is_finite() {
                session.pointer_position = Some(position);
            }
        }
    }

    /// Ends the session and brings edge-driven motion to a stop.
    pub fn stop_edge_scroll_with_pointer(&mut self, pointer_id: u32) {
        let Some(session) = self.edge_scroll else {
            return;
        };
        if session.pointer_id != pointer_id {
            return;
        }
        debug!(pointer_id, "edge scroll session stopped");
        self.edge_scroll = None;
        if session.last_velocity != Vector2D::ZERO {
            self.submit_edge_velocity(Vector2D::ZERO);
        }
    }

    /// Evaluated once per compositor tick: maps band penetration to a
    /// per-axis velocity and submits it when it meaningfully changed.
    pub(super) fn tick_edge_scroll(&mut self) {
        let Some(session) = self.edge_scroll else {
            return;
        };
        let Some(position) = session.pointer_position else {
            return;
        };

        let mut velocity = Vector2D::new(
            edge_axis_velocity(
                position.x,
                f64::from(self.view.viewport.width),
                session.config,
            ),
            edge_axis_velocity(
                position.y,
                f64::from(self.view.viewport.height),
                session.config,
            ),
        );
        if velocity.x.abs() < self.tuning.min_impulse_velocity {
            velocity.x = 0.0;
        }
        if velocity.y.abs() < self.tuning.min_impulse_velocity {
            velocity.y = 0.0;
        }

        let epsilon = self.tuning.velocity_equality_epsilon;
        if (velocity.x - session.last_velocity.x).abs() <= epsilon
            && (velocity.y - session.last_velocity.y).abs() <= epsilon
        {
            return;
        }

        if let Some(session) = &mut self.edge_scroll {
            session.last_velocity = velocity;
        }
        self.submit_edge_velocity(velocity);
    }

    fn submit_edge_velocity(&mut self, velocity: Vector2D) {
        // Constant rate: a decay of one keeps the velocity until the next
        // update or stop.
        self.enqueue(
            ViewChangeRequest::ScrollWithVelocity {
                velocity,
                inertia_decay_per_second: Some(Vector2D::new(1.0, 1.0)),
            },
            ViewChangeTrigger::PointerEdgeScroll,
            0,
        );
    }
}

/// Penetration-proportional velocity for one axis: negative inside the
/// near-edge band, positive inside the far-edge band, zero between.
fn edge_axis_velocity(position: f64, viewport_length: f64, config: EdgeScrollConfig) -> f64 {
    let band = config.activation_band.min(viewport_length / 2.0);
    if position < band {
        let penetration = ((band - position) / band).clamp(0.0, 1.0);
        -config.max_velocity * penetration
    } else if position > viewport_length - band {
        let penetration = ((position - (viewport_length - band)) / band).clamp(0.0, 1.0);
        config.max_velocity * penetration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeScrollConfig, edge_axis_velocity};

    #[test]
    fn velocity_scales_with_band_penetration() {
        let config = EdgeScrollConfig::default();
        assert_eq!(edge_axis_velocity(200.0, 400.0, config), 0.0);
        assert_eq!(edge_axis_velocity(0.0, 400.0, config), -config.max_velocity);
        assert_eq!(
            edge_axis_velocity(400.0, 400.0, config),
            config.max_velocity
        );
        let half = edge_axis_velocity(20.0, 400.0, config);
        assert!((half + config.max_velocity / 2.0).abs() <= 1e-9);
    }

    #[test]
    fn band_is_capped_at_half_the_viewport() {
        let config = EdgeScrollConfig {
            activation_band: 500.0,
            max_velocity: 600.0,
        };
        // Both bands meet in the middle; the center is the only still point.
        assert_eq!(edge_axis_velocity(50.0, 100.0, config), 0.0);
        assert!(edge_axis_velocity(25.0, 100.0, config) < 0.0);
    }
}
