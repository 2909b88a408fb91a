//! Glue for external scroll controllers (scroll bars, panning indicators)
//! that drive a single dimension.

use tracing::debug;

use crate::core::types::Vector2D;
use crate::error::{ScrollError, ScrollResult};
use crate::presenter::ScrollingPresenter;
use crate::presenter::request::{
    ScrollOptions, ViewChangeId, ViewChangeRequest, ViewChangeTrigger,
};
use crate::tracker::InteractionTracker;

/// The single axis a scroll controller operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDimension {
    Horizontal,
    Vertical,
}

/// One-dimensional request raised by an attached scroll controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollControllerRequest {
    /// The controller's thumb captured a pointer and wants the tracker to
    /// run the drag as a direct manipulation.
    InteractionRequested { pointer_id: u32 },
    ScrollTo {
        offset: f64,
        options: ScrollOptions,
    },
    ScrollBy {
        delta: f64,
        options: ScrollOptions,
    },
    ScrollFrom {
        velocity: f64,
        inertia_decay_per_second: Option<f64>,
    },
}

impl<T: InteractionTracker> ScrollingPresenter<T> {
    /// Maps a controller's one-dimensional request onto the two-dimensional
    /// queue; the uncontrolled axis keeps its current offset and motion.
    ///
    /// Controller requests displace synthesized edge scrolling on the same
    /// axis, exactly as direct requests do.
    pub fn on_scroll_controller_request(
        &mut self,
        dimension: ScrollDimension,
        request: ScrollControllerRequest,
    ) -> ScrollResult<ViewChangeId> {
        if let ScrollControllerRequest::InteractionRequested { pointer_id } = request {
            if self.is_ready() {
                let redirected = self.tracker.try_redirect_interaction(pointer_id);
                debug!(pointer_id, redirected, "controller requested direct manipulation");
            }
            return Ok(ViewChangeId::NOOP);
        }
        let request = self.widen_controller_request(dimension, request)?;
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }
        Ok(self.enqueue(request, ViewChangeTrigger::ScrollController, 0))
    }

    fn widen_controller_request(
        &self,
        dimension: ScrollDimension,
        request: ScrollControllerRequest,
    ) -> ScrollResult<ViewChangeRequest> {
        match request {
            // Dispatched to the tracker before widening; it carries no view
            // change of its own.
            ScrollControllerRequest::InteractionRequested { .. } => {
                Err(ScrollError::InvalidArgument(
                    "interaction requests carry no view change".to_owned(),
                ))
            }
            ScrollControllerRequest::ScrollTo { offset, options } => {
                if !offset.is_finite() {
                    return Err(ScrollError::InvalidArgument(
                        "controller offset must be finite".to_owned(),
                    ));
                }
                let (horizontal_offset, vertical_offset) = match dimension {
                    ScrollDimension::Horizontal => (offset, self.view.zoomed_vertical_offset),
                    ScrollDimension::Vertical => (self.view.zoomed_horizontal_offset, offset),
                };
                Ok(ViewChangeRequest::ScrollTo {
                    horizontal_offset,
                    vertical_offset,
                    options,
                })
            }
            ScrollControllerRequest::ScrollBy { delta, options } => {
                if !delta.is_finite() {
                    return Err(ScrollError::InvalidArgument(
                        "controller delta must be finite".to_owned(),
                    ));
                }
                let (horizontal_delta, vertical_delta) = match dimension {
                    ScrollDimension::Horizontal => (delta, 0.0),
                    ScrollDimension::Vertical => (0.0, delta),
                };
                Ok(ViewChangeRequest::ScrollBy {
                    horizontal_delta,
                    vertical_delta,
                    options,
                })
            }
            ScrollControllerRequest::ScrollFrom {
                velocity,
                inertia_decay_per_second,
            } => {
                if !velocity.is_finite() {
                    return Err(ScrollError::InvalidArgument(
                        "controller velocity must be finite".to_owned(),
                    ));
                }
                if velocity.abs() < self.tuning.min_impulse_velocity {
                    return Err(ScrollError::InvalidArgument(format!(
                        "controller velocity below minimum effective impulse {}",
                        self.tuning.min_impulse_velocity
                    )));
                }
                if let Some(decay) = inertia_decay_per_second {
                    if !decay.is_finite() || !(0.0..=1.0).contains(&decay) {
                        return Err(ScrollError::InvalidArgument(
                            "controller inertia decay must be finite and within [0, 1]".to_owned(),
                        ));
                    }
                }
                let velocity = match dimension {
                    ScrollDimension::Horizontal => Vector2D::new(velocity, 0.0),
                    ScrollDimension::Vertical => Vector2D::new(0.0, velocity),
                };
                let inertia_decay_per_second =
                    inertia_decay_per_second.map(|decay| Vector2D::new(decay, decay));
                Ok(ViewChangeRequest::ScrollWithVelocity {
                    velocity,
                    inertia_decay_per_second,
                })
            }
        }
    }
}
