//! Request intake: validation, readiness checks, no-op short-circuits, and
//! enqueue-time supersession.

use tracing::debug;

use crate::core::types::{Point, Vector2D};
use crate::error::{ScrollError, ScrollResult};
use crate::presenter::ScrollingPresenter;
use crate::presenter::events::ViewChangeCompletedEvent;
use crate::presenter::operation::{OperationState, PendingOperation};
use crate::presenter::request::{
    AnimationMode, ScrollOptions, ViewChangeAxis, ViewChangeId, ViewChangeRequest,
    ViewChangeResult, ViewChangeTrigger, ZoomOptions,
};
use crate::tracker::InteractionTracker;

impl<T: InteractionTracker> ScrollingPresenter<T> {
    /// Requests an absolute offset change.
    ///
    /// Returns the correlation id immediately; [`ViewChangeId::NOOP`] when
    /// the presenter is not yet loaded/laid out.
    pub fn scroll_to(
        &mut self,
        horizontal_offset: f64,
        vertical_offset: f64,
        options: ScrollOptions,
    ) -> ScrollResult<ViewChangeId> {
        validate_finite(horizontal_offset, "horizontal offset")?;
        validate_finite(vertical_offset, "vertical offset")?;
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        let target = self
            .view
            .clamp_offsets(Vector2D::new(horizontal_offset, vertical_offset));
        if self.short_circuit_offsets(target) {
            return Ok(self.complete_immediately(ViewChangeAxis::Offsets));
        }

        Ok(self.enqueue(
            ViewChangeRequest::ScrollTo {
                horizontal_offset,
                vertical_offset,
                options,
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Requests an offset change relative to the current authoritative view.
    pub fn scroll_by(
        &mut self,
        horizontal_delta: f64,
        vertical_delta: f64,
        options: ScrollOptions,
    ) -> ScrollResult<ViewChangeId> {
        validate_finite(horizontal_delta, "horizontal delta")?;
        validate_finite(vertical_delta, "vertical delta")?;
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        let target = self.view.clamp_offsets(Vector2D::new(
            self.view.zoomed_horizontal_offset + horizontal_delta,
            self.view.zoomed_vertical_offset + vertical_delta,
        ));
        if self.short_circuit_offsets(target) {
            return Ok(self.complete_immediately(ViewChangeAxis::Offsets));
        }

        Ok(self.enqueue(
            ViewChangeRequest::ScrollBy {
                horizontal_delta,
                vertical_delta,
                options,
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Starts an inertial scroll with the given absolute velocity.
    ///
    /// Velocities below the minimum effective impulse are rejected.
    pub fn scroll_from(
        &mut self,
        velocity: Vector2D,
        inertia_decay_per_second: Option<Vector2D>,
    ) -> ScrollResult<ViewChangeId> {
        self.validate_scroll_velocity(velocity, inertia_decay_per_second)?;
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        Ok(self.enqueue(
            ViewChangeRequest::ScrollWithVelocity {
                velocity,
                inertia_decay_per_second,
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Scrolls at a constant rate until superseded or stopped.
    pub fn scroll_with(&mut self, velocity: Vector2D) -> ScrollResult<ViewChangeId> {
        self.validate_scroll_velocity(velocity, None)?;
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        Ok(self.enqueue(
            ViewChangeRequest::ScrollWithVelocity {
                velocity,
                inertia_decay_per_second: Some(Vector2D::new(1.0, 1.0)),
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Requests an absolute zoom-factor change around `center` (viewport
    /// center when `None`).
    ///
    /// Factors outside the configured zoom bounds fail synchronously; they
    /// are never clamped silently.
    pub fn zoom_to(
        &mut self,
        factor: f32,
        center: Option<Point>,
        options: ZoomOptions,
    ) -> ScrollResult<ViewChangeId> {
        validate_zoom_factor(factor)?;
        validate_center(center)?;
        if !self.view.zoom_in_bounds(factor) {
            return Err(ScrollError::InvalidArgument(format!(
                "zoom factor {factor} outside [{}, {}]",
                self.view.min_zoom_factor, self.view.max_zoom_factor
            )));
        }
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        if self.short_circuit_zoom(factor) {
            return Ok(self.complete_immediately(ViewChangeAxis::Zoom));
        }

        Ok(self.enqueue(
            ViewChangeRequest::ZoomTo {
                factor,
                center,
                options,
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Requests an additive zoom-factor delta; the target is clamped to the
    /// zoom bounds at dequeue.
    pub fn zoom_by(
        &mut self,
        delta: f32,
        center: Option<Point>,
        options: ZoomOptions,
    ) -> ScrollResult<ViewChangeId> {
        validate_zoom_factor(delta)?;
        validate_center(center)?;
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        let target = self.view.clamp_zoom(self.view.zoom_factor + delta);
        if self.short_circuit_zoom(target) {
            return Ok(self.complete_immediately(ViewChangeAxis::Zoom));
        }

        Ok(self.enqueue(
            ViewChangeRequest::ZoomBy {
                delta,
                center,
                options,
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Starts an inertial zoom with the given velocity (factor change per
    /// second).
    pub fn zoom_from(
        &mut self,
        velocity: f32,
        center: Option<Point>,
        inertia_decay_per_second: Option<f32>,
    ) -> ScrollResult<ViewChangeId> {
        if !velocity.is_finite() || velocity == 0.0 {
            return Err(ScrollError::InvalidArgument(
                "zoom velocity must be finite and non-zero".to_owned(),
            ));
        }
        validate_center(center)?;
        if let Some(decay) = inertia_decay_per_second {
            if !decay.is_finite() || !(0.0..=1.0).contains(&decay) {
                return Err(ScrollError::InvalidArgument(
                    "zoom inertia decay must be finite and within [0, 1]".to_owned(),
                ));
            }
        }
        if !self.is_ready() {
            return Ok(ViewChangeId::NOOP);
        }

        Ok(self.enqueue(
            ViewChangeRequest::ZoomWithVelocity {
                velocity,
                center,
                inertia_decay_per_second,
            },
            ViewChangeTrigger::DirectRequest,
            0,
        ))
    }

    /// Translates coalesced wheel input into impulse requests.
    ///
    /// A settle delay of a few ticks lets bursts of wheel deltas merge into
    /// one tracker submission.
    pub fn on_pointer_wheel(
        &mut self,
        delta_lines: f64,
        zoom_modifier: bool,
    ) -> ScrollResult<ViewChangeId> {
        validate_finite(delta_lines, "wheel delta")?;
        if !self.is_ready() || delta_lines == 0.0 {
            return Ok(ViewChangeId::NOOP);
        }

        let settle_ticks = self.tuning.impulse_settle_ticks;
        let request = if zoom_modifier {
            ViewChangeRequest::ZoomWithAdditionalVelocity {
                velocity: delta_lines as f32 * self.tuning.wheel_zoom_velocity_factor,
                center: None,
                inertia_decay_per_second: None,
            }
        } else {
            ViewChangeRequest::ScrollWithAdditionalVelocity {
                velocity: Vector2D::new(
                    0.0,
                    delta_lines * self.tuning.wheel_scroll_velocity_factor,
                ),
                inertia_decay_per_second: None,
            }
        };

        Ok(self.enqueue(request, ViewChangeTrigger::MouseWheel, settle_ticks))
    }

    /// Completes every queued and dequeued operation with `Interrupted`, in
    /// enqueue order. Used on unload.
    pub fn cancel_all_operations(&mut self) {
        for index in 0..self.operations.len() {
            if self.operations[index].is_outstanding() {
                self.complete_operation_at(index, ViewChangeResult::Interrupted);
            }
        }
        self.prune_completed();
    }

    fn validate_scroll_velocity(
        &self,
        velocity: Vector2D,
        inertia_decay_per_second: Option<Vector2D>,
    ) -> ScrollResult<()> {
        if !velocity.is_finite() {
            return Err(ScrollError::InvalidArgument(
                "scroll velocity must be finite".to_owned(),
            ));
        }
        if velocity.magnitude() < self.tuning.min_impulse_velocity {
            return Err(ScrollError::InvalidArgument(format!(
                "scroll velocity magnitude below minimum effective impulse {}",
                self.tuning.min_impulse_velocity
            )));
        }
        if let Some(decay) = inertia_decay_per_second {
            if !decay.is_finite()
                || !(0.0..=1.0).contains(&decay.x)
                || !(0.0..=1.0).contains(&decay.y)
            {
                return Err(ScrollError::InvalidArgument(
                    "inertia decay must be finite and within [0, 1] per axis".to_owned(),
                ));
            }
        }
        Ok(())
    }

    fn short_circuit_offsets(&self, target: Vector2D) -> bool {
        let epsilon = self.tuning.offset_equality_epsilon;
        (target.x - self.view.zoomed_horizontal_offset).abs() <= epsilon
            && (target.y - self.view.zoomed_vertical_offset).abs() <= epsilon
            && !self.has_outstanding(ViewChangeAxis::Offsets)
    }

    fn short_circuit_zoom(&self, target: f32) -> bool {
        (target - self.view.zoom_factor).abs() <= self.tuning.zoom_factor_equality_epsilon
            && !self.has_outstanding(ViewChangeAxis::Zoom)
    }

    fn has_outstanding(&self, axis: ViewChangeAxis) -> bool {
        self.operations
            .iter()
            .any(|op| op.is_outstanding() && op.axis() == axis)
    }

    /// A request already satisfied by the authoritative state completes
    /// synchronously without touching the tracker.
    fn complete_immediately(&mut self, axis: ViewChangeAxis) -> ViewChangeId {
        let id = self.allocate_correlation_id();
        debug!(correlation_id = id.raw(), "view change satisfied by current view");
        let event = ViewChangeCompletedEvent {
            correlation_id: id,
            result: ViewChangeResult::Completed,
        };
        match axis {
            ViewChangeAxis::Offsets => self.scroll_completed.emit(&event),
            ViewChangeAxis::Zoom => self.zoom_completed.emit(&event),
        }
        id
    }

    pub(super) fn allocate_correlation_id(&mut self) -> ViewChangeId {
        let id = self.next_correlation_id;
        self.next_correlation_id = id.next();
        id
    }

    /// Appends an operation, superseding merge-compatible predecessors.
    ///
    /// A queued (never dispatched) velocity impulse folds its velocity into
    /// the replacement so coalesced input is not lost.
    pub(super) fn enqueue(
        &mut self,
        mut request: ViewChangeRequest,
        trigger: ViewChangeTrigger,
        ticks_countdown: u32,
    ) -> ViewChangeId {
        for index in 0..self.operations.len() {
            if !self.operations[index].is_superseded_by(&request, trigger) {
                continue;
            }
            if self.operations[index].state == OperationState::Queued {
                fold_queued_velocity(&self.operations[index].request, &mut request);
            }
            debug!(
                superseded = self.operations[index].id.raw(),
                "operation superseded by newer request"
            );
            self.complete_operation_at(index, ViewChangeResult::Interrupted);
        }

        let id = self.allocate_correlation_id();
        let animated = resolve_animated(&request, trigger);
        debug!(
            correlation_id = id.raw(),
            ?trigger,
            animated,
            ticks_countdown,
            "view change enqueued"
        );
        self.operations.push(PendingOperation::new(
            id,
            request,
            trigger,
            animated,
            ticks_countdown,
        ));
        self.prune_completed();
        id
    }

    /// Completes an operation from a presenter-side decision (supersession,
    /// cancellation, a displacing dispatch, interaction takeover). The
    /// tracker may still report on the request, so its id is retired and a
    /// late event for it is dropped.
    pub(super) fn complete_operation_at(&mut self, index: usize, result: ViewChangeResult) {
        self.finish_operation_at(index, result, true);
    }

    /// Completes an operation in response to its terminal tracker event.
    /// Nothing can report on the request afterwards, so nothing is retired.
    pub(super) fn settle_operation_at(&mut self, index: usize, result: ViewChangeResult) {
        self.finish_operation_at(index, result, false);
    }

    fn finish_operation_at(&mut self, index: usize, result: ViewChangeResult, retire: bool) {
        let (event, axis) = {
            let op = &mut self.operations[index];
            if op.state == OperationState::Completed {
                return;
            }
            op.state = OperationState::Completed;
            op.result = Some(result);
            if let Some(request_id) = op.request_id {
                self.dequeued_requests.swap_remove(&request_id);
                if retire {
                    self.retired_requests.insert(request_id);
                }
            }
            (
                ViewChangeCompletedEvent {
                    correlation_id: op.id,
                    result,
                },
                op.axis(),
            )
        };

        debug!(
            correlation_id = event.correlation_id.raw(),
            result = ?event.result,
            "view change completed"
        );
        match axis {
            ViewChangeAxis::Offsets => self.scroll_completed.emit(&event),
            ViewChangeAxis::Zoom => self.zoom_completed.emit(&event),
        }
    }

    pub(super) fn prune_completed(&mut self) {
        self.operations
            .retain(|op| op.state != OperationState::Completed);
    }
}

/// Animation-mode resolution: velocity requests always run as inertia;
/// `Auto` animates for deliberate requests and jumps for synthesized input.
fn resolve_animated(request: &ViewChangeRequest, trigger: ViewChangeTrigger) -> bool {
    if request.kind().is_velocity_based() {
        return true;
    }
    let animation = match request {
        ViewChangeRequest::ScrollTo { options, .. } | ViewChangeRequest::ScrollBy { options, .. } => {
            options.animation
        }
        ViewChangeRequest::ZoomTo { options, .. } | ViewChangeRequest::ZoomBy { options, .. } => {
            options.animation
        }
        _ => AnimationMode::Auto,
    };
    match animation {
        AnimationMode::Enabled => true,
        AnimationMode::Disabled => false,
        AnimationMode::Auto => !matches!(
            trigger,
            ViewChangeTrigger::MouseWheel | ViewChangeTrigger::PointerEdgeScroll
        ),
    }
}

/// Merges the velocity of a queued impulse into its replacement.
fn fold_queued_velocity(old: &ViewChangeRequest, new: &mut ViewChangeRequest) {
    match (old, new) {
        (
            ViewChangeRequest::ScrollWithAdditionalVelocity {
                velocity: old_velocity,
                ..
            },
            ViewChangeRequest::ScrollWithAdditionalVelocity { velocity, .. },
        ) => {
            *velocity = velocity.add(*old_velocity);
        }
        (
            ViewChangeRequest::ZoomWithAdditionalVelocity {
                velocity: old_velocity,
                ..
            },
            ViewChangeRequest::ZoomWithAdditionalVelocity { velocity, .. },
        ) => {
            *velocity += *old_velocity;
        }
        _ => {}
    }
}

fn validate_finite(value: f64, field_name: &str) -> ScrollResult<()> {
    crate::core::types::ensure_finite(value, field_name).map(|_| ())
}

fn validate_zoom_factor(factor: f32) -> ScrollResult<()> {
    if !factor.is_finite() {
        return Err(ScrollError::InvalidArgument(
            "zoom factor must be finite".to_owned(),
        ));
    }
    Ok(())
}

fn validate_center(center: Option<Point>) -> ScrollResult<()> {
    if let Some(center) = center {
        if !center.is_finite() {
            return Err(ScrollError::InvalidArgument(
                "zoom center point must be finite".to_owned(),
            ));
        }
    }
    Ok(())
}
