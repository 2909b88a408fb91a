//! Per-frame pump: countdown bookkeeping and the FIFO dequeue pass that
//! turns queued operations into tracker commands.

use tracing::debug;

use crate::core::types::{Point, Vector2D};
use crate::presenter::ScrollingPresenter;
use crate::presenter::operation::OperationState;
use crate::presenter::request::{SnapPointsMode, ViewChangeAxis, ViewChangeRequest};
use crate::presenter::tuning::{anticipated_resting_delta, velocity_for_resting_delta};
use crate::tracker::{InteractionTracker, RequestId, TrackerCommand};

impl<T: InteractionTracker> ScrollingPresenter<T> {
    /// Runs one compositor frame: advances edge scrolling, counts down
    /// settle delays, and dispatches eligible operations to the tracker.
    ///
    /// Dispatching an operation redirects the tracker, so a live animated
    /// operation on the same axis completes with `Interrupted` first; it
    /// would never reach its target. Jumps already executed atomically and
    /// settle through their own idle event.
    pub fn on_compositor_tick(&mut self) {
        self.tick_edge_scroll();

        for op in &mut self.operations {
            if op.state == OperationState::Queued && op.ticks_countdown > 0 {
                op.ticks_countdown -= 1;
            }
        }

        for index in 0..self.operations.len() {
            let op = &self.operations[index];
            if op.state != OperationState::Queued || op.ticks_countdown > 0 {
                continue;
            }

            let axis = op.axis();
            for live_index in self.live_animated_indices(axis) {
                self.complete_operation_at(
                    live_index,
                    crate::presenter::request::ViewChangeResult::Interrupted,
                );
            }
            self.dequeue_operation(index);
        }

        self.prune_completed();
    }

    fn live_animated_indices(&self, axis: ViewChangeAxis) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.is_live() && op.is_animated && op.axis() == axis)
            .map(|(index, _)| index)
            .collect();
        indices.sort_by_key(|&index| self.operations[index].dequeue_sequence);
        indices
    }

    fn dequeue_operation(&mut self, index: usize) {
        let request_id = self.allocate_request_id();
        let sequence = self.next_dequeue_sequence;
        self.next_dequeue_sequence += 1;

        let command = self.build_command(index, request_id);
        {
            let op = &mut self.operations[index];
            op.state = OperationState::Dequeued;
            op.request_id = Some(request_id);
            op.dequeue_sequence = Some(sequence);
        }
        let correlation_id = self.operations[index].id;
        self.dequeued_requests.insert(request_id, correlation_id);

        debug!(
            correlation_id = correlation_id.raw(),
            request_id, "operation dispatched to tracker"
        );
        self.tracker.submit(command);
    }

    fn allocate_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Translates a request into its tracker command, applying clamping,
    /// snap-point resolution, and velocity shaping at dispatch time so the
    /// freshest view state is used.
    fn build_command(&mut self, index: usize, request_id: RequestId) -> TrackerCommand {
        let op = &self.operations[index];
        let animated = op.is_animated;
        match op.request {
            ViewChangeRequest::ScrollTo {
                horizontal_offset,
                vertical_offset,
                options,
            } => {
                let target = self
                    .view
                    .clamp_offsets(Vector2D::new(horizontal_offset, vertical_offset));
                let position = self.snap_offsets(target, animated, options.snap_points);
                if animated {
                    TrackerCommand::AnimateToOffsets {
                        request_id,
                        position,
                    }
                } else {
                    TrackerCommand::JumpToOffsets {
                        request_id,
                        position,
                    }
                }
            }
            ViewChangeRequest::ScrollBy {
                horizontal_delta,
                vertical_delta,
                options,
            } => {
                let target = self.view.clamp_offsets(Vector2D::new(
                    self.view.zoomed_horizontal_offset + horizontal_delta,
                    self.view.zoomed_vertical_offset + vertical_delta,
                ));
                let position = self.snap_offsets(target, animated, options.snap_points);
                if animated {
                    TrackerCommand::AnimateToOffsets {
                        request_id,
                        position,
                    }
                } else {
                    TrackerCommand::JumpToOffsets {
                        request_id,
                        position,
                    }
                }
            }
            ViewChangeRequest::ScrollWithVelocity {
                velocity,
                inertia_decay_per_second,
            } => {
                let decay = self.offsets_decay(inertia_decay_per_second);
                let combined = self.shape_offsets_velocity(velocity, decay);
                let measured = self.tracker.position_velocity();
                TrackerCommand::AddOffsetsVelocity {
                    request_id,
                    velocity: Vector2D::new(combined.x - measured.x, combined.y - measured.y),
                    inertia_decay_per_second: decay,
                }
            }
            ViewChangeRequest::ScrollWithAdditionalVelocity {
                velocity,
                inertia_decay_per_second,
            } => {
                let decay = self.offsets_decay(inertia_decay_per_second);
                let measured = self.tracker.position_velocity();
                let combined = self.shape_offsets_velocity(
                    Vector2D::new(measured.x + velocity.x, measured.y + velocity.y),
                    decay,
                );
                TrackerCommand::AddOffsetsVelocity {
                    request_id,
                    velocity: Vector2D::new(combined.x - measured.x, combined.y - measured.y),
                    inertia_decay_per_second: decay,
                }
            }
            ViewChangeRequest::ZoomTo {
                factor,
                center,
                options,
            } => {
                let target = self.view.clamp_zoom(factor);
                let factor = self.snap_zoom(target, animated, options.snap_points);
                let center = self.zoom_center(center);
                if animated {
                    TrackerCommand::AnimateToZoom {
                        request_id,
                        factor,
                        center,
                    }
                } else {
                    TrackerCommand::JumpToZoom {
                        request_id,
                        factor,
                        center,
                    }
                }
            }
            ViewChangeRequest::ZoomBy {
                delta,
                center,
                options,
            } => {
                let target = self.view.clamp_zoom(self.view.zoom_factor + delta);
                let factor = self.snap_zoom(target, animated, options.snap_points);
                let center = self.zoom_center(center);
                if animated {
                    TrackerCommand::AnimateToZoom {
                        request_id,
                        factor,
                        center,
                    }
                } else {
                    TrackerCommand::JumpToZoom {
                        request_id,
                        factor,
                        center,
                    }
                }
            }
            ViewChangeRequest::ZoomWithVelocity {
                velocity,
                center,
                inertia_decay_per_second,
            } => {
                let decay = self.zoom_decay(inertia_decay_per_second);
                let combined = self.shape_zoom_velocity(velocity, decay);
                let measured = self.tracker.zoom_velocity();
                TrackerCommand::AddZoomVelocity {
                    request_id,
                    velocity: combined - measured,
                    center: self.zoom_center(center),
                    inertia_decay_per_second: decay,
                }
            }
            ViewChangeRequest::ZoomWithAdditionalVelocity {
                velocity,
                center,
                inertia_decay_per_second,
            } => {
                let decay = self.zoom_decay(inertia_decay_per_second);
                let measured = self.tracker.zoom_velocity();
                let combined = self.shape_zoom_velocity(measured + velocity, decay);
                TrackerCommand::AddZoomVelocity {
                    request_id,
                    velocity: combined - measured,
                    center: self.zoom_center(center),
                    inertia_decay_per_second: decay,
                }
            }
        }
    }

    /// Snap points only steer animated resting values; jumps land exactly
    /// where asked.
    fn snap_offsets(&self, target: Vector2D, animated: bool, mode: SnapPointsMode) -> Vector2D {
        if !animated || mode == SnapPointsMode::Ignore {
            return target;
        }
        Vector2D::new(
            self.horizontal_snap_points.resting_value_for(target.x),
            self.vertical_snap_points.resting_value_for(target.y),
        )
    }

    fn snap_zoom(&self, target: f32, animated: bool, mode: SnapPointsMode) -> f32 {
        if !animated || mode == SnapPointsMode::Ignore {
            return target;
        }
        self.zoom_snap_points.resting_value_for(f64::from(target)) as f32
    }

    fn offsets_decay(&self, requested: Option<Vector2D>) -> Vector2D {
        requested.unwrap_or_else(|| {
            Vector2D::new(
                self.tuning.inertia_decay_per_second,
                self.tuning.inertia_decay_per_second,
            )
        })
    }

    fn zoom_decay(&self, requested: Option<f32>) -> f32 {
        requested.unwrap_or(self.tuning.inertia_decay_per_second as f32)
    }

    /// Shapes a combined inertia velocity so its anticipated resting offsets
    /// land on the clamped, snap-resolved position. Constant-rate motion
    /// (decay outside (0, 1)) has no resting position and passes through.
    fn shape_offsets_velocity(&self, combined: Vector2D, decay: Vector2D) -> Vector2D {
        let current = self.view.offsets();
        let min = self.view.min_position();
        let max = self.view.max_position();

        let shape_axis = |velocity: f64,
                          decay: f64,
                          current: f64,
                          min: f64,
                          max: f64,
                          snap: &crate::snap::SnapPointSet| {
            match anticipated_resting_delta(velocity, decay) {
                Some(delta) => {
                    let natural = (current + delta).clamp(min, max);
                    let resting = snap.resting_value_for(natural);
                    velocity_for_resting_delta(resting - current, decay).unwrap_or(velocity)
                }
                None => velocity,
            }
        };

        Vector2D::new(
            shape_axis(
                combined.x,
                decay.x,
                current.x,
                min.x,
                max.x,
                &self.horizontal_snap_points,
            ),
            shape_axis(
                combined.y,
                decay.y,
                current.y,
                min.y,
                max.y,
                &self.vertical_snap_points,
            ),
        )
    }

    fn shape_zoom_velocity(&self, combined: f32, decay: f32) -> f32 {
        match anticipated_resting_delta(f64::from(combined), f64::from(decay)) {
            Some(delta) => {
                let natural = self
                    .view
                    .clamp_zoom((f64::from(self.view.zoom_factor) + delta) as f32);
                let resting = self.zoom_snap_points.resting_value_for(f64::from(natural));
                velocity_for_resting_delta(
                    resting - f64::from(self.view.zoom_factor),
                    f64::from(decay),
                )
                .map_or(combined, |v| v as f32)
            }
            None => combined,
        }
    }

    fn zoom_center(&self, requested: Option<Point>) -> Point {
        requested.unwrap_or_else(|| self.view.viewport.center())
    }
}
