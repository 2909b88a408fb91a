//! Deterministic interaction-tracker double.
//!
//! Physics are intentionally simple: animations halve the remaining distance
//! per step and inertia decays exponentially, so tests can drive the tracker
//! with explicit `step` calls and assert exact event sequences.

use crate::core::types::{Point, Vector2D};
use crate::tracker::{InteractionTracker, RequestId, TrackerCommand, TrackerEvent};

const ANIMATION_LANDING_EPSILON: f64 = 0.5;
const STOP_VELOCITY_ABS: f64 = 1.0;
const STOP_ZOOM_VELOCITY_ABS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SimPhase {
    Idle,
    AnimatingOffsets {
        request_id: RequestId,
        target: Vector2D,
    },
    AnimatingZoom {
        request_id: RequestId,
        target: f32,
        center: Point,
    },
    Inertia {
        request_id: Option<RequestId>,
    },
    Interacting,
}

#[derive(Debug)]
pub struct SimTracker {
    position: Vector2D,
    zoom_factor: f32,
    velocity: Vector2D,
    zoom_velocity: f32,
    inertia_decay: Vector2D,
    zoom_inertia_decay: f32,
    zoom_center: Point,
    min_position: Vector2D,
    max_position: Vector2D,
    phase: SimPhase,
    pending: Vec<TrackerEvent>,
    submitted: Vec<TrackerCommand>,
}

impl Default for SimTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SimTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vector2D::ZERO,
            zoom_factor: 1.0,
            velocity: Vector2D::ZERO,
            zoom_velocity: 0.0,
            inertia_decay: Vector2D::new(0.85, 0.85),
            zoom_inertia_decay: 0.85,
            zoom_center: Point::ZERO,
            min_position: Vector2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            max_position: Vector2D::new(f64::INFINITY, f64::INFINITY),
            phase: SimPhase::Idle,
            pending: Vec::new(),
            submitted: Vec::new(),
        }
    }

    pub fn set_bounds(&mut self, min_position: Vector2D, max_position: Vector2D) {
        self.min_position = min_position;
        self.max_position = max_position;
    }

    #[must_use]
    pub fn position(&self) -> Vector2D {
        self.position
    }

    #[must_use]
    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, SimPhase::Idle)
    }

    /// Every command submitted so far, in order.
    #[must_use]
    pub fn submitted_commands(&self) -> &[TrackerCommand] {
        &self.submitted
    }

    /// Simulates the user grabbing the view; subsequent submissions are
    /// refused with `RequestIgnored` until the interaction ends.
    pub fn begin_interaction(&mut self) {
        self.velocity = Vector2D::ZERO;
        self.zoom_velocity = 0.0;
        self.phase = SimPhase::Interacting;
        self.pending.push(TrackerEvent::InteractingStateEntered);
    }

    /// Ends a direct manipulation, optionally releasing into inertia.
    pub fn end_interaction(&mut self, release_velocity: Vector2D) {
        if release_velocity.magnitude() > STOP_VELOCITY_ABS {
            self.velocity = release_velocity;
            self.phase = SimPhase::Inertia { request_id: None };
            self.pending
                .push(TrackerEvent::InertiaStateEntered { request_id: None });
        } else {
            self.phase = SimPhase::Idle;
            self.pending
                .push(TrackerEvent::IdleStateEntered { request_id: None });
        }
    }

    /// Moves the view as if the user dragged it while interacting.
    pub fn drag_to(&mut self, position: Vector2D) {
        self.position = self.clamp_position(position);
        self.pending.push(TrackerEvent::ValuesChanged {
            position: self.position,
            zoom_factor: self.zoom_factor,
            request_id: None,
        });
    }

    /// Advances the simulation and returns every event produced so far.
    pub fn step(&mut self, delta_seconds: f64) -> Vec<TrackerEvent> {
        match self.phase {
            SimPhase::Idle | SimPhase::Interacting => {}
            SimPhase::AnimatingOffsets { request_id, target } => {
                let remaining = Vector2D::new(
                    target.x - self.position.x,
                    target.y - self.position.y,
                );
                if remaining.magnitude() <= ANIMATION_LANDING_EPSILON {
                    self.position = target;
                    self.emit_values_changed(Some(request_id));
                    self.enter_idle(Some(request_id));
                } else {
                    self.position = self.clamp_position(Vector2D::new(
                        self.position.x + remaining.x / 2.0,
                        self.position.y + remaining.y / 2.0,
                    ));
                    self.emit_values_changed(Some(request_id));
                }
            }
            SimPhase::AnimatingZoom {
                request_id,
                target,
                center,
            } => {
                let remaining = target - self.zoom_factor;
                if f64::from(remaining.abs()) <= f64::from(STOP_ZOOM_VELOCITY_ABS) {
                    self.apply_zoom(target, center);
                    self.emit_values_changed(Some(request_id));
                    self.enter_idle(Some(request_id));
                } else {
                    self.apply_zoom(self.zoom_factor + remaining / 2.0, center);
                    self.emit_values_changed(Some(request_id));
                }
            }
            SimPhase::Inertia { request_id } => {
                self.position = self.clamp_position(Vector2D::new(
                    self.position.x + self.velocity.x * delta_seconds,
                    self.position.y + self.velocity.y * delta_seconds,
                ));
                if self.zoom_velocity != 0.0 {
                    let factor = self.zoom_factor + self.zoom_velocity * delta_seconds as f32;
                    self.apply_zoom(factor, self.zoom_center);
                }

                self.velocity = Vector2D::new(
                    self.velocity.x * self.inertia_decay.x.powf(delta_seconds),
                    self.velocity.y * self.inertia_decay.y.powf(delta_seconds),
                );
                self.zoom_velocity *= self.zoom_inertia_decay.powf(delta_seconds as f32);

                self.emit_values_changed(request_id);

                if self.velocity.magnitude() < STOP_VELOCITY_ABS
                    && self.zoom_velocity.abs() < STOP_ZOOM_VELOCITY_ABS
                {
                    self.velocity = Vector2D::ZERO;
                    self.zoom_velocity = 0.0;
                    self.enter_idle(request_id);
                }
            }
        }

        std::mem::take(&mut self.pending)
    }

    fn enter_idle(&mut self, request_id: Option<RequestId>) {
        self.phase = SimPhase::Idle;
        self.pending
            .push(TrackerEvent::IdleStateEntered { request_id });
    }

    fn emit_values_changed(&mut self, request_id: Option<RequestId>) {
        self.pending.push(TrackerEvent::ValuesChanged {
            position: self.position,
            zoom_factor: self.zoom_factor,
            request_id,
        });
    }

    fn clamp_position(&self, position: Vector2D) -> Vector2D {
        Vector2D::new(
            position.x.clamp(self.min_position.x, self.max_position.x),
            position.y.clamp(self.min_position.y, self.max_position.y),
        )
    }

    /// Rescales around `center`, keeping the center point visually fixed.
    fn apply_zoom(&mut self, factor: f32, center: Point) {
        let previous = f64::from(self.zoom_factor);
        let next = f64::from(factor);
        if previous > 0.0 && next > 0.0 {
            let ratio = next / previous;
            self.position = self.clamp_position(Vector2D::new(
                (self.position.x + center.x) * ratio - center.x,
                (self.position.y + center.y) * ratio - center.y,
            ));
        }
        self.zoom_factor = factor;
    }
}

impl InteractionTracker for SimTracker {
    fn submit(&mut self, command: TrackerCommand) {
        self.submitted.push(command);

        if matches!(self.phase, SimPhase::Interacting) {
            self.pending.push(TrackerEvent::RequestIgnored {
                request_id: command.request_id(),
            });
            return;
        }

        match command {
            TrackerCommand::JumpToOffsets {
                request_id,
                position,
            } => {
                self.velocity = Vector2D::ZERO;
                self.position = self.clamp_position(position);
                self.emit_values_changed(Some(request_id));
                self.enter_idle(Some(request_id));
            }
            TrackerCommand::AnimateToOffsets {
                request_id,
                position,
            } => {
                self.velocity = Vector2D::ZERO;
                self.phase = SimPhase::AnimatingOffsets {
                    request_id,
                    target: self.clamp_position(position),
                };
                self.pending.push(TrackerEvent::CustomAnimationStateEntered {
                    request_id: Some(request_id),
                });
            }
            TrackerCommand::AddOffsetsVelocity {
                request_id,
                velocity,
                inertia_decay_per_second,
            } => {
                self.velocity = self.velocity.add(velocity);
                self.inertia_decay = inertia_decay_per_second;
                self.phase = SimPhase::Inertia {
                    request_id: Some(request_id),
                };
                self.pending.push(TrackerEvent::InertiaStateEntered {
                    request_id: Some(request_id),
                });
            }
            TrackerCommand::JumpToZoom {
                request_id,
                factor,
                center,
            } => {
                self.zoom_velocity = 0.0;
                self.apply_zoom(factor, center);
                self.emit_values_changed(Some(request_id));
                self.enter_idle(Some(request_id));
            }
            TrackerCommand::AnimateToZoom {
                request_id,
                factor,
                center,
            } => {
                self.zoom_velocity = 0.0;
                self.phase = SimPhase::AnimatingZoom {
                    request_id,
                    target: factor,
                    center,
                };
                self.pending.push(TrackerEvent::CustomAnimationStateEntered {
                    request_id: Some(request_id),
                });
            }
            TrackerCommand::AddZoomVelocity {
                request_id,
                velocity,
                center,
                inertia_decay_per_second,
            } => {
                self.zoom_velocity += velocity;
                self.zoom_inertia_decay = inertia_decay_per_second;
                self.zoom_center = center;
                self.phase = SimPhase::Inertia {
                    request_id: Some(request_id),
                };
                self.pending.push(TrackerEvent::InertiaStateEntered {
                    request_id: Some(request_id),
                });
            }
        }
    }

    fn position_velocity(&self) -> Vector2D {
        self.velocity
    }

    fn zoom_velocity(&self) -> f32 {
        self.zoom_velocity
    }

    fn try_redirect_interaction(&mut self, _pointer_id: u32) -> bool {
        if !matches!(self.phase, SimPhase::Interacting) {
            self.begin_interaction();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::SimTracker;
    use crate::core::types::Vector2D;
    use crate::tracker::{InteractionTracker, TrackerCommand, TrackerEvent};

    #[test]
    fn jump_reports_values_then_idle() {
        let mut tracker = SimTracker::new();
        tracker.submit(TrackerCommand::JumpToOffsets {
            request_id: 7,
            position: Vector2D::new(100.0, 50.0),
        });

        let events = tracker.step(0.016);
        assert_eq!(
            events,
            vec![
                TrackerEvent::ValuesChanged {
                    position: Vector2D::new(100.0, 50.0),
                    zoom_factor: 1.0,
                    request_id: Some(7),
                },
                TrackerEvent::IdleStateEntered { request_id: Some(7) },
            ]
        );
    }

    #[test]
    fn animation_converges_to_target() {
        let mut tracker = SimTracker::new();
        tracker.submit(TrackerCommand::AnimateToOffsets {
            request_id: 1,
            position: Vector2D::new(64.0, 0.0),
        });

        let mut idle = false;
        for _ in 0..32 {
            for event in tracker.step(0.016) {
                if matches!(event, TrackerEvent::IdleStateEntered { request_id: Some(1) }) {
                    idle = true;
                }
            }
            if idle {
                break;
            }
        }
        assert!(idle);
        assert_eq!(tracker.position(), Vector2D::new(64.0, 0.0));
    }

    #[test]
    fn inertia_decays_and_settles() {
        let mut tracker = SimTracker::new();
        tracker.set_bounds(Vector2D::ZERO, Vector2D::new(10_000.0, 10_000.0));
        tracker.submit(TrackerCommand::AddOffsetsVelocity {
            request_id: 3,
            velocity: Vector2D::new(200.0, 0.0),
            inertia_decay_per_second: Vector2D::new(0.05, 0.05),
        });

        let mut idle = false;
        for _ in 0..600 {
            for event in tracker.step(0.016) {
                if matches!(event, TrackerEvent::IdleStateEntered { request_id: Some(3) }) {
                    idle = true;
                }
            }
            if idle {
                break;
            }
        }
        assert!(idle);
        assert!(tracker.position().x > 0.0);
        assert_eq!(tracker.position_velocity(), Vector2D::ZERO);
    }

    #[test]
    fn submissions_during_interaction_are_ignored() {
        let mut tracker = SimTracker::new();
        tracker.begin_interaction();
        tracker.submit(TrackerCommand::JumpToOffsets {
            request_id: 9,
            position: Vector2D::new(10.0, 0.0),
        });

        let events = tracker.step(0.016);
        assert!(events.contains(&TrackerEvent::InteractingStateEntered));
        assert!(events.contains(&TrackerEvent::RequestIgnored { request_id: 9 }));
        assert_eq!(tracker.position(), Vector2D::ZERO);
    }
}
