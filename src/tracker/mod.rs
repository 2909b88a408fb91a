//! Boundary toward the platform interaction tracker.
//!
//! The presenter assigns every dequeued operation a request id, hands the
//! tracker a command carrying it, and later receives serialized events tagged
//! with the same id. Real compositor integrations implement
//! [`InteractionTracker`]; [`SimTracker`] is the deterministic in-crate
//! implementation used by tests and headless hosts.

mod sim;

pub use sim::SimTracker;

use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Vector2D};

/// Identifies one dequeued operation as submitted to the tracker.
///
/// Distinct from the caller-visible correlation id: one correlation id may be
/// retried under multiple request ids.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackerCommand {
    JumpToOffsets {
        request_id: RequestId,
        position: Vector2D,
    },
    AnimateToOffsets {
        request_id: RequestId,
        position: Vector2D,
    },
    /// Layers additional velocity onto whatever motion is in flight.
    AddOffsetsVelocity {
        request_id: RequestId,
        velocity: Vector2D,
        /// Fraction of velocity remaining after one second, per axis.
        inertia_decay_per_second: Vector2D,
    },
    JumpToZoom {
        request_id: RequestId,
        factor: f32,
        center: Point,
    },
    AnimateToZoom {
        request_id: RequestId,
        factor: f32,
        center: Point,
    },
    AddZoomVelocity {
        request_id: RequestId,
        velocity: f32,
        center: Point,
        inertia_decay_per_second: f32,
    },
}

impl TrackerCommand {
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        match *self {
            Self::JumpToOffsets { request_id, .. }
            | Self::AnimateToOffsets { request_id, .. }
            | Self::AddOffsetsVelocity { request_id, .. }
            | Self::JumpToZoom { request_id, .. }
            | Self::AnimateToZoom { request_id, .. }
            | Self::AddZoomVelocity { request_id, .. } => request_id,
        }
    }
}

/// Serialized tracker callback delivered back on the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackerEvent {
    ValuesChanged {
        position: Vector2D,
        zoom_factor: f32,
        request_id: Option<RequestId>,
    },
    /// The platform declined the request, typically because a direct
    /// manipulation is already in progress.
    RequestIgnored { request_id: RequestId },
    InteractingStateEntered,
    InertiaStateEntered { request_id: Option<RequestId> },
    IdleStateEntered { request_id: Option<RequestId> },
    CustomAnimationStateEntered { request_id: Option<RequestId> },
}

/// Platform primitive running physics-based position/scale animation.
///
/// All methods are synchronous; results arrive later as [`TrackerEvent`]s the
/// host forwards to the presenter.
pub trait InteractionTracker {
    fn submit(&mut self, command: TrackerCommand);

    /// Currently measured position velocity, used to layer impulses without
    /// visible jumps.
    fn position_velocity(&self) -> Vector2D;

    fn zoom_velocity(&self) -> f32 {
        0.0
    }

    /// Hands an active pointer over for direct manipulation, the path a
    /// scroll controller thumb uses to start a drag. Returns `false` when
    /// the platform cannot redirect the pointer.
    fn try_redirect_interaction(&mut self, pointer_id: u32) -> bool {
        let _ = pointer_id;
        false
    }
}
