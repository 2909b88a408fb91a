use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Vector2D};

/// Caller-visible identifier for one queued view change.
///
/// Monotonically increasing per presenter instance; appears in exactly one
/// completion event once the request is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewChangeId(i64);

impl ViewChangeId {
    /// Sentinel returned when the presenter is not ready; no completion event
    /// is ever raised for it.
    pub const NOOP: Self = Self(-1);

    #[must_use]
    pub(crate) fn first() -> Self {
        Self(1)
    }

    #[must_use]
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn raw(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn is_noop(self) -> bool {
        self == Self::NOOP
    }
}

/// Terminal result carried by a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewChangeResult {
    Completed,
    /// Superseded by a newer request or cut short by user interaction.
    Interrupted,
    /// The platform tracker declined the request.
    Ignored,
}

/// Origin of a request; determines merge and cancellation eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewChangeTrigger {
    DirectRequest,
    MouseWheel,
    PointerEdgeScroll,
    ScrollController,
    ImplicitAnimation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnimationMode {
    /// Animate unless the trigger prefers an immediate jump.
    #[default]
    Auto,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SnapPointsMode {
    /// Resting values are routed through the dimension's snap points.
    #[default]
    Default,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScrollOptions {
    pub animation: AnimationMode,
    pub snap_points: SnapPointsMode,
}

impl ScrollOptions {
    #[must_use]
    pub fn new(animation: AnimationMode) -> Self {
        Self {
            animation,
            snap_points: SnapPointsMode::Default,
        }
    }

    #[must_use]
    pub fn with_snap_points(mut self, snap_points: SnapPointsMode) -> Self {
        self.snap_points = snap_points;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ZoomOptions {
    pub animation: AnimationMode,
    pub snap_points: SnapPointsMode,
}

impl ZoomOptions {
    #[must_use]
    pub fn new(animation: AnimationMode) -> Self {
        Self {
            animation,
            snap_points: SnapPointsMode::Default,
        }
    }

    #[must_use]
    pub fn with_snap_points(mut self, snap_points: SnapPointsMode) -> Self {
        self.snap_points = snap_points;
        self
    }
}

/// The operation-type axis a request drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewChangeAxis {
    Offsets,
    Zoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewChangeKind {
    AbsoluteOffset,
    RelativeOffset,
    OffsetWithVelocity,
    OffsetWithAdditionalVelocity,
    AbsoluteZoom,
    RelativeZoom,
    ZoomWithVelocity,
    ZoomWithAdditionalVelocity,
}

impl ViewChangeKind {
    #[must_use]
    pub fn axis(self) -> ViewChangeAxis {
        match self {
            Self::AbsoluteOffset
            | Self::RelativeOffset
            | Self::OffsetWithVelocity
            | Self::OffsetWithAdditionalVelocity => ViewChangeAxis::Offsets,
            Self::AbsoluteZoom
            | Self::RelativeZoom
            | Self::ZoomWithVelocity
            | Self::ZoomWithAdditionalVelocity => ViewChangeAxis::Zoom,
        }
    }

    #[must_use]
    pub fn is_velocity_based(self) -> bool {
        matches!(
            self,
            Self::OffsetWithVelocity
                | Self::OffsetWithAdditionalVelocity
                | Self::ZoomWithVelocity
                | Self::ZoomWithAdditionalVelocity
        )
    }
}

/// One view-change request; immutable once queued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewChangeRequest {
    ScrollTo {
        horizontal_offset: f64,
        vertical_offset: f64,
        options: ScrollOptions,
    },
    ScrollBy {
        horizontal_delta: f64,
        vertical_delta: f64,
        options: ScrollOptions,
    },
    /// Sets the absolute scroll velocity; `None` decay uses the tuned default
    /// and a zero decay keeps a constant rate until superseded.
    ScrollWithVelocity {
        velocity: Vector2D,
        inertia_decay_per_second: Option<Vector2D>,
    },
    /// Layers velocity on top of whatever motion is already in flight.
    ScrollWithAdditionalVelocity {
        velocity: Vector2D,
        inertia_decay_per_second: Option<Vector2D>,
    },
    ZoomTo {
        factor: f32,
        center: Option<Point>,
        options: ZoomOptions,
    },
    ZoomBy {
        delta: f32,
        center: Option<Point>,
        options: ZoomOptions,
    },
    ZoomWithVelocity {
        velocity: f32,
        center: Option<Point>,
        inertia_decay_per_second: Option<f32>,
    },
    ZoomWithAdditionalVelocity {
        velocity: f32,
        center: Option<Point>,
        inertia_decay_per_second: Option<f32>,
    },
}

impl ViewChangeRequest {
    #[must_use]
    pub fn kind(&self) -> ViewChangeKind {
        match self {
            Self::ScrollTo { .. } => ViewChangeKind::AbsoluteOffset,
            Self::ScrollBy { .. } => ViewChangeKind::RelativeOffset,
            Self::ScrollWithVelocity { .. } => ViewChangeKind::OffsetWithVelocity,
            Self::ScrollWithAdditionalVelocity { .. } => {
                ViewChangeKind::OffsetWithAdditionalVelocity
            }
            Self::ZoomTo { .. } => ViewChangeKind::AbsoluteZoom,
            Self::ZoomBy { .. } => ViewChangeKind::RelativeZoom,
            Self::ZoomWithVelocity { .. } => ViewChangeKind::ZoomWithVelocity,
            Self::ZoomWithAdditionalVelocity { .. } => ViewChangeKind::ZoomWithAdditionalVelocity,
        }
    }

    #[must_use]
    pub fn axis(&self) -> ViewChangeAxis {
        self.kind().axis()
    }
}
