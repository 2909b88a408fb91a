//! The scrolling presenter: view-change request intake, the async operation
//! queue, and completion reconciliation against the platform tracker.

mod controller;
mod edge_scroll;
mod engine;
mod events;
mod operation;
mod pump;
mod reconcile;
mod request;
mod state;
mod tuning;

pub use controller::{ScrollControllerRequest, ScrollDimension};
pub use edge_scroll::EdgeScrollConfig;
pub use events::{
    ActivityChangedEvent, EventSource, PresenterActivity, SubscriptionToken,
    ViewChangeCompletedEvent, ViewChangedEvent,
};
pub use operation::OperationState;
pub use request::{
    AnimationMode, ScrollOptions, SnapPointsMode, ViewChangeAxis, ViewChangeId, ViewChangeKind,
    ViewChangeRequest, ViewChangeResult, ViewChangeTrigger, ZoomOptions,
};
pub use state::ViewStateSnapshot;
pub use tuning::{PresenterTuning, anticipated_resting_delta, velocity_for_resting_delta};

use indexmap::{IndexMap, IndexSet};

use crate::core::types::{Size, Viewport};
use crate::error::{ScrollError, ScrollResult};
use crate::snap::SnapPointSet;
use crate::tracker::{InteractionTracker, RequestId};

use edge_scroll::EdgeScrollSession;
use operation::PendingOperation;
use state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenterConfig {
    pub viewport: Viewport,
    pub content_extent: Size,
    pub min_zoom_factor: f32,
    pub max_zoom_factor: f32,
}

impl PresenterConfig {
    #[must_use]
    pub fn new(viewport: Viewport, content_extent: Size) -> Self {
        Self {
            viewport,
            content_extent,
            min_zoom_factor: 0.1,
            max_zoom_factor: 10.0,
        }
    }

    #[must_use]
    pub fn with_zoom_bounds(mut self, min_zoom_factor: f32, max_zoom_factor: f32) -> Self {
        self.min_zoom_factor = min_zoom_factor;
        self.max_zoom_factor = max_zoom_factor;
        self
    }
}

/// Orchestrates scroll/zoom view changes against an interaction tracker.
///
/// Single-threaded by contract: queue mutation, the per-frame pump, and
/// tracker callbacks all run on the owning thread; "waiting" for a view
/// change is modeled purely through completion events.
pub struct ScrollingPresenter<T: InteractionTracker> {
    pub(super) tracker: T,
    pub(super) tuning: PresenterTuning,
    pub(super) view: ViewState,
    pub(super) operations: Vec<PendingOperation>,
    pub(super) next_correlation_id: ViewChangeId,
    pub(super) next_request_id: RequestId,
    pub(super) next_dequeue_sequence: u64,
    /// Dequeue-ordered map from tracker request id to correlation id.
    pub(super) dequeued_requests: IndexMap<RequestId, ViewChangeId>,
    /// Request ids whose operations were completed before the tracker's
    /// final event arrived; their late events are dropped silently.
    pub(super) retired_requests: IndexSet<RequestId>,
    pub(super) activity: PresenterActivity,
    pub(super) interacting: bool,
    pub(super) edge_scroll: Option<EdgeScrollSession>,
    pub(super) horizontal_snap_points: SnapPointSet,
    pub(super) vertical_snap_points: SnapPointSet,
    pub(super) zoom_snap_points: SnapPointSet,
    pub(super) scroll_completed: EventSource<ViewChangeCompletedEvent>,
    pub(super) zoom_completed: EventSource<ViewChangeCompletedEvent>,
    pub(super) view_changed: EventSource<ViewChangedEvent>,
    pub(super) activity_changed: EventSource<ActivityChangedEvent>,
}

impl<T: InteractionTracker> ScrollingPresenter<T> {
    pub fn new(tracker: T, config: PresenterConfig) -> ScrollResult<Self> {
        Self::with_tuning(tracker, config, PresenterTuning::default())
    }

    pub fn with_tuning(
        tracker: T,
        config: PresenterConfig,
        tuning: PresenterTuning,
    ) -> ScrollResult<Self> {
        if !config.viewport.is_valid() {
            return Err(ScrollError::InvalidViewport {
                width: config.viewport.width,
                height: config.viewport.height,
            });
        }
        if !config.content_extent.is_valid() {
            return Err(ScrollError::InvalidArgument(
                "content extent must be finite and non-negative".to_owned(),
            ));
        }
        Self::validate_zoom_bounds(config.min_zoom_factor, config.max_zoom_factor)?;
        let tuning = tuning.validate()?;

        let mut view = ViewState::new(config.viewport, config.content_extent);
        view.min_zoom_factor = config.min_zoom_factor;
        view.max_zoom_factor = config.max_zoom_factor;

        let mut presenter = Self::from_parts(tracker, tuning, view);
        presenter.refresh_snap_bounds();
        Ok(presenter)
    }

    /// Builds a presenter that is not yet loaded/laid out; request APIs
    /// return [`ViewChangeId::NOOP`] until a viewport and extent are set.
    #[must_use]
    pub fn detached(tracker: T) -> Self {
        Self::from_parts(
            tracker,
            PresenterTuning::default(),
            ViewState::new(Viewport::new(0, 0), Size::new(0.0, 0.0)),
        )
    }

    fn from_parts(tracker: T, tuning: PresenterTuning, view: ViewState) -> Self {
        Self {
            tracker,
            tuning,
            view,
            operations: Vec::new(),
            next_correlation_id: ViewChangeId::first(),
            next_request_id: 1,
            next_dequeue_sequence: 1,
            dequeued_requests: IndexMap::new(),
            retired_requests: IndexSet::new(),
            activity: PresenterActivity::Idle,
            interacting: false,
            edge_scroll: None,
            horizontal_snap_points: SnapPointSet::new(),
            vertical_snap_points: SnapPointSet::new(),
            zoom_snap_points: SnapPointSet::new(),
            scroll_completed: EventSource::new(),
            zoom_completed: EventSource::new(),
            view_changed: EventSource::new(),
            activity_changed: EventSource::new(),
        }
    }

    pub(super) fn validate_zoom_bounds(min: f32, max: f32) -> ScrollResult<()> {
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ScrollError::InvalidArgument(
                "zoom bounds must be finite, positive, and min <= max".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.view.is_ready()
    }

    #[must_use]
    pub fn horizontal_offset(&self) -> f64 {
        self.view.zoomed_horizontal_offset
    }

    #[must_use]
    pub fn vertical_offset(&self) -> f64 {
        self.view.zoomed_vertical_offset
    }

    #[must_use]
    pub fn zoom_factor(&self) -> f32 {
        self.view.zoom_factor
    }

    #[must_use]
    pub fn view_snapshot(&self) -> ViewStateSnapshot {
        self.view.snapshot()
    }

    #[must_use]
    pub fn activity(&self) -> PresenterActivity {
        self.activity
    }

    /// Operations that have not yet reached a terminal result.
    #[must_use]
    pub fn outstanding_operation_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.is_outstanding())
            .count()
    }

    #[must_use]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    #[must_use]
    pub fn into_tracker(self) -> T {
        self.tracker
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ScrollResult<()> {
        if !viewport.is_valid() {
            return Err(ScrollError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.view.viewport = viewport;
        self.refresh_snap_bounds();
        Ok(())
    }

    pub fn set_content_extent(&mut self, content_extent: Size) -> ScrollResult<()> {
        if !content_extent.is_valid() {
            return Err(ScrollError::InvalidArgument(
                "content extent must be finite and non-negative".to_owned(),
            ));
        }
        self.view.content_extent = content_extent;
        self.refresh_snap_bounds();
        Ok(())
    }

    pub fn set_zoom_bounds(&mut self, min_zoom_factor: f32, max_zoom_factor: f32) -> ScrollResult<()> {
        Self::validate_zoom_bounds(min_zoom_factor, max_zoom_factor)?;
        self.view.min_zoom_factor = min_zoom_factor;
        self.view.max_zoom_factor = max_zoom_factor;
        self.refresh_snap_bounds();
        Ok(())
    }

    pub fn add_horizontal_snap_point(&mut self, point: crate::snap::SnapPoint) -> ScrollResult<()> {
        self.horizontal_snap_points.insert(point)?;
        self.refresh_snap_bounds();
        Ok(())
    }

    pub fn add_vertical_snap_point(&mut self, point: crate::snap::SnapPoint) -> ScrollResult<()> {
        self.vertical_snap_points.insert(point)?;
        self.refresh_snap_bounds();
        Ok(())
    }

    pub fn add_zoom_snap_point(&mut self, point: crate::snap::SnapPoint) -> ScrollResult<()> {
        self.zoom_snap_points.insert(point)?;
        self.refresh_snap_bounds();
        Ok(())
    }

    pub fn remove_horizontal_snap_point(&mut self, point: &crate::snap::SnapPoint) -> bool {
        self.horizontal_snap_points.remove(point)
    }

    pub fn remove_vertical_snap_point(&mut self, point: &crate::snap::SnapPoint) -> bool {
        self.vertical_snap_points.remove(point)
    }

    pub fn remove_zoom_snap_point(&mut self, point: &crate::snap::SnapPoint) -> bool {
        self.zoom_snap_points.remove(point)
    }

    pub fn clear_snap_points(&mut self) {
        self.horizontal_snap_points.clear();
        self.vertical_snap_points.clear();
        self.zoom_snap_points.clear();
    }

    #[must_use]
    pub fn horizontal_snap_points(&self) -> &SnapPointSet {
        &self.horizontal_snap_points
    }

    #[must_use]
    pub fn vertical_snap_points(&self) -> &SnapPointSet {
        &self.vertical_snap_points
    }

    #[must_use]
    pub fn zoom_snap_points(&self) -> &SnapPointSet {
        &self.zoom_snap_points
    }

    /// Snap application ranges depend on the scrollable bounds; refreshed on
    /// viewport, extent, zoom-bound, and snap-collection changes.
    pub(super) fn refresh_snap_bounds(&mut self) {
        let max = self.view.max_position();
        self.horizontal_snap_points.set_bounds(0.0, max.x);
        self.vertical_snap_points.set_bounds(0.0, max.y);
        self.zoom_snap_points.set_bounds(
            f64::from(self.view.min_zoom_factor),
            f64::from(self.view.max_zoom_factor),
        );
    }

    pub fn subscribe_scroll_completed(
        &mut self,
        handler: impl FnMut(&ViewChangeCompletedEvent) + 'static,
    ) -> SubscriptionToken {
        self.scroll_completed.subscribe(handler)
    }

    pub fn unsubscribe_scroll_completed(&mut self, token: SubscriptionToken) -> bool {
        self.scroll_completed.unsubscribe(token)
    }

    pub fn subscribe_zoom_completed(
        &mut self,
        handler: impl FnMut(&ViewChangeCompletedEvent) + 'static,
    ) -> SubscriptionToken {
        self.zoom_completed.subscribe(handler)
    }

    pub fn unsubscribe_zoom_completed(&mut self, token: SubscriptionToken) -> bool {
        self.zoom_completed.unsubscribe(token)
    }

    pub fn subscribe_view_changed(
        &mut self,
        handler: impl FnMut(&ViewChangedEvent) + 'static,
    ) -> SubscriptionToken {
        self.view_changed.subscribe(handler)
    }

    pub fn unsubscribe_view_changed(&mut self, token: SubscriptionToken) -> bool {
        self.view_changed.unsubscribe(token)
    }

    pub fn subscribe_activity_changed(
        &mut self,
        handler: impl FnMut(&ActivityChangedEvent) + 'static,
    ) -> SubscriptionToken {
        self.activity_changed.subscribe(handler)
    }

    pub fn unsubscribe_activity_changed(&mut self, token: SubscriptionToken) -> bool {
        self.activity_changed.unsubscribe(token)
    }
}
