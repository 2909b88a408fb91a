//! Completion reconciliation: folds the tracker's serialized event stream
//! back into the authoritative view state and the operation queue.

use tracing::{debug, warn};

use crate::presenter::ScrollingPresenter;
use crate::presenter::events::{ActivityChangedEvent, PresenterActivity, ViewChangedEvent};
use crate::presenter::request::ViewChangeResult;
use crate::tracker::{InteractionTracker, RequestId, TrackerEvent};

impl<T: InteractionTracker> ScrollingPresenter<T> {
    /// Processes one tracker event. The host must forward events in the
    /// order the tracker raised them.
    pub fn on_tracker_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::ValuesChanged {
                position,
                zoom_factor,
                ..
            } => self.apply_values_changed(position.x, position.y, zoom_factor),
            TrackerEvent::RequestIgnored { request_id } => {
                self.complete_for_request(request_id, ViewChangeResult::Ignored);
            }
            TrackerEvent::InteractingStateEntered => {
                self.interacting = true;
                self.set_activity(PresenterActivity::Interacting);
                // Direct manipulation takes over the tracker; in-flight
                // animations will never reach their targets. Jumps already
                // executed atomically and settle through their own idle
                // event.
                self.interrupt_dequeued_animated();
            }
            TrackerEvent::InertiaStateEntered { .. } => {
                self.interacting = false;
                self.set_activity(PresenterActivity::Inertia);
            }
            TrackerEvent::CustomAnimationStateEntered { .. } => {
                self.interacting = false;
                self.set_activity(PresenterActivity::Animating);
            }
            TrackerEvent::IdleStateEntered { request_id } => {
                self.interacting = false;
                self.set_activity(PresenterActivity::Idle);
                self.reconcile_idle(request_id);
                // Events are serialized, so no request retired before this
                // point can still report.
                self.retired_requests.clear();
            }
        }
        self.prune_completed();
    }

    fn apply_values_changed(&mut self, horizontal: f64, vertical: f64, zoom_factor: f32) {
        let offsets_moved = (horizontal - self.view.zoomed_horizontal_offset).abs()
            > self.tuning.offset_equality_epsilon
            || (vertical - self.view.zoomed_vertical_offset).abs()
                > self.tuning.offset_equality_epsilon;
        let zoom_moved =
            (zoom_factor - self.view.zoom_factor).abs() > self.tuning.zoom_factor_equality_epsilon;

        self.view.zoomed_horizontal_offset = horizontal;
        self.view.zoomed_vertical_offset = vertical;
        self.view.zoom_factor = zoom_factor;

        if zoom_moved {
            // The scrollable range depends on the zoom factor.
            self.refresh_snap_bounds();
        }
        if offsets_moved || zoom_moved {
            let event = ViewChangedEvent {
                horizontal_offset: horizontal,
                vertical_offset: vertical,
                zoom_factor,
            };
            self.view_changed.emit(&event);
        }
    }

    /// The tracker reached rest: the operation that drove it completes with
    /// `Completed`, and every live operation dispatched before it completes
    /// with `Interrupted`, in dequeue order. Operations dispatched after the
    /// driving request still have their own events in flight and are left
    /// alone.
    fn reconcile_idle(&mut self, request_id: Option<RequestId>) {
        match request_id {
            Some(request_id) => {
                if self.retired_requests.swap_remove(&request_id) {
                    debug!(request_id, "late idle event for retired request");
                    return;
                }
                let Some(index) = self.operation_index_for_request(request_id) else {
                    debug_assert!(false, "idle event for unknown request id {request_id}");
                    warn!(request_id, "idle event for unknown request id");
                    return;
                };
                let sequence = self.operations[index].dequeue_sequence;
                for other in self.dequeued_in_sequence_order() {
                    if other != index && self.operations[other].dequeue_sequence < sequence {
                        self.settle_operation_at(other, ViewChangeResult::Interrupted);
                    }
                }
                self.settle_operation_at(index, ViewChangeResult::Completed);
            }
            // Rest reached without a driving request: nothing in flight can
            // finish anymore.
            None => {
                for other in self.dequeued_in_sequence_order() {
                    self.settle_operation_at(other, ViewChangeResult::Interrupted);
                }
            }
        }
    }

    fn complete_for_request(&mut self, request_id: RequestId, result: ViewChangeResult) {
        if self.retired_requests.swap_remove(&request_id) {
            debug!(request_id, "late event for retired request");
            return;
        }
        let Some(index) = self.operation_index_for_request(request_id) else {
            debug_assert!(false, "event for unknown request id {request_id}");
            warn!(request_id, "event for unknown request id");
            return;
        };
        self.settle_operation_at(index, result);
    }

    fn operation_index_for_request(&self, request_id: RequestId) -> Option<usize> {
        self.operations
            .iter()
            .position(|op| op.is_live() && op.request_id == Some(request_id))
    }

    /// Indices of live operations ordered by dequeue sequence, so completion
    /// events fire in dispatch order.
    fn dequeued_in_sequence_order(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .operations
            .iter()
            .enumerate()
            .filter(|(_, op)| op.is_live())
            .map(|(index, _)| index)
            .collect();
        indices.sort_by_key(|&index| self.operations[index].dequeue_sequence);
        indices
    }

    fn interrupt_dequeued_animated(&mut self) {
        for index in self.dequeued_in_sequence_order() {
            if self.operations[index].is_animated {
                self.complete_operation_at(index, ViewChangeResult::Interrupted);
            }
        }
    }

    pub(super) fn set_activity(&mut self, activity: PresenterActivity) {
        if self.activity == activity {
            return;
        }
        self.activity = activity;
        debug!(?activity, "presenter activity changed");
        let event = ActivityChangedEvent { activity };
        self.activity_changed.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use crate::core::types::{Size, Viewport};
    use crate::presenter::request::ScrollOptions;
    use crate::presenter::{PresenterConfig, ScrollingPresenter};
    use crate::tracker::SimTracker;

    fn presenter() -> ScrollingPresenter<SimTracker> {
        let config = PresenterConfig::new(Viewport::new(100, 100), Size::new(500.0, 500.0));
        ScrollingPresenter::new(SimTracker::new(), config).expect("presenter init")
    }

    fn pump(presenter: &mut ScrollingPresenter<SimTracker>, frames: usize) {
        for _ in 0..frames {
            presenter.on_compositor_tick();
            let events = presenter.tracker_mut().step(0.016);
            for event in events {
                presenter.on_tracker_event(event);
            }
        }
    }

    #[test]
    fn settled_requests_leave_no_retired_residue() {
        let mut presenter = presenter();
        for round in 0..100u32 {
            let target = f64::from(round % 4 + 1) * 50.0;
            presenter
                .scroll_to(target, 0.0, ScrollOptions::default())
                .expect("scroll_to");
            pump(&mut presenter, 60);
        }
        assert!(presenter.retired_requests.is_empty());
        assert!(presenter.dequeued_requests.is_empty());
    }

    #[test]
    fn displaced_request_ids_drain_at_the_next_idle() {
        let mut presenter = presenter();
        presenter
            .scroll_to(300.0, 0.0, ScrollOptions::default())
            .expect("first scroll");
        pump(&mut presenter, 2);

        presenter
            .scroll_to(60.0, 0.0, ScrollOptions::default())
            .expect("second scroll");
        presenter.on_compositor_tick();
        assert_eq!(presenter.retired_requests.len(), 1);

        pump(&mut presenter, 60);
        assert!(presenter.retired_requests.is_empty());
    }
}
