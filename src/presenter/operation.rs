use crate::presenter::request::{
    ViewChangeAxis, ViewChangeId, ViewChangeRequest, ViewChangeResult, ViewChangeTrigger,
};
use crate::tracker::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Queued,
    Dequeued,
    Completed,
}

/// One outstanding view change, exclusively owned by the presenter's FIFO
/// operation list.
#[derive(Debug, Clone)]
pub(crate) struct PendingOperation {
    pub id: ViewChangeId,
    pub request: ViewChangeRequest,
    pub trigger: ViewChangeTrigger,
    pub state: OperationState,
    pub is_animated: bool,
    /// Compositor ticks left before the operation may be dequeued.
    pub ticks_countdown: u32,
    /// Assigned on dequeue; one correlation id may see several request ids
    /// across retries.
    pub request_id: Option<RequestId>,
    /// Monotonic dequeue order; completion events are delivered in this
    /// order, not enqueue order.
    pub dequeue_sequence: Option<u64>,
    pub result: Option<ViewChangeResult>,
}

impl PendingOperation {
    pub fn new(
        id: ViewChangeId,
        request: ViewChangeRequest,
        trigger: ViewChangeTrigger,
        is_animated: bool,
        ticks_countdown: u32,
    ) -> Self {
        Self {
            id,
            request,
            trigger,
            state: OperationState::Queued,
            is_animated,
            ticks_countdown,
            request_id: None,
            dequeue_sequence: None,
            result: None,
        }
    }

    pub fn axis(&self) -> ViewChangeAxis {
        self.request.axis()
    }

    pub fn is_live(&self) -> bool {
        self.state == OperationState::Dequeued
    }

    pub fn is_outstanding(&self) -> bool {
        self.state != OperationState::Completed
    }

    /// Whether a newly enqueued operation replaces this one.
    ///
    /// Two merge classes exist: velocity requests of the same kind and
    /// trigger coalesce (wheel impulses replace wheel impulses), and any
    /// direct or controller request displaces synthesized edge scrolling on
    /// the same axis.
    pub fn is_superseded_by(&self, request: &ViewChangeRequest, trigger: ViewChangeTrigger) -> bool {
        if !self.is_outstanding() || self.axis() != request.axis() {
            return false;
        }

        if self.trigger == ViewChangeTrigger::PointerEdgeScroll
            && matches!(
                trigger,
                ViewChangeTrigger::DirectRequest | ViewChangeTrigger::ScrollController
            )
        {
            return true;
        }

        self.request.kind() == request.kind()
            && self.trigger == trigger
            && request.kind().is_velocity_based()
    }
}
