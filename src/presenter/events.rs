use serde::{Deserialize, Serialize};

use crate::presenter::request::{ViewChangeId, ViewChangeResult};

/// Raised once per correlation id when its view change reaches a terminal
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewChangeCompletedEvent {
    pub correlation_id: ViewChangeId,
    pub result: ViewChangeResult,
}

/// Raised when the authoritative offsets/zoom move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewChangedEvent {
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub zoom_factor: f32,
}

/// Coarse interaction state, mirroring the tracker's state callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PresenterActivity {
    #[default]
    Idle,
    /// Direct manipulation input is live.
    Interacting,
    Inertia,
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityChangedEvent {
    pub activity: PresenterActivity,
}

/// Handle for one subscription; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

/// Subscribe/unsubscribe event dispatch with token-based revocation.
///
/// Handlers run synchronously on the presenter's thread, in subscription
/// order.
pub struct EventSource<T> {
    handlers: Vec<(SubscriptionToken, Box<dyn FnMut(&T)>)>,
    next_token: u64,
}

impl<T> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_token: 1,
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&T) + 'static) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.handlers.push((token, Box::new(handler)));
        token
    }

    /// Returns `false` when the token was already removed.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(t, _)| *t != token);
        self.handlers.len() != before
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn emit(&mut self, event: &T) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }
}
