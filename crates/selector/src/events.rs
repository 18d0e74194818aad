//! Event Bus - selection lifecycle notifications
//!
//! Observers (status UI, tests) subscribe; the controller publishes without
//! ever blocking on them.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why a gesture ended without a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    Escape,
    Hidden,
    Unload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    GestureStarted { gesture_id: String },
    Highlighted { count: usize },
    /// Release found nothing to open
    Empty,
    CapExceeded { found: usize, cap: usize },
    /// URLs handed to the dispatcher
    Committed { urls: Vec<String> },
    Cancelled { reason: CancelReason },
}

/// Simple event bus using tokio broadcast channel
pub struct EventBus {
    tx: broadcast::Sender<SelectionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: SelectionEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
