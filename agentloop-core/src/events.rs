//! Phase-transition events for external observers.
//!
//! The loop announces each phase transition on a broadcast channel.
//! Observers subscribe without becoming part of the control path: emission
//! never blocks and a missing subscriber is not an error.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Notification emitted at each loop phase transition.
///
/// `invocation` ties events from one loop run together; `round` counts
/// completed tool rounds at the time of emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LoopEvent {
    /// The model is about to be queried with the current conversation.
    ModelQueried {
        invocation: Uuid,
        round: u32,
        message_count: usize,
    },
    /// A batch of tool calls was handed to the executor.
    ToolBatchDispatched {
        invocation: Uuid,
        round: u32,
        call_count: usize,
    },
    /// The executor returned a complete batch of results.
    ToolBatchCompleted {
        invocation: Uuid,
        round: u32,
        error_count: usize,
    },
}

impl std::fmt::Display for LoopEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "event serialization error"),
        }
    }
}

/// Handle for emitting [`LoopEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: broadcast::Sender<LoopEvent>,
}

impl EventSender {
    /// Channel holding up to `capacity` undelivered events per subscriber;
    /// slow subscribers lose the oldest events, never block the loop.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Fire-and-forget: having no subscribers is fine.
    pub fn emit(&self, event: LoopEvent) {
        tracing::debug!("{}", event);
        let _ = self.tx.send(event);
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::new(64)
    }
}
