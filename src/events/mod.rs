//! Process-scoped event bus for lifecycle announcements.
//!
//! # Responsibilities
//! - Carry named lifecycle events (e.g. `start_listening`) to any subscriber
//! - Preserve publish order for observers of the same event name
//! - Let external harnesses observe the running instance
//!
//! # Design Decisions
//! - Explicitly constructed and passed by reference, never a module-level
//!   singleton; lifecycle is the process, no teardown needed
//! - Single broadcast channel: total order implies per-name order
//! - Publishing with no subscribers is not an error

use serde_json::Value;
use tokio::sync::broadcast;

/// Well-known lifecycle event names.
pub mod topic {
    /// Fired once the listening socket is bound, payload `{"url": ...}`.
    pub const START_LISTENING: &str = "start_listening";

    /// Broadcast to real-time clients before the messaging layer closes.
    pub const EXIT: &str = "exit";
}

/// A named lifecycle event with a JSON payload.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: &'static str,
    pub payload: Value,
}

/// Publish/subscribe channel for lifecycle events.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    /// Publish an event. Best-effort: delivery to zero subscribers is fine.
    pub fn publish(&self, name: &'static str, payload: Value) {
        let _ = self.tx.send(Event { name, payload });
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait on a subscription for the next event with the given name.
///
/// Returns `None` once the bus is gone. Lagged receivers skip ahead rather
/// than erroring out; a harness polling slowly still sees later publishes.
pub async fn next_named(rx: &mut broadcast::Receiver<Event>, name: &str) -> Option<Event> {
    loop {
        match rx.recv().await {
            Ok(event) if event.name == name => return Some(event),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
