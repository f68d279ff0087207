//! Real-time messaging hub.
//!
//! # State Transitions
//! ```text
//! Created → Active: activate() once the listening socket is up
//! Active → Closed: close() during shutdown
//! ```
//!
//! # Design Decisions
//! - Session registry is a concurrent map keyed by client ID; each session
//!   owns an unbounded channel the hub pushes into
//! - Broadcast is best-effort: a session that went away mid-send is skipped
//! - close() directs every session to shut and then waits for the registry to
//!   drain; the shutdown coordinator bounds that wait, not the hub

use std::sync::Mutex;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

pub type ClientId = Uuid;

/// Message pushed from the hub into a session.
#[derive(Debug, Clone)]
pub enum HubMessage {
    /// Named event forwarded to the client as a JSON frame.
    Event { name: String, data: Value },
    /// Directive to close the connection and end the session task.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Created,
    Active,
    Closed,
}

pub struct MessagingHub {
    state: Mutex<HubState>,
    sessions: DashMap<ClientId, mpsc::UnboundedSender<HubMessage>>,
    drain_tx: watch::Sender<usize>,
}

impl MessagingHub {
    pub fn new() -> Self {
        let (drain_tx, _) = watch::channel(0);
        Self {
            state: Mutex::new(HubState::Created),
            sessions: DashMap::new(),
            drain_tx,
        }
    }

    pub fn state(&self) -> HubState {
        *self.state.lock().unwrap()
    }

    /// Start accepting sessions. Called once the server is listening.
    pub fn activate(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == HubState::Created {
            *state = HubState::Active;
        }
    }

    /// Register a new client session.
    ///
    /// Returns `None` unless the hub is active, so late upgrades during
    /// shutdown are turned away instead of leaking sessions.
    pub fn register(&self) -> Option<(ClientId, mpsc::UnboundedReceiver<HubMessage>)> {
        if self.state() != HubState::Active {
            return None;
        }
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.insert(id, tx);
        self.drain_tx.send_modify(|n| *n += 1);
        Some((id, rx))
    }

    pub fn deregister(&self, id: ClientId) {
        if self.sessions.remove(&id).is_some() {
            self.drain_tx.send_modify(|n| *n = n.saturating_sub(1));
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Broadcast a named event to every connected client, best-effort.
    ///
    /// Returns how many sessions the event was handed to.
    pub fn broadcast(&self, name: &str, data: Value) -> usize {
        if self.state() == HubState::Closed {
            return 0;
        }
        let mut delivered = 0;
        for entry in self.sessions.iter() {
            let message = HubMessage::Event {
                name: name.to_string(),
                data: data.clone(),
            };
            if entry.value().send(message).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Direct every session to close and wait for the registry to drain.
    ///
    /// No internal timeout: the caller bounds this. A second call returns
    /// immediately.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state == HubState::Closed {
                return;
            }
            *state = HubState::Closed;
        }

        let directed = self.sessions.len();
        for entry in self.sessions.iter() {
            let _ = entry.value().send(HubMessage::Close);
        }
        tracing::debug!(sessions = directed, "messaging hub closing");

        let mut rx = self.drain_tx.subscribe();
        loop {
            if *rx.borrow_and_update() == 0 {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        tracing::info!("messaging hub closed");
    }
}

impl Default for MessagingHub {
    fn default() -> Self {
        Self::new()
    }
}
