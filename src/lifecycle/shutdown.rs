//! Graceful shutdown coordination.
//!
//! # State Machine
//! ```text
//! Notify          broadcast "exit" to real-time clients (best-effort)
//!   → Close messaging   bounded; on timeout log and proceed
//!   → Close server      stop accepting, drain in-flight; bounded
//!   → Close storage     disconnect; errors logged, never block
//!   → Exit              log completion, return exit code 0
//! ```
//!
//! # Design Decisions
//! - Steps run strictly sequentially with independent timeouts; worst-case
//!   total latency is their sum
//! - The in-progress flag is an atomic check-and-set owned by this
//!   coordinator, not ambient global state; a second trigger is a silent
//!   no-op, so no handle is ever double-closed
//! - A timed-out close keeps running in the background; the cascade proceeds

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ShutdownConfig;
use crate::events::topic;
use crate::http::server::ServerHandle;
use crate::lifecycle::bounded::bounded;
use crate::messaging::MessagingHub;
use crate::storage::StorageHandle;

/// Drives the ordered, time-bounded shutdown cascade.
pub struct ShutdownCoordinator {
    in_progress: AtomicBool,
    timeouts: ShutdownConfig,
    hub: Arc<MessagingHub>,
    server: Mutex<ServerHandle>,
    storage: Arc<StorageHandle>,
}

impl ShutdownCoordinator {
    pub fn new(
        timeouts: ShutdownConfig,
        hub: Arc<MessagingHub>,
        server: ServerHandle,
        storage: Arc<StorageHandle>,
    ) -> Self {
        Self {
            in_progress: AtomicBool::new(false),
            timeouts,
            hub,
            server: Mutex::new(server),
            storage,
        }
    }

    /// Atomically claim the shutdown. Only the first caller gets `true`.
    pub fn begin(&self) -> bool {
        self.in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Run the cascade and return the process exit code.
    ///
    /// Every handled path, including degraded timeout paths, reaches the
    /// terminal Exit state and returns 0. An unrecoverable panic outside the
    /// bounded steps escapes and terminates the process nonzero.
    pub async fn shutdown(&self) -> i32 {
        if !self.begin() {
            tracing::debug!("shutdown already in progress, ignoring");
            return 0;
        }
        tracing::info!("shutdown started");

        // Notify: best-effort, no timeout.
        let notified = self.hub.broadcast(topic::EXIT, Value::Null);
        tracing::info!(clients = notified, "exit broadcast to messaging clients");

        // Close messaging under its bound.
        let hub = self.hub.clone();
        bounded(
            "close messaging",
            self.timeouts.messaging_close(),
            async move { hub.close().await },
        )
        .await;

        // Close the request server under its bound.
        let mut server = self.server.lock().await;
        if let Some(drain) = server.begin_close() {
            bounded("close server", self.timeouts.server_close(), drain).await;
        }
        server.mark_closed();
        drop(server);

        // Close storage; errors are logged but never block exit.
        match self.storage.disconnect().await {
            Ok(true) => tracing::info!("storage disconnected"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "storage disconnect failed"),
        }

        tracing::info!("shutdown complete");
        0
    }
}
