//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for the termination signal (interrupt)
//! - Trigger the shutdown coordinator exactly once
//!
//! # Design Decisions
//! - Only the interrupt signal is handled; any other signal keeps its
//!   default disposition
//! - Repeat signals while shutdown is in progress are ignored, not queued;
//!   the coordinator's flag guards against re-entry either way

use std::sync::Arc;

use crate::lifecycle::shutdown::ShutdownCoordinator;

/// Wait for the termination signal, then run the cascade.
///
/// Returns the process exit code. If the signal handler cannot be installed
/// the server cannot be stopped cleanly, which is treated as fatal.
pub async fn run(coordinator: Arc<ShutdownCoordinator>) -> i32 {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for the termination signal");
            return 1;
        }
        if coordinator.in_progress() {
            tracing::debug!("termination signal ignored, shutdown already in progress");
            continue;
        }
        tracing::info!("termination signal received");
        return coordinator.shutdown().await;
    }
}
