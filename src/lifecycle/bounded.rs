//! Bounded operation primitive: run an operation under a time limit and
//! proceed on expiry instead of blocking.
//!
//! # Design Decisions
//! - The operation is spawned, then its join handle is raced against the
//!   timer; on expiry the task is NOT aborted, so a slow close may still
//!   finish in the background
//! - Timeouts log a warning and continue; a panicking operation logs an
//!   error and continues

use std::time::Duration;

use tokio::task::JoinError;

/// How a bounded operation ended.
#[derive(Debug)]
pub enum BoundedOutcome<T> {
    /// Finished inside the limit.
    Completed(T),
    /// Limit expired; the operation keeps running in the background.
    TimedOut,
    /// The spawned operation panicked or was aborted externally.
    Failed(JoinError),
}

impl<T> BoundedOutcome<T> {
    pub fn completed(&self) -> bool {
        matches!(self, BoundedOutcome::Completed(_))
    }
}

/// Run `op` for at most `limit`, logging and continuing on expiry.
pub async fn bounded<F>(name: &'static str, limit: Duration, op: F) -> BoundedOutcome<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let mut task = tokio::spawn(op);
    match tokio::time::timeout(limit, &mut task).await {
        Ok(Ok(value)) => BoundedOutcome::Completed(value),
        Ok(Err(e)) => {
            tracing::error!(step = name, error = %e, "bounded operation failed");
            BoundedOutcome::Failed(e)
        }
        Err(_) => {
            tracing::warn!(
                step = name,
                timeout_ms = limit.as_millis() as u64,
                "bounded operation exceeded its timeout, continuing"
            );
            BoundedOutcome::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fast_operation_completes() {
        let outcome = bounded("fast", Duration::from_millis(500), async { 42 }).await;
        assert!(matches!(outcome, BoundedOutcome::Completed(42)));
    }

    #[tokio::test]
    async fn test_slow_operation_times_out_but_still_finishes() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let outcome = bounded("slow", Duration::from_millis(20), async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            flag.store(true, Ordering::SeqCst);
        })
        .await;

        assert!(matches!(outcome, BoundedOutcome::TimedOut));
        assert!(!finished.load(Ordering::SeqCst));

        // The underlying operation was not cancelled.
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_operation_reported_as_failed() {
        let outcome: BoundedOutcome<()> =
            bounded("bad", Duration::from_millis(100), async { panic!("boom") }).await;
        assert!(matches!(outcome, BoundedOutcome::Failed(_)));
    }
}
