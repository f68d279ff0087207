//! Storage connection handle and state machine.
//!
//! # State Transitions
//! ```text
//! Disconnected → Connected: connect() during startup
//! Connected → Disconnected: disconnect() during shutdown
//! ```
//!
//! # Design Decisions
//! - Exactly one live connection per process: connecting twice is an error
//! - Disconnecting an already-disconnected handle is a no-op returning false,
//!   which is what makes the shutdown idempotence property observable

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::storage::store::{Storage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageState {
    Disconnected,
    Connected,
}

/// Owns the process's single storage connection.
pub struct StorageHandle {
    store: Arc<dyn Storage>,
    state: Mutex<StorageState>,
}

impl StorageHandle {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            state: Mutex::new(StorageState::Disconnected),
        }
    }

    pub fn driver_name(&self) -> &str {
        self.store.name()
    }

    pub async fn state(&self) -> StorageState {
        *self.state.lock().await
    }

    pub async fn connect(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if *state == StorageState::Connected {
            return Err(StorageError::AlreadyConnected);
        }
        self.store.connect().await?;
        *state = StorageState::Connected;
        tracing::info!(driver = self.store.name(), "storage connected");
        Ok(())
    }

    /// Disconnect the live connection.
    ///
    /// Returns `Ok(true)` if a connection was actually closed, `Ok(false)` if
    /// the handle was already disconnected.
    pub async fn disconnect(&self) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        if *state == StorageState::Disconnected {
            return Ok(false);
        }
        self.store.disconnect().await?;
        *state = StorageState::Disconnected;
        Ok(true)
    }

    /// Declare a collection on the connected store.
    pub async fn ensure_collection(&self, name: &str) -> Result<(), StorageError> {
        if *self.state.lock().await != StorageState::Connected {
            return Err(StorageError::NotConnected);
        }
        self.store.ensure_collection(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn handle() -> StorageHandle {
        StorageHandle::new(Arc::new(MemoryStore::new("memory://test")))
    }

    #[tokio::test]
    async fn test_double_connect_rejected() {
        let handle = handle();
        handle.connect().await.unwrap();
        assert!(matches!(
            handle.connect().await,
            Err(StorageError::AlreadyConnected)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_a_noop_when_disconnected() {
        let handle = handle();
        assert!(!handle.disconnect().await.unwrap());

        handle.connect().await.unwrap();
        assert!(handle.disconnect().await.unwrap());
        assert!(!handle.disconnect().await.unwrap());
        assert_eq!(handle.state().await, StorageState::Disconnected);
    }

    #[tokio::test]
    async fn test_collections_require_connection() {
        let handle = handle();
        assert!(matches!(
            handle.ensure_collection("users").await,
            Err(StorageError::NotConnected)
        ));
    }
}
