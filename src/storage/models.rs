//! Application data model registration.
//!
//! Runs as its own startup stage, after the storage connection is live and
//! before any route can touch a collection. Schema contents are the driver's
//! business; this only declares the names.

use crate::storage::handle::StorageHandle;
use crate::storage::store::StorageError;

/// Collections the application declares at startup.
const COLLECTIONS: &[&str] = &["users", "groups", "sessions", "documents", "audit_log"];

pub async fn register_all(storage: &StorageHandle) -> Result<(), StorageError> {
    for name in COLLECTIONS {
        storage.ensure_collection(name).await?;
    }
    tracing::debug!(count = COLLECTIONS.len(), "data models registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_register_all_declares_every_collection() {
        let store = Arc::new(MemoryStore::new("memory://test"));
        let handle = StorageHandle::new(store.clone());
        handle.connect().await.unwrap();

        register_all(&handle).await.unwrap();

        let mut expected: Vec<String> = COLLECTIONS.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(store.collections(), expected);
    }
}
