//! In-process store backing the `memory://` scheme.
//!
//! Holds no external resources; connect and disconnect are immediate. Used as
//! the default driver and by the test harnesses.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage::store::{Storage, StorageError};

pub struct MemoryStore {
    url: String,
    collections: Mutex<BTreeSet<String>>,
}

impl MemoryStore {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            collections: Mutex::new(BTreeSet::new()),
        }
    }

    /// Collections declared so far, in name order.
    pub fn collections(&self) -> Vec<String> {
        self.collections.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Result<(), StorageError> {
        tracing::debug!(url = %self.url, "memory store ready");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn ensure_collection(&self, name: &str) -> Result<(), StorageError> {
        self.collections.lock().unwrap().insert(name.to_string());
        Ok(())
    }
}
