//! Storage seam: the driver-facing trait and its errors.
//!
//! The actual document-store driver is an external collaborator; the
//! orchestrator only ever talks to this trait. The `memory://` scheme maps to
//! the in-process store; anything else is rejected at configuration time.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::storage::memory::MemoryStore;

/// Errors from the storage seam.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("connect to '{url}' failed: {reason}")]
    Connect { url: String, reason: String },

    #[error("disconnect failed: {0}")]
    Disconnect(String),

    #[error("already connected; exactly one live connection is permitted")]
    AlreadyConnected,

    #[error("not connected")]
    NotConnected,

    #[error("collection '{name}' registration failed: {reason}")]
    Collection { name: String, reason: String },

    #[error("unsupported storage scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("storage url '{0}' is not a valid URL")]
    InvalidUrl(String),
}

/// A document store exposing only its lifecycle surface.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short name of the backing driver, for diagnostics.
    fn name(&self) -> &str;

    async fn connect(&self) -> Result<(), StorageError>;

    async fn disconnect(&self) -> Result<(), StorageError>;

    /// Declare a named collection, creating it if the driver needs to.
    async fn ensure_collection(&self, name: &str) -> Result<(), StorageError>;
}

/// Resolve a storage URL to a driver.
pub fn open(url: &str) -> Result<Arc<dyn Storage>, StorageError> {
    let parsed = Url::parse(url).map_err(|_| StorageError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "memory" => Ok(Arc::new(MemoryStore::new(url))),
        other => Err(StorageError::UnsupportedScheme(other.to_string())),
    }
}
