//! Persistent storage subsystem.
//!
//! # Data Flow
//! ```text
//! database.url (config)
//!     → store.rs (scheme → driver)
//!     → handle.rs (single-connection state machine)
//!     → models.rs (collection declarations at startup)
//! ```
//!
//! # Design Decisions
//! - The driver lives behind the `Storage` trait; the orchestrator never sees
//!   driver types
//! - One live connection per process, owned by the startup/shutdown paths
//! - Disconnect errors during shutdown are logged, never escalated

pub mod handle;
pub mod memory;
pub mod models;
pub mod store;

pub use handle::{StorageHandle, StorageState};
pub use memory::MemoryStore;
pub use store::{open, Storage, StorageError};
