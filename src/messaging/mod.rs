//! Real-time messaging subsystem.
//!
//! # Data Flow
//! ```text
//! WebSocket upgrade (/socket)
//!     → session.rs (register with hub, forward frames)
//!     → hub.rs (session registry, broadcast, drain on close)
//!
//! Shutdown: coordinator broadcasts "exit" → close() → sessions drain
//! ```
//!
//! # Design Decisions
//! - The hub is distinct from the request/response server; it only pushes
//!   notifications to connected clients
//! - Clustering adapters are out of scope; the registry is process-local

pub mod hub;
pub mod session;

pub use hub::{ClientId, HubMessage, HubState, MessagingHub};
