//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Startup stages assemble, in order:
//!     middleware.rs (stack parameters)
//!     routes.rs (core routes + WebSocket endpoint)
//!     [addons merge their routes]
//!     routes.rs (catch-all error route, always last)
//!     server.rs (bind, serve, graceful close)
//! ```

pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{AppState, ServerHandle, ServerState};
