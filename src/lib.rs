//! Backbone application server runtime.
//!
//! A web/API server, a real-time messaging hub, a document-storage seam, and
//! an addon subsystem, brought up by a strictly ordered startup pipeline and
//! torn down by a time-bounded cascading shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//! Startup (strict order, fail-fast):
//!     resolve configuration
//!         → connect storage → register models
//!         → configure middleware → register routes
//!         → initialize addons            (addons may add their own routes)
//!         → register error route         (always last, never shadows addons)
//!         → bind listener → emit start_listening {url}
//!
//! Shutdown (strict order, per-step timeouts, never hangs):
//!     interrupt signal (once)
//!         → broadcast "exit" to messaging clients
//!         → close messaging   [bounded]
//!         → close server      [bounded, drains in-flight requests]
//!         → close storage     [errors logged, never block]
//!         → exit 0
//! ```
//!
//! The server handle and the event bus are exported so an external harness
//! can drive and observe a running instance.

// Core subsystems
pub mod config;
pub mod http;
pub mod messaging;
pub mod storage;

// Extensions
pub mod addons;

// Cross-cutting concerns
pub mod events;
pub mod lifecycle;
pub mod observability;

pub use config::{AppConfig, CliArgs};
pub use events::EventBus;
pub use http::{ServerHandle, ServerState};
pub use lifecycle::{App, RunningApp, ShutdownCoordinator, StartupError};
pub use messaging::MessagingHub;
pub use storage::{Storage, StorageHandle};
