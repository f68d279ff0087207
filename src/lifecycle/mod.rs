//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     resolve config → connect storage → register models
//!     → configure middleware → register routes → initialize addons
//!     → register error route → bind listener → emit start_listening
//!
//! Shutdown (shutdown.rs):
//!     notify clients → close messaging → close server → close storage → exit
//!
//! Signals (signals.rs):
//!     interrupt → trigger shutdown once; repeats ignored
//! ```
//!
//! # Design Decisions
//! - Ordered startup with fail-fast: any stage failure is fatal, no rollback
//! - Ordered shutdown with independent per-step timeouts; a timed-out step
//!   logs a warning and the cascade proceeds (bounded.rs)
//! - Everything is sequential by design: deterministic ordering over
//!   throughput

pub mod bounded;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use bounded::{bounded, BoundedOutcome};
pub use shutdown::ShutdownCoordinator;
pub use startup::{App, RunningApp, StartupError};
