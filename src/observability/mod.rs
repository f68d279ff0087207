//! Observability subsystem.
//!
//! Structured logging only; the process's lifecycle milestones additionally
//! go out on the event bus for programmatic observers.

pub mod logging;
