//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (clap) + optional TOML file
//!     → loader.rs (parse & merge, CLI wins)
//!     → validation.rs (semantic checks, all errors reported)
//!     → AppConfig (validated, immutable snapshot)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is loaded exactly once, before any startup stage, and never
//!   mutated afterward; there is no reload path
//! - All fields have defaults so running with no file and no flags works
//! - `--help` short-circuits in clap: usage, exit 0, no stage runs

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, CliArgs, ConfigError};
pub use schema::{AppConfig, DatabaseConfig, Environment, Protocol, ServerConfig, ShutdownConfig};
