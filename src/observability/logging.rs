//! Structured logging setup.
//!
//! # Design Decisions
//! - Uses the tracing crate; the log level is derived from the CLI verbosity
//!   flags, with `RUST_LOG` taking precedence when set
//! - `--silent` caps output at errors regardless of verbosity

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map the CLI verbosity flags onto a level filter.
pub fn level_for(verbose: u8, silent: bool) -> LevelFilter {
    if silent {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Initialize the global subscriber. Call once, before any stage runs.
pub fn init(verbose: u8, silent: bool) {
    let fallback = format!("backbone={},tower_http=warn", level_for(verbose, silent));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_caps_at_error() {
        assert_eq!(level_for(0, true), LevelFilter::ERROR);
        assert_eq!(level_for(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn test_verbosity_steps() {
        assert_eq!(level_for(0, false), LevelFilter::INFO);
        assert_eq!(level_for(1, false), LevelFilter::DEBUG);
        assert_eq!(level_for(2, false), LevelFilter::TRACE);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
    }
}
