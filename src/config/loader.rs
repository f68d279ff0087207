//! Configuration loading: TOML file plus command-line overrides.
//!
//! Precedence, lowest to highest: schema defaults → config file → CLI flags.
//! The result is validated once and frozen before any startup stage runs.

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::{AppConfig, Environment, Protocol};
use crate::config::validation::{validate_config, ValidationError};

/// Command-line arguments.
///
/// `--help` is handled by clap before any of this is consulted: usage is
/// printed and the process exits 0 without running a single stage.
#[derive(Debug, Clone, Parser)]
#[command(name = "backbone", version, about = "Application server with staged startup and bounded graceful shutdown")]
pub struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    pub listen: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Advertise the listen URL over https.
    #[arg(long)]
    pub https: bool,

    /// Environment to run in.
    #[arg(long, value_enum)]
    pub env: Option<Environment>,

    /// Storage connection URL.
    #[arg(long)]
    pub database_url: Option<String>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(long, conflicts_with = "verbose")]
    pub silent: bool,
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "cannot parse {}: {}", path.display(), e),
            ConfigError::Validation(errors) => {
                write!(f, "invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, merge, and validate the configuration snapshot.
pub fn load(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            let content =
                fs::read_to_string(path).map_err(|e| ConfigError::Io(path.clone(), e))?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.clone(), e))?
        }
        None => AppConfig::default(),
    };

    apply_cli_overrides(&mut config, args);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_cli_overrides(config: &mut AppConfig, args: &CliArgs) {
    if let Some(listen) = &args.listen {
        config.server.listen = listen.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.https {
        config.server.protocol = Protocol::Https;
    }
    if let Some(env) = args.env {
        config.environment = env;
    }
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }
}
