//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file; every
//! field has a default so a minimal (or absent) file is valid. The loaded
//! snapshot is read-only: nothing mutates an `AppConfig` after startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the application server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listening socket and advertised URL settings.
    pub server: ServerConfig,

    /// Environment the server runs in.
    pub environment: Environment,

    /// Storage connection settings.
    pub database: DatabaseConfig,

    /// Per-step graceful shutdown bounds.
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// Address string handed to the socket bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.listen, self.server.port)
    }

    /// Advertised URL for the given bound port.
    ///
    /// The port is passed in rather than read from `server.port` so that
    /// ephemeral-port configs (port 0) advertise the port actually bound.
    pub fn listen_url(&self, actual_port: u16) -> String {
        format!(
            "{}://{}:{}",
            self.server.protocol.scheme(),
            self.server.listen,
            actual_port
        )
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on (hostname or IP).
    pub listen: String,

    /// Port to listen on. Port 0 binds an ephemeral port.
    pub port: u16,

    /// Scheme used in the advertised URL.
    pub protocol: Protocol,

    /// Per-request timeout applied by the middleware stack.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "localhost".to_string(),
            port: 3000,
            protocol: Protocol::Http,
            request_timeout_secs: 30,
        }
    }
}

/// URL scheme the server advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Named environment the server runs in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Storage connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Storage connection URL. Only the `memory://` scheme is recognized.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "memory://backbone".to_string(),
        }
    }
}

/// Bounds for the graceful shutdown cascade.
///
/// Each step gets an independent timeout; the worst-case total shutdown
/// latency is their sum.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Bound on closing the messaging layer, in milliseconds.
    pub messaging_close_ms: u64,

    /// Bound on draining and closing the request server, in milliseconds.
    pub server_close_ms: u64,
}

impl ShutdownConfig {
    pub fn messaging_close(&self) -> Duration {
        Duration::from_millis(self.messaging_close_ms)
    }

    pub fn server_close(&self) -> Duration {
        Duration::from_millis(self.server_close_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            messaging_close_ms: 1_000,
            server_close_ms: 5_000,
        }
    }
}
