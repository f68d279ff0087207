//! Configuration validation.
//!
//! Semantic checks only; serde already enforced the syntactic shape. All
//! violations are collected and returned together, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listen address must not be empty")]
    EmptyListen,

    #[error("storage url '{url}' is not a valid URL: {reason}")]
    InvalidStorageUrl { url: String, reason: String },

    #[error("unsupported storage scheme '{scheme}' in '{url}' (expected memory://)")]
    UnsupportedStorageScheme { scheme: String, url: String },
}

/// Validate the configuration snapshot before it is accepted.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.listen.trim().is_empty() {
        errors.push(ValidationError::EmptyListen);
    }

    match Url::parse(&config.database.url) {
        Ok(url) => {
            if url.scheme() != "memory" {
                errors.push(ValidationError::UnsupportedStorageScheme {
                    scheme: url.scheme().to_string(),
                    url: config.database.url.clone(),
                });
            }
        }
        Err(e) => errors.push(ValidationError::InvalidStorageUrl {
            url: config.database.url.clone(),
            reason: e.to_string(),
        }),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
