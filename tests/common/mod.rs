//! Shared utilities for the lifecycle integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use backbone::config::CliArgs;
use backbone::storage::{Storage, StorageError};

/// CLI args for a test instance: loopback, ephemeral port, test environment.
pub fn test_args(extra: &[&str]) -> CliArgs {
    use clap::Parser;
    // Default loopback/ephemeral-port/test-env flags, each skipped when `extra`
    // already overrides it so the same flag is never passed to clap twice.
    let defaults: [(&str, &str); 3] = [
        ("--listen", "127.0.0.1"),
        ("--port", "0"),
        ("--env", "test"),
    ];
    let mut argv: Vec<&str> = vec!["backbone"];
    for (flag, value) in defaults {
        if !extra.contains(&flag) {
            argv.push(flag);
            argv.push(value);
        }
    }
    argv.extend_from_slice(extra);
    CliArgs::parse_from(argv)
}

/// Write a TOML config file under the temp dir, unique per test name.
#[allow(dead_code)]
pub fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "backbone-test-{}-{}.toml",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

/// Storage double that records lifecycle calls.
pub struct RecordingStore {
    fail_connect: bool,
    pub connects: AtomicU32,
    pub disconnects: AtomicU32,
    pub collections: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_connect: false,
            connects: AtomicU32::new(0),
            disconnects: AtomicU32::new(0),
            collections: Mutex::new(Vec::new()),
        })
    }

    #[allow(dead_code)]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_connect: true,
            connects: AtomicU32::new(0),
            disconnects: AtomicU32::new(0),
            collections: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Storage for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn connect(&self) -> Result<(), StorageError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(StorageError::Connect {
                url: "recording://".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), StorageError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ensure_collection(&self, name: &str) -> Result<(), StorageError> {
        self.collections.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
