//! Addon subsystem: pluggable extensions loaded during startup.
//!
//! # Data Flow
//! ```text
//! Sequencer stage "initialize addons":
//!     init(ctx)   stores the config, event bus, and hub for the addons
//!     load()      builds the registry and initializes every addon
//!     register()  merges addon routers into the application router
//! ```
//!
//! # Design Decisions
//! - Addons register after the application routes and before the catch-all
//!   error route, so an addon may install its own static or fallback routes
//!   without being shadowed
//! - Any addon failure is a fatal startup failure; there is no partial mode

pub mod console;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use thiserror::Error;

use crate::config::AppConfig;
use crate::events::EventBus;
use crate::http::server::AppState;
use crate::messaging::MessagingHub;

/// Errors from the addon subsystem.
#[derive(Debug, Error)]
pub enum AddonError {
    #[error("addon '{name}' failed to initialize: {reason}")]
    Init { name: String, reason: String },

    #[error("addon manager lifecycle out of order: expected {expected}")]
    OutOfOrder { expected: &'static str },
}

/// Services handed to every addon at initialization.
#[derive(Clone)]
pub struct AddonContext {
    pub config: Arc<AppConfig>,
    pub events: EventBus,
    pub hub: Arc<MessagingHub>,
}

/// A pluggable extension.
#[async_trait]
pub trait Addon: Send + Sync {
    fn name(&self) -> &'static str;

    async fn init(&self, ctx: &AddonContext) -> Result<(), AddonError>;

    /// Routes the addon contributes to the application router.
    fn routes(&self) -> Router<AppState>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagerPhase {
    Created,
    Initialized,
    Loaded,
    Registered,
}

/// Sequenced addon lifecycle, driven by the startup sequencer.
pub struct AddonManager {
    phase: ManagerPhase,
    ctx: Option<AddonContext>,
    addons: Vec<Arc<dyn Addon>>,
}

impl AddonManager {
    pub fn new() -> Self {
        Self {
            phase: ManagerPhase::Created,
            ctx: None,
            addons: Vec::new(),
        }
    }

    /// Store the shared services addons will be initialized with.
    pub async fn init(&mut self, ctx: AddonContext) -> Result<(), AddonError> {
        if self.phase != ManagerPhase::Created {
            return Err(AddonError::OutOfOrder { expected: "init" });
        }
        self.ctx = Some(ctx);
        self.phase = ManagerPhase::Initialized;
        Ok(())
    }

    /// Build the addon registry and initialize every addon in order.
    pub async fn load(&mut self) -> Result<(), AddonError> {
        if self.phase != ManagerPhase::Initialized {
            return Err(AddonError::OutOfOrder { expected: "load" });
        }
        let ctx = self
            .ctx
            .clone()
            .ok_or(AddonError::OutOfOrder { expected: "load" })?;

        self.addons = builtin_addons();
        for addon in &self.addons {
            addon.init(&ctx).await?;
            tracing::info!(addon = addon.name(), "addon loaded");
        }
        self.phase = ManagerPhase::Loaded;
        Ok(())
    }

    /// Merge every addon's routes into the application router.
    pub async fn register(
        &mut self,
        mut router: Router<AppState>,
    ) -> Result<Router<AppState>, AddonError> {
        if self.phase != ManagerPhase::Loaded {
            return Err(AddonError::OutOfOrder { expected: "register" });
        }
        for addon in &self.addons {
            router = router.merge(addon.routes());
            tracing::debug!(addon = addon.name(), "addon routes registered");
        }
        self.phase = ManagerPhase::Registered;
        Ok(router)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.addons.iter().map(|a| a.name()).collect()
    }
}

impl Default for AddonManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Addons shipped with the server.
fn builtin_addons() -> Vec<Arc<dyn Addon>> {
    vec![Arc::new(console::ConsoleAddon::new())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ctx() -> AddonContext {
        AddonContext {
            config: Arc::new(AppConfig::default()),
            events: EventBus::new(),
            hub: Arc::new(MessagingHub::new()),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_must_run_in_order() {
        let mut manager = AddonManager::new();
        assert!(matches!(
            manager.load().await,
            Err(AddonError::OutOfOrder { expected: "load" })
        ));

        manager.init(test_ctx()).await.unwrap();
        assert!(matches!(
            manager.register(Router::new()).await,
            Err(AddonError::OutOfOrder { expected: "register" })
        ));

        manager.load().await.unwrap();
        assert!(manager.register(Router::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_load_builds_builtin_registry() {
        let mut manager = AddonManager::new();
        manager.init(test_ctx()).await.unwrap();
        manager.load().await.unwrap();
        assert_eq!(manager.names(), vec!["console"]);
    }

    #[tokio::test]
    async fn test_double_init_rejected() {
        let mut manager = AddonManager::new();
        manager.init(test_ctx()).await.unwrap();
        assert!(matches!(
            manager.init(test_ctx()).await,
            Err(AddonError::OutOfOrder { expected: "init" })
        ));
    }
}
