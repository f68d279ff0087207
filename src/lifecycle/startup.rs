//! Startup orchestration: the stage sequencer and the application builder.
//!
//! # Responsibilities
//! - Execute the fixed, ordered list of initialization stages
//! - Short-circuit on the first failure with stage context; no rollback
//! - Hand the assembled services to the shutdown coordinator
//!
//! # Design Decisions
//! - Stages are plain functions over a shared `BootContext`, declared once in
//!   `STAGES`; the order is fixed at build time
//! - A later stage never starts before the prior stage's future resolves
//! - Addons register after the application routes and before the catch-all
//!   error route, so addon-provided routes are not shadowed

use std::sync::Arc;

use axum::Router;
use futures_util::future::BoxFuture;
use serde_json::json;
use thiserror::Error;

use crate::addons::{AddonContext, AddonError, AddonManager};
use crate::config::{self, AppConfig, CliArgs, ConfigError};
use crate::events::{topic, EventBus};
use crate::http::middleware;
use crate::http::routes;
use crate::http::server::{AppState, ServerHandle};
use crate::lifecycle::shutdown::ShutdownCoordinator;
use crate::lifecycle::signals;
use crate::messaging::MessagingHub;
use crate::storage::{self, Storage, StorageError, StorageHandle};

/// Fatal startup failures. Any of these aborts the remaining stages.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration stage failed: {0}")]
    Config(#[from] ConfigError),

    #[error("storage stage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("addon stage failed: {0}")]
    Addon(#[from] AddonError),

    #[error("cannot bind port {port}: permission denied; ports below 1024 require elevated privileges")]
    PrivilegedPort { port: u16 },

    #[error("cannot bind {addr}: address already in use")]
    AddrInUse { addr: String },

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server is not bound")]
    NotBound,

    #[error("startup sequencing error: {0}")]
    Sequence(&'static str),
}

/// Mutable state threaded through the startup stages.
///
/// Each stage fills in the resources the following stages consume; the
/// accessors return a sequencing error rather than panicking if a stage ever
/// observes a predecessor's resource missing.
pub struct BootContext {
    args: CliArgs,
    storage_override: Option<Arc<dyn Storage>>,
    events: EventBus,
    hub: Arc<MessagingHub>,
    addons: AddonManager,
    config: Option<Arc<AppConfig>>,
    storage: Option<Arc<StorageHandle>>,
    state: Option<AppState>,
    router: Option<Router<AppState>>,
    request_timeout: Option<std::time::Duration>,
    server: ServerHandle,
}

impl BootContext {
    fn new(args: CliArgs, storage_override: Option<Arc<dyn Storage>>, events: EventBus) -> Self {
        Self {
            args,
            storage_override,
            events,
            hub: Arc::new(MessagingHub::new()),
            addons: AddonManager::new(),
            config: None,
            storage: None,
            state: None,
            router: None,
            request_timeout: None,
            server: ServerHandle::new(),
        }
    }

    fn config(&self) -> Result<&Arc<AppConfig>, StartupError> {
        self.config
            .as_ref()
            .ok_or(StartupError::Sequence("configuration not resolved yet"))
    }

    fn storage(&self) -> Result<&Arc<StorageHandle>, StartupError> {
        self.storage
            .as_ref()
            .ok_or(StartupError::Sequence("storage not connected yet"))
    }

    fn take_router(&mut self) -> Result<Router<AppState>, StartupError> {
        self.router
            .take()
            .ok_or(StartupError::Sequence("router not configured yet"))
    }
}

type StageFuture<'a> = BoxFuture<'a, Result<(), StartupError>>;

/// One ordered unit of startup work.
pub struct Stage {
    pub name: &'static str,
    run: for<'a> fn(&'a mut BootContext) -> StageFuture<'a>,
}

/// The fixed startup order.
pub const STAGES: &[Stage] = &[
    Stage { name: "resolve configuration", run: resolve_config },
    Stage { name: "connect storage", run: connect_storage },
    Stage { name: "register models", run: register_models },
    Stage { name: "configure middleware", run: configure_middleware },
    Stage { name: "register routes", run: register_routes },
    Stage { name: "initialize addons", run: initialize_addons },
    Stage { name: "register error route", run: register_error_route },
    Stage { name: "bind listener", run: bind_listener },
];

/// Execute stages strictly in order, aborting on the first failure.
async fn run_stages(stages: &[Stage], cx: &mut BootContext) -> Result<(), StartupError> {
    for stage in stages {
        tracing::debug!(stage = stage.name, "startup stage starting");
        if let Err(e) = (stage.run)(cx).await {
            tracing::error!(stage = stage.name, error = %e, "startup stage failed");
            return Err(e);
        }
        tracing::debug!(stage = stage.name, "startup stage complete");
    }
    Ok(())
}

fn resolve_config(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let config = config::load(&cx.args)?;
        tracing::info!(
            environment = %config.environment,
            database = %config.database.url,
            "configuration resolved"
        );
        cx.config = Some(Arc::new(config));
        Ok(())
    })
}

fn connect_storage(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let config = cx.config()?.clone();
        let store = match cx.storage_override.take() {
            Some(store) => store,
            None => storage::open(&config.database.url)?,
        };
        let handle = Arc::new(StorageHandle::new(store));
        handle.connect().await?;
        cx.storage = Some(handle);
        Ok(())
    })
}

fn register_models(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        storage::models::register_all(cx.storage()?).await?;
        Ok(())
    })
}

fn configure_middleware(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let state = AppState {
            config: cx.config()?.clone(),
            events: cx.events.clone(),
            hub: cx.hub.clone(),
            storage: cx.storage()?.clone(),
        };
        cx.state = Some(state);
        cx.request_timeout = Some(cx.config()?.server.request_timeout());
        cx.router = Some(Router::new());
        Ok(())
    })
}

fn register_routes(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let router = cx.take_router()?;
        cx.router = Some(routes::register_routes(router));
        Ok(())
    })
}

fn initialize_addons(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let ctx = AddonContext {
            config: cx.config()?.clone(),
            events: cx.events.clone(),
            hub: cx.hub.clone(),
        };
        cx.addons.init(ctx).await?;
        cx.addons.load().await?;
        let router = cx.take_router()?;
        cx.router = Some(cx.addons.register(router).await?);
        Ok(())
    })
}

fn register_error_route(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let router = cx.take_router()?;
        cx.router = Some(routes::register_error_route(router));
        Ok(())
    })
}

fn bind_listener(cx: &mut BootContext) -> StageFuture<'_> {
    Box::pin(async move {
        let config = cx.config()?.clone();
        cx.server.bind(&config).await?;
        let local_addr = cx.server.local_addr().ok_or(StartupError::NotBound)?;

        let state = cx
            .state
            .take()
            .ok_or(StartupError::Sequence("app state not configured yet"))?;
        let request_timeout = cx
            .request_timeout
            .ok_or(StartupError::Sequence("middleware not configured yet"))?;
        let router = cx.take_router()?.with_state(state);
        let app = middleware::apply(router, request_timeout);

        cx.hub.activate();
        cx.server.serve(app)?;

        let url = config.listen_url(local_addr.port());
        tracing::info!(url = %url, environment = %config.environment, "server started");
        cx.events.publish(topic::START_LISTENING, json!({ "url": url }));
        Ok(())
    })
}

/// Application builder: collects the inputs, runs the startup pipeline.
pub struct App {
    args: CliArgs,
    events: EventBus,
    storage_override: Option<Arc<dyn Storage>>,
}

impl App {
    pub fn new(args: CliArgs) -> Self {
        Self {
            args,
            events: EventBus::new(),
            storage_override: None,
        }
    }

    /// Use an externally constructed event bus, letting a harness subscribe
    /// before startup emits anything.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Replace the URL-resolved storage driver. Test seam.
    pub fn with_storage(mut self, store: Arc<dyn Storage>) -> Self {
        self.storage_override = Some(store);
        self
    }

    /// Run every startup stage in order.
    ///
    /// On success the server is listening and `start_listening` has been
    /// published. On failure the remaining stages were skipped and the error
    /// names the failing stage.
    pub async fn start(self) -> Result<RunningApp, StartupError> {
        let mut cx = BootContext::new(self.args, self.storage_override, self.events);
        run_stages(STAGES, &mut cx).await?;

        let config = cx
            .config
            .clone()
            .ok_or(StartupError::Sequence("configuration missing after startup"))?;
        let storage = cx
            .storage
            .clone()
            .ok_or(StartupError::Sequence("storage missing after startup"))?;
        let local_addr = cx.server.local_addr().ok_or(StartupError::NotBound)?;

        let coordinator = Arc::new(ShutdownCoordinator::new(
            config.shutdown.clone(),
            cx.hub.clone(),
            cx.server,
            storage.clone(),
        ));

        Ok(RunningApp {
            config,
            events: cx.events,
            hub: cx.hub,
            storage,
            coordinator,
            local_addr,
        })
    }
}

/// A started application: the export surface external harnesses drive.
pub struct RunningApp {
    config: Arc<AppConfig>,
    events: EventBus,
    hub: Arc<MessagingHub>,
    storage: Arc<StorageHandle>,
    coordinator: Arc<ShutdownCoordinator>,
    local_addr: std::net::SocketAddr,
}

impl std::fmt::Debug for RunningApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningApp")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

impl RunningApp {
    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn hub(&self) -> Arc<MessagingHub> {
        self.hub.clone()
    }

    pub fn storage(&self) -> Arc<StorageHandle> {
        self.storage.clone()
    }

    pub fn coordinator(&self) -> Arc<ShutdownCoordinator> {
        self.coordinator.clone()
    }

    /// Socket address actually bound.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Advertised URL, matching the `start_listening` payload.
    pub fn url(&self) -> String {
        self.config.listen_url(self.local_addr.port())
    }

    /// Run the shutdown cascade. Safe to call more than once.
    pub async fn shutdown(&self) -> i32 {
        self.coordinator.shutdown().await
    }

    /// Block until the termination signal, then shut down.
    ///
    /// Returns the process exit code.
    pub async fn run_until_signal(self) -> i32 {
        signals::run(self.coordinator.clone()).await
    }
}
