//! HTTP server handle and listening state machine.
//!
//! # State Transitions
//! ```text
//! Created → Listening: bind() during the final startup stage
//! Listening → Closed: coordinator drains in-flight requests and joins the
//!                     serve task (bounded by its shutdown step)
//! ```
//!
//! # Design Decisions
//! - The handle is owned exclusively by the orchestration paths; nothing else
//!   may close it
//! - Bind failures are classified at the seam: permission errors on
//!   low-numbered ports get a dedicated diagnostic with a remediation hint
//! - Serving runs on a spawned task; close is signalled through a watch
//!   channel so the coordinator can bound the drain without cancelling it

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::events::EventBus;
use crate::lifecycle::startup::StartupError;
use crate::messaging::MessagingHub;
use crate::storage::StorageHandle;

/// Shared state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub events: EventBus,
    pub hub: Arc<MessagingHub>,
    pub storage: Arc<StorageHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Listening,
    Closed,
}

/// Owns the listening socket state.
pub struct ServerHandle {
    state: ServerState,
    listener: Option<TcpListener>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<watch::Sender<bool>>,
    serve_task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn new() -> Self {
        Self {
            state: ServerState::Created,
            listener: None,
            local_addr: None,
            shutdown_tx: None,
            serve_task: None,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Port actually bound; differs from the configured port when it was 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listening socket.
    pub async fn bind(&mut self, config: &AppConfig) -> Result<(), StartupError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| classify_bind_error(e, &addr, config.server.port))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| StartupError::Bind { addr: addr.clone(), source: e })?;

        self.listener = Some(listener);
        self.local_addr = Some(local_addr);
        self.state = ServerState::Listening;
        tracing::info!(address = %local_addr, "listening socket bound");
        Ok(())
    }

    /// Start serving the finished router on the bound socket.
    pub fn serve(&mut self, router: Router) -> Result<(), StartupError> {
        let listener = self.listener.take().ok_or(StartupError::NotBound)?;
        let (tx, mut rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.changed().await;
            };
            if let Err(e) = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "server terminated abnormally");
            }
        });

        self.shutdown_tx = Some(tx);
        self.serve_task = Some(task);
        Ok(())
    }

    /// Take the drain future for the coordinator to run under its bound.
    ///
    /// Signals the serve loop to stop accepting, then waits for in-flight
    /// requests to finish. Returns `None` if the server never served or is
    /// already closed.
    pub fn begin_close(&mut self) -> Option<impl std::future::Future<Output = ()> + Send + 'static> {
        if self.state != ServerState::Listening {
            return None;
        }
        let tx = self.shutdown_tx.take();
        let task = self.serve_task.take();
        if tx.is_none() && task.is_none() {
            return None;
        }
        Some(async move {
            if let Some(tx) = tx {
                let _ = tx.send(true);
            }
            if let Some(task) = task {
                let _ = task.await;
            }
        })
    }

    /// Record the terminal state once the coordinator's step has run.
    ///
    /// Called whether or not the drain finished inside its bound; a drain
    /// still running in the background keeps the spawned task, not the handle.
    pub fn mark_closed(&mut self) {
        if self.state != ServerState::Closed {
            self.state = ServerState::Closed;
            tracing::info!("server closed");
        }
    }
}

impl Default for ServerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a bind error to a startup diagnostic.
fn classify_bind_error(e: std::io::Error, addr: &str, port: u16) -> StartupError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied if port < 1024 => {
            StartupError::PrivilegedPort { port }
        }
        std::io::ErrorKind::AddrInUse => StartupError::AddrInUse {
            addr: addr.to_string(),
        },
        _ => StartupError::Bind {
            addr: addr.to_string(),
            source: e,
        },
    }
}
