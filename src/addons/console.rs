//! Built-in console addon: a minimal HTML status page.
//!
//! Stands in for a bundled web UI. Registered like any other addon, which
//! keeps the manager's lifecycle exercised even with no third-party addons
//! installed.

use async_trait::async_trait;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::addons::{Addon, AddonContext, AddonError};
use crate::http::server::AppState;

pub struct ConsoleAddon;

impl ConsoleAddon {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleAddon {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Addon for ConsoleAddon {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn init(&self, ctx: &AddonContext) -> Result<(), AddonError> {
        tracing::debug!(environment = %ctx.config.environment, "console addon initialized");
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        Router::new().route("/console", get(console_page))
    }
}

async fn console_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><title>backbone console</title></head>\n\
         <body><h1>backbone</h1>\
         <p>version {} &mdash; {} mode</p>\
         <p>{} messaging client(s) connected</p></body></html>",
        env!("CARGO_PKG_VERSION"),
        state.config.environment,
        state.hub.session_count(),
    ))
}
