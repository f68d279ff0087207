//! Core application routes and the catch-all error route.
//!
//! Registration is split in two on purpose: `register_routes` runs before the
//! addon stage, `register_error_route` after it, so addon-provided routes are
//! never shadowed by the generic fallback.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::http::server::AppState;
use crate::messaging::session::ws_handler;
use crate::storage::StorageState;

/// Register the core API routes and the WebSocket endpoint.
pub fn register_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(index))
        .route("/api/v0/status", get(status))
        .route("/api/v0/version", get(version))
        .route("/socket", get(ws_handler))
}

/// Register the catch-all error route. Must be installed last.
pub fn register_error_route(router: Router<AppState>) -> Router<AppState> {
    router.fallback(not_found)
}

async fn index(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "environment": state.config.environment.to_string(),
    }))
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let connected = state.storage.state().await == StorageState::Connected;
    Json(json!({
        "status": "ok",
        "environment": state.config.environment.to_string(),
        "sessions": state.hub.session_count(),
        "storage": {
            "driver": state.storage.driver_name(),
            "connected": connected,
        },
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not found",
            "path": uri.path(),
        })),
    )
}
