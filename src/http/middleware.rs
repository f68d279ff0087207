//! Request-handling middleware stack.
//!
//! # Responsibilities
//! - Tag every request with a unique ID as early as possible
//! - Trace request/response pairs
//! - Bound request handling time
//!
//! # Design Decisions
//! - The stack is applied once, to the finished router, so it wraps core
//!   routes, addon routes, and the error route alike

use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::Router;
use tower::{Layer, Service};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Wrap the finished router with the middleware stack.
pub fn apply(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(RequestIdLayer)
        .layer(TraceLayer::new_for_http())
}

/// Layer that assigns a UUID request ID when the client did not send one.
#[derive(Debug, Clone, Copy)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestId<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestId { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestId<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestId<S>
where
    S: Service<Request<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        if !req.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                req.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(req)
    }
}
