//! Health-check endpoint
//!
//! A single route (`/healthz` by default) that answers every method with
//! `200 OK`, `text/plain; charset=utf-8`, body `OK\n`.

use axum::{
    extract::ConnectInfo,
    http::{header::CONTENT_TYPE, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use tracing::info;

/// Response body for a healthy process
pub const HEALTH_BODY: &str = "OK\n";

/// Content type of the health response
pub const HEALTH_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Liveness handler
///
/// Always returns 200 OK - if this responds, the process is alive.
/// Logs exactly one line per request.
async fn health(
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
) -> impl IntoResponse {
    info!(
        path = %uri.path(),
        method = %method,
        remote = %remote,
        "Served health check request"
    );

    (StatusCode::OK, [(CONTENT_TYPE, HEALTH_CONTENT_TYPE)], HEALTH_BODY)
}

/// Build the router serving the health route at `path`
///
/// The router expects `ConnectInfo<SocketAddr>`, so serve it through
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(path: &str) -> Router {
    Router::new().route(path, any(health))
}
