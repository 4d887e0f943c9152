//! Shared helpers for the signal tests
//!
//! Each signal test lives in its own test binary: a SIGTERM sent to the test
//! process reaches every listener in it.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::routing::get;
use axum::Router;
use healthd::server::{build_router, serve, ServiceError, ShutdownSignal};
use std::net::SocketAddr;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Health router plus a `/slow` route that never finishes in time
pub fn router_with_slow_route(entered: Arc<Notify>) -> Router {
    build_router("/healthz").route(
        "/slow",
        get(move || {
            let entered = entered.clone();
            async move {
                entered.notify_one();
                tokio::time::sleep(Duration::from_secs(60)).await;
                "done"
            }
        }),
    )
}

/// Serve on an ephemeral loopback port in the background
pub async fn spawn_server(
    router: Router,
    shutdown: ShutdownSignal,
    grace: Duration,
) -> (SocketAddr, JoinHandle<Result<(), ServiceError>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(serve(listener, router, shutdown, grace));
    (addr, handle)
}

/// Start a request to `/slow` and return once the handler is running
pub async fn hold_connection_open(addr: SocketAddr, entered: &Notify) {
    let _ = tokio::spawn(reqwest::get(format!("http://{}/slow", addr)));
    tokio::time::timeout(Duration::from_secs(5), entered.notified())
        .await
        .expect("slow handler never started");
}

/// Deliver SIGTERM to this test process
pub fn send_sigterm() {
    let status = Command::new("kill")
        .arg("-TERM")
        .arg(std::process::id().to_string())
        .status()
        .expect("failed to run kill");
    assert!(status.success());
}
