//! Serving and the bounded shutdown sequence
//!
//! Once a stop is requested the server stops accepting connections and
//! in-flight requests get `grace` to finish. Draining in time is a clean
//! exit; running out of time, or a second stop request, is an error.

use crate::config::Config;
use crate::server::health::build_router;
use crate::server::shutdown::ShutdownSignal;
use axum::Router;
use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),

    #[error("Server stopped before shutdown was requested")]
    ListenerClosed,

    #[error("In-flight requests did not finish within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("Shutdown forced by repeated stop request")]
    ForcedShutdown,
}

/// Process exit status for the outcome of [`run`]
///
/// 0 for a clean shutdown, 1 for any failure.
pub fn exit_status(result: &Result<(), ServiceError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Run the health service until `shutdown` fires
///
/// Binds `config.listen_addr()`, serves the health route and then runs the
/// bounded shutdown sequence. Every error is logged before it is returned.
pub async fn run(config: &Config, shutdown: ShutdownSignal) -> Result<(), ServiceError> {
    let listener = bind(config.listen_addr()).await?;

    // Log after successful bind - server is actually listening
    let port = listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(config.port);
    info!(
        port = port,
        url = %format!("http://localhost:{}{}", port, config.health_path),
        "Starting server"
    );

    serve(
        listener,
        build_router(&config.health_path),
        shutdown,
        config.shutdown_grace,
    )
    .await
}

/// Bind the TCP listener, logging on failure
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServiceError> {
    TcpListener::bind(addr).await.map_err(|source| {
        error!(addr = %addr, error = %source, "Could not start server");
        ServiceError::Bind { addr, source }
    })
}

/// Serve `router` on `listener` until `shutdown` fires, then drain
///
/// The accept loop stops as soon as the stop request is observed; requests
/// already accepted keep running for up to `grace`.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: ShutdownSignal,
    grace: Duration,
) -> Result<(), ServiceError> {
    let mut stop_accepting = shutdown.clone();
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { stop_accepting.wait().await })
    .into_future();

    run_until_shutdown(server, shutdown, grace).await
}

/// Drive `server` until a stop request, then give it `grace` to finish
///
/// `server` must itself stop accepting work when `shutdown` fires. If it is
/// still running when the deadline passes (or the stop is forced) it is
/// dropped and an error is returned.
pub async fn run_until_shutdown<F>(
    server: F,
    mut shutdown: ShutdownSignal,
    grace: Duration,
) -> Result<(), ServiceError>
where
    F: Future<Output = io::Result<()>>,
{
    tokio::pin!(server);

    tokio::select! {
        biased;

        _ = shutdown.wait() => {}
        result = &mut server => {
            let err = match result {
                Ok(()) => ServiceError::ListenerClosed,
                Err(e) => ServiceError::Serve(e),
            };
            error!(error = %err, "Server stopped unexpectedly");
            return Err(err);
        }
    }

    info!(grace_period = ?grace, "Shutting down server");

    let outcome = tokio::select! {
        result = &mut server => result.map_err(ServiceError::Serve),
        _ = tokio::time::sleep(grace) => Err(ServiceError::ShutdownTimeout(grace)),
        _ = shutdown.wait_forced() => Err(ServiceError::ForcedShutdown),
    };

    match &outcome {
        Ok(()) => info!("Server exiting gracefully"),
        Err(e) => error!(error = %e, "Server forced to shutdown"),
    }
    outcome
}
