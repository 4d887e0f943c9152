//! HTTP server for the health endpoint
//!
//! - `/healthz` (configurable) - Liveness check (process is running)
//!
//! Also provides the stop channel and the bounded graceful shutdown sequence
//! for SIGTERM/SIGINT.

mod health;
mod service;
pub mod shutdown;

pub use health::{build_router, HEALTH_BODY, HEALTH_CONTENT_TYPE};
pub use service::{bind, exit_status, run, run_until_shutdown, serve, ServiceError};
pub use shutdown::{
    forward_signals, shutdown_channel, ShutdownController, ShutdownPhase, ShutdownSignal,
    SignalListener,
};


#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "service_test.rs"]
mod service_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
