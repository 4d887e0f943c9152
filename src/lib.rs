//! healthd: a minimal HTTP health-check service
//!
//! Answers `OK` on a single health route, logs each request, and shuts down
//! within a bounded grace period when asked to stop.

pub mod config;
pub mod logging;
pub mod server;

pub use config::{Config, ConfigError};
pub use server::{exit_status, run, ServiceError};
