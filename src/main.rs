use healthd::logging::{self, LogFormat};
use healthd::server::{exit_status, forward_signals, run, shutdown_channel, SignalListener};
use healthd::Config;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_logging(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.log_format);

    // Register handlers before serving so an early signal is not missed
    let signals = match SignalListener::new() {
        Ok(signals) => signals,
        Err(e) => {
            error!(error = %e, "Failed to register signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    tokio::spawn(forward_signals(signals, shutdown_controller));

    // Errors are logged where they happen; only the exit status is left
    let result = run(&config, shutdown_signal).await;
    ExitCode::from(exit_status(&result))
}

fn init_logging(format: LogFormat) {
    if let Err(e) = logging::init(format) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
