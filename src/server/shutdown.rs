//! Stop requests for the health service
//!
//! Shutdown is a cancellation channel rather than a signal handler:
//! - `ShutdownController` requests a stop (first call drains, second forces)
//! - `ShutdownSignal` is cloned into whatever needs to observe it
//!
//! OS signals (SIGTERM/SIGINT) are forwarded into the channel by
//! [`forward_signals`], so the shutdown sequence itself never touches signals.

use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Where the process is in its shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    /// Serving normally
    Running,
    /// Stop requested: refuse new connections, let in-flight requests finish
    Draining,
    /// Stop requested again: give up waiting for in-flight requests
    Forced,
}

/// Receiving side of the shutdown channel
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<ShutdownPhase>,
}

impl ShutdownSignal {
    /// Wait until a stop has been requested
    ///
    /// Returns immediately if the controller was dropped.
    pub async fn wait(&mut self) {
        // Err means the sender is gone, treat as shutdown
        let _ = self
            .receiver
            .wait_for(|phase| *phase != ShutdownPhase::Running)
            .await;
    }

    /// Wait until shutdown has been forced
    ///
    /// Never completes if the controller is dropped before forcing.
    pub async fn wait_forced(&mut self) {
        if self
            .receiver
            .wait_for(|phase| *phase == ShutdownPhase::Forced)
            .await
            .is_err()
        {
            std::future::pending::<()>().await;
        }
    }

    /// Current phase (non-blocking)
    pub(crate) fn phase(&self) -> ShutdownPhase {
        *self.receiver.borrow()
    }

    /// Check if a stop was requested (non-blocking)
    pub fn is_shutdown(&self) -> bool {
        self.phase() != ShutdownPhase::Running
    }
}

/// Sending side of the shutdown channel
pub struct ShutdownController {
    sender: watch::Sender<ShutdownPhase>,
}

impl ShutdownController {
    /// Request a stop, escalating on repeated calls
    ///
    /// `Running -> Draining` on the first call, `Forced` on every later one.
    /// Returns the phase after the request.
    pub fn shutdown(&self) -> ShutdownPhase {
        let mut next = ShutdownPhase::Draining;
        self.sender.send_modify(|phase| {
            *phase = match *phase {
                ShutdownPhase::Running => ShutdownPhase::Draining,
                ShutdownPhase::Draining | ShutdownPhase::Forced => ShutdownPhase::Forced,
            };
            next = *phase;
        });

        match next {
            ShutdownPhase::Forced => warn!("Repeated stop request, forcing shutdown"),
            _ => debug!("Shutdown signal sent"),
        }
        next
    }

    /// Create another receiver for this channel
    #[cfg(test)]
    pub(crate) fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Create a new shutdown channel
///
/// Returns (controller, signal) where:
/// - controller: Used to request shutdown
/// - signal: Cloned and passed to components that need to observe it
pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (sender, receiver) = watch::channel(ShutdownPhase::Running);
    (ShutdownController { sender }, ShutdownSignal { receiver })
}

/// Termination signals the process listens for
///
/// Handlers are registered once up front so that a second signal arriving
/// mid-shutdown is not lost.
pub struct SignalListener {
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// Register SIGTERM and SIGINT handlers
    #[cfg(unix)]
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal, returning its name
    #[cfg(unix)]
    pub async fn recv(&mut self) -> std::io::Result<&'static str> {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("Received SIGTERM");
                Ok("SIGTERM")
            }
            _ = self.sigint.recv() => {
                debug!("Received SIGINT");
                Ok("SIGINT")
            }
        }
    }

    /// Wait for Ctrl+C (Windows)
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> std::io::Result<&'static str> {
        tokio::signal::ctrl_c().await?;
        debug!("Received Ctrl+C");
        Ok("CTRL_C")
    }
}

/// Turn termination signals into stop requests until shutdown is forced
pub async fn forward_signals(mut signals: SignalListener, controller: ShutdownController) {
    loop {
        match signals.recv().await {
            Ok(signal) => {
                debug!(signal = signal, "Stop requested");
                if controller.shutdown() == ShutdownPhase::Forced {
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to wait for termination signal");
                // Keep holding the controller, dropping it reads as a stop request
                std::future::pending::<()>().await;
            }
        }
    }
}
