// Package shutdown waits for the process stop request.

use std::fmt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Interrupt,
    Terminate,
    Cancelled,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Interrupt => "SIGINT",
            Trigger::Terminate => "SIGTERM",
            Trigger::Cancelled => "cancelled",
        })
    }
}

/// Blocks the main flow until SIGINT, SIGTERM or cancellation of the
/// process token. Cancelling is left to the caller so collaborators can be
/// stopped in order first.
#[derive(Clone)]
pub struct GracefulShutdown {
    shutdown_token: CancellationToken,
}

impl GracefulShutdown {
    pub fn new(shutdown_token: CancellationToken) -> Self {
        Self { shutdown_token }
    }

    pub async fn await_signal(&self) -> Trigger {
        let trigger = tokio::select! {
            res = signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(
                        component = "graceful-shutdown",
                        event = "signal_listener_failed",
                        error = %e,
                        "failed to listen for SIGINT"
                    );
                    // Without a listener only cancellation can end the wait.
                    self.shutdown_token.cancelled().await;
                    Trigger::Cancelled
                } else {
                    Trigger::Interrupt
                }
            }
            _ = terminate() => Trigger::Terminate,
            _ = self.shutdown_token.cancelled() => Trigger::Cancelled,
        };

        info!(
            component = "graceful-shutdown",
            event = "stop_requested",
            trigger = %trigger,
            "shutdown started"
        );
        trigger
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            warn!(
                component = "graceful-shutdown",
                event = "signal_listener_failed",
                error = %e,
                "failed to listen for SIGTERM"
            );
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
