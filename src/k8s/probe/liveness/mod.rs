// Package liveness provides Kubernetes liveness probe functionality.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

pub mod error;
pub mod service;

pub use error::TimeoutIsTooShortError;
pub use service::Service;

/// Liveness probe over a set of watched services.
pub struct Probe {
    services: RwLock<Vec<Arc<dyn Service>>>,
    timeout: Duration,
}

impl Probe {
    /// Creates a new liveness probe
    pub fn new(timeout_duration: Duration) -> Self {
        const MIN_TIMEOUT: Duration = Duration::from_millis(1);
        let timeout = if timeout_duration < MIN_TIMEOUT {
            warn!(
                error = %TimeoutIsTooShortError,
                "min timeout duration is 1ms (timeout set up as 10ms as a more reasonable value)"
            );
            Duration::from_millis(10)
        } else {
            timeout_duration
        };

        Self {
            services: RwLock::new(Vec::new()),
            timeout,
        }
    }

    /// Adds services to the watch list.
    pub fn watch(&self, services: Vec<Arc<dyn Service>>) {
        self.services.write().extend(services);
    }

    /// Checks every watched service within the probe timeout.
    pub async fn is_alive_async(&self) -> bool {
        let services = self.services.read().clone();
        let probe_timeout = self.timeout;

        let check = tokio::task::spawn_blocking(move || {
            for service in &services {
                if !service.is_alive(probe_timeout) {
                    warn!(
                        component = "liveness",
                        service = service.name(),
                        event = "not_alive",
                        "service is not alive"
                    );
                    return false;
                }
            }
            true
        });

        match timeout(probe_timeout, check).await {
            Ok(Ok(alive)) => alive,
            Ok(Err(e)) => {
                warn!(error = %e, "liveness check task failed");
                false
            }
            Err(_) => {
                warn!("liveness probe deadline exceeded while checking service");
                false
            }
        }
    }
}
