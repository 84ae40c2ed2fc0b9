// Main router application implementation.

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{Config, ConfigTrait};
use crate::governor::{RegimeSelector, SamplingGovernor};
use crate::lifecycle::{LifecycleController, LifecycleError, ValidationMode};
use crate::liveness;
use crate::time::{Clock, SystemClock};

use super::factory::DefaultFactory;
use super::server::AdminServer;

/// Owns the governor, the lifecycle controller and the admin server.
pub struct App {
    cfg: Config,
    shutdown_token: CancellationToken,
    regime: Arc<RegimeSelector>,
    governor: Arc<SamplingGovernor>,
    lifecycle: Arc<LifecycleController>,
    server: Arc<AdminServer>,
    server_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl App {
    pub fn new(shutdown_token: CancellationToken, cfg: Config, probe: Arc<liveness::Probe>) -> Self {
        Self::with_clock(shutdown_token, cfg, probe, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        shutdown_token: CancellationToken,
        cfg: Config,
        probe: Arc<liveness::Probe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let regime = Arc::new(RegimeSelector::default());
        let governor = Arc::new(SamplingGovernor::with_clock(
            cfg.traces().rates(),
            regime.clone(),
            clock.clone(),
        ));

        let factory = DefaultFactory::new(shutdown_token.clone(), governor.clone(), regime.clone(), clock);
        let lifecycle = Arc::new(LifecycleController::new(Arc::new(factory)));
        probe.watch(vec![lifecycle.clone() as Arc<dyn liveness::Service>]);

        let server = Arc::new(AdminServer::new(
            shutdown_token.clone(),
            &cfg,
            governor.clone(),
            regime.clone(),
            probe,
        ));

        Self {
            cfg,
            shutdown_token,
            regime,
            governor,
            lifecycle,
            server,
            server_task: tokio::sync::Mutex::new(None),
        }
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleController> {
        &self.lifecycle
    }

    pub fn governor(&self) -> &Arc<SamplingGovernor> {
        &self.governor
    }

    pub fn regime(&self) -> &Arc<RegimeSelector> {
        &self.regime
    }

    /// Admin API routes, for serving or in-process requests.
    pub fn admin_router(&self) -> Router {
        self.server.router()
    }

    pub async fn validate(&self, mode: ValidationMode) -> Result<bool, LifecycleError> {
        self.lifecycle.validate(self.cfg.clone(), mode).await
    }

    /// Initializes and starts the collaborators; returns the intake address.
    pub async fn start(&self) -> Result<SocketAddr, LifecycleError> {
        let addr = self.lifecycle.initialize().await?;
        self.lifecycle.start().await?;

        info!(
            component = "app",
            event = "started",
            addr = %addr,
            "application lifecycle"
        );
        Ok(addr)
    }

    /// Serves the admin API in the background. A failing server cancels the
    /// process token so the main flow shuts down.
    pub async fn serve(&self) {
        let server = self.server.clone();
        let token = self.shutdown_token.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = server.listen_and_serve().await {
                error!(
                    component = "app",
                    scope = "server",
                    event = "serve_failed",
                    error = %format!("{e:#}"),
                    "admin server failed to serve"
                );
                token.cancel();
            }
        });
        *self.server_task.lock().await = Some(handle);
    }

    /// Stops the collaborators in order, then the admin server.
    pub async fn close(&self) -> Result<(), LifecycleError> {
        let result = self.lifecycle.shutdown().await;

        self.shutdown_token.cancel();
        if let Some(handle) = self.server_task.lock().await.take() {
            if let Err(e) = handle.await {
                error!(
                    component = "app",
                    scope = "server",
                    event = "join_failed",
                    error = %e,
                    "admin server task failed"
                );
            }
        }

        info!(
            component = "app",
            event = "stopped",
            "application lifecycle"
        );
        result
    }
}
