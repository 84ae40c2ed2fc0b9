// Admin HTTP server wiring for the router application.

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ConfigTrait};
use crate::controller;
use crate::governor::{Governor, RegimeSelector};
use crate::http::{Controller, HttpServer};
use crate::liveness;

/// Admin server with every controller registered.
pub struct AdminServer {
    server: Arc<HttpServer>,
}

impl AdminServer {
    pub fn new(
        shutdown_token: CancellationToken,
        cfg: &Config,
        governor: Arc<dyn Governor>,
        regime: Arc<RegimeSelector>,
        probe: Arc<liveness::Probe>,
    ) -> Self {
        let controllers = Self::controllers(cfg, governor, regime, probe);
        Self {
            server: HttpServer::new(shutdown_token, cfg.api(), controllers),
        }
    }

    /// Routes served by the admin API.
    pub fn router(&self) -> Router {
        self.server.router()
    }

    /// Serves until the shutdown token is cancelled.
    pub async fn listen_and_serve(&self) -> Result<()> {
        self.server.listen_and_serve().await
    }

    fn controllers(
        cfg: &Config,
        governor: Arc<dyn Governor>,
        regime: Arc<RegimeSelector>,
        probe: Arc<liveness::Probe>,
    ) -> Vec<Box<dyn Controller>> {
        vec![
            // Healthcheck probe endpoint
            Box::new(controller::LivenessProbeController::new(probe)),
            // Metrics endpoint
            Box::new(controller::PrometheusMetricsController::new()),
            // Per-category trace admission totals
            Box::new(controller::TraceStatsController::new(governor)),
            // Regime inspection and override
            Box::new(controller::RegimeController::new(regime)),
            // Encodes and shows current config as json
            Box::new(controller::ShowConfigController::new(cfg.clone())),
        ]
    }
}
