//! Metrics controller.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::http::Controller;

pub const PROMETHEUS_METRICS_PATH: &str = "/metrics";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder and keeps its render handle.
/// A second call is a no-op.
pub fn init_prometheus_exporter() -> anyhow::Result<()> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {e}"))?;
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}

/// Serves the Prometheus text exposition.
#[derive(Default)]
pub struct PrometheusMetricsController;

impl PrometheusMetricsController {
    pub fn new() -> Self {
        Self
    }

    async fn get_metrics() -> impl IntoResponse {
        match PROMETHEUS_HANDLE.get() {
            Some(handle) => (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            ),
            None => (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain; charset=utf-8")],
                "# metrics recorder is not installed\n".to_string(),
            ),
        }
    }
}

impl Controller for PrometheusMetricsController {
    fn add_route(&self, router: Router) -> Router {
        router.route(PROMETHEUS_METRICS_PATH, get(Self::get_metrics))
    }
}
