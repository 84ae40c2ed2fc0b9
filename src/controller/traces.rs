// Trace sampling statistics controller.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::governor::{Governor, Regime, TraceStats};
use crate::http::Controller;

pub const TRACES_PATH: &str = "/router/traces";

#[derive(Debug, Serialize)]
struct TracesResponse {
    regime: Regime,
    #[serde(flatten)]
    stats: TraceStats,
}

/// Reports per-category admit/deny totals and the active regime.
pub struct TraceStatsController {
    governor: Arc<dyn Governor>,
}

impl TraceStatsController {
    pub fn new(governor: Arc<dyn Governor>) -> Self {
        Self { governor }
    }

    async fn get(governor: Arc<dyn Governor>) -> impl IntoResponse {
        let resp = TracesResponse {
            regime: governor.regime().current(),
            stats: governor.stats(),
        };
        (StatusCode::OK, Json(resp))
    }
}

impl Controller for TraceStatsController {
    fn add_route(&self, router: Router) -> Router {
        let governor = self.governor.clone();
        router.route(
            TRACES_PATH,
            get(move || {
                let governor = governor.clone();
                async move { Self::get(governor).await }
            }),
        )
    }
}
