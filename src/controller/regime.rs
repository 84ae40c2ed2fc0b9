// Regime inspection and operator override.

use axum::{http::StatusCode, response::IntoResponse, routing::{get, post}, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::governor::{Regime, RegimeSelector};
use crate::http::Controller;

pub const REGIME_PATH: &str = "/router/regime";
pub const REGIME_SLOW_PATH: &str = "/router/regime/slow";
pub const REGIME_NORMAL_PATH: &str = "/router/regime/normal";

#[derive(Debug, Serialize)]
struct RegimeResponse {
    regime: Regime,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<Regime>,
}

/// Exposes the regime selector; the load monitor may switch it back once
/// load changes.
pub struct RegimeController {
    regime: Arc<RegimeSelector>,
}

impl RegimeController {
    pub fn new(regime: Arc<RegimeSelector>) -> Self {
        Self { regime }
    }

    fn switch(selector: &RegimeSelector, to: Regime) -> impl IntoResponse {
        let previous = selector.set(to);
        info!(
            component = "regime",
            event = "override",
            from = %previous,
            to = %to,
            "regime set by operator"
        );
        (
            StatusCode::OK,
            Json(RegimeResponse {
                regime: to,
                previous: Some(previous),
            }),
        )
    }
}

impl Controller for RegimeController {
    fn add_route(&self, router: Router) -> Router {
        let current = self.regime.clone();
        let slow = self.regime.clone();
        let normal = self.regime.clone();
        router
            .route(
                REGIME_PATH,
                get(move || {
                    let regime = current.current();
                    async move {
                        (
                            StatusCode::OK,
                            Json(RegimeResponse {
                                regime,
                                previous: None,
                            }),
                        )
                    }
                }),
            )
            .route(
                REGIME_SLOW_PATH,
                post(move || {
                    let selector = slow.clone();
                    async move { Self::switch(&selector, Regime::Slow) }
                }),
            )
            .route(
                REGIME_NORMAL_PATH,
                post(move || {
                    let selector = normal.clone();
                    async move { Self::switch(&selector, Regime::Normal) }
                }),
            )
    }
}
