// Config display controller.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use crate::config::Config;
use crate::http::Controller;

pub const CONFIG_PATH: &str = "/router/config";

/// Shows the loaded configuration as JSON.
pub struct ShowConfigController {
    cfg: Arc<Config>,
}

impl ShowConfigController {
    pub fn new(cfg: Config) -> Self {
        Self { cfg: Arc::new(cfg) }
    }

    async fn show_config(cfg: Arc<Config>) -> impl IntoResponse {
        match serde_json::to_string(&*cfg) {
            Ok(json) => (
                StatusCode::OK,
                [("content-type", "application/json; charset=utf-8")],
                json,
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "application/json; charset=utf-8")],
                serde_json::json!({ "error": format!("failed to serialize config: {e}") }).to_string(),
            ),
        }
    }
}

impl Controller for ShowConfigController {
    fn add_route(&self, router: Router) -> Router {
        let cfg = self.cfg.clone();
        router.route(
            CONFIG_PATH,
            get(move || {
                let cfg = cfg.clone();
                async move { Self::show_config(cfg).await }
            }),
        )
    }
}
