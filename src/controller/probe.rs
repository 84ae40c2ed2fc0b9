// Liveness probe controller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::http::Controller;
use crate::liveness;

pub const PROBE_PATH: &str = "/k8s/probe";

const SUCCESS_RESPONSE: &str = r#"{
  "status": 200,
  "message": "router is running"
}"#;

const FAILED_RESPONSE: &str = r#"{
  "status": 503,
  "message": "router is not running"
}"#;

/// Answers Kubernetes liveness probes from the watched services.
#[derive(Clone)]
pub struct LivenessProbeController {
    probe: Arc<liveness::Probe>,
}

impl LivenessProbeController {
    pub fn new(probe: Arc<liveness::Probe>) -> Self {
        Self { probe }
    }

    async fn probe(&self) -> Response {
        let body = if self.probe.is_alive_async().await {
            (StatusCode::OK, SUCCESS_RESPONSE)
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, FAILED_RESPONSE)
        };
        (body.0, [("content-type", "application/json")], body.1).into_response()
    }
}

impl Controller for LivenessProbeController {
    fn add_route(&self, router: Router) -> Router {
        let controller = self.clone();
        router.route(
            PROBE_PATH,
            get(move || {
                let controller = controller.clone();
                async move { controller.probe().await }
            }),
        )
    }
}
