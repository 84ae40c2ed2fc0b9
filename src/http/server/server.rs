//! Admin HTTP server.
//

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

use crate::config::{Api, DEFAULT_SERVICE_NAME};
use crate::controller::controller::Controller;

const DEFAULT_PORT: &str = "8020";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP server over a fixed set of controllers.
pub struct HttpServer {
    shutdown_token: CancellationToken,
    name: String,
    port: String,
    router: Router,
}

impl HttpServer {
    pub fn new(
        shutdown_token: CancellationToken,
        api: Option<&Api>,
        controllers: Vec<Box<dyn Controller>>,
    ) -> Arc<Self> {
        let name = api
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
        let port = api
            .and_then(|a| a.port.clone())
            .unwrap_or_else(|| DEFAULT_PORT.to_string());

        Arc::new(Self {
            shutdown_token,
            name,
            port: port.trim_start_matches(':').to_string(),
            router: Self::build_router(controllers),
        })
    }

    /// Routes of every registered controller.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn listen_and_serve(&self) -> Result<()> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.port)
            .parse()
            .with_context(|| format!("failed to parse admin port {:?}", self.port))?;

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind admin listener on {addr}"))?;

        info!(
            component = "server",
            event = "started",
            name = %self.name,
            port = %self.port,
            "server started"
        );

        let shutdown_token = self.shutdown_token.clone();
        let serve_future =
            axum::serve(listener, self.router.clone()).with_graceful_shutdown(async move {
                shutdown_token.cancelled().await;
            });

        if let Err(e) = serve_future.await {
            error!(
                component = "server",
                event = "listen_and_serve_failed",
                name = %self.name,
                port = %self.port,
                error = %e,
                "server failed to listen and serve"
            );
            return Err(e.into());
        }

        info!(
            component = "server",
            event = "stopped",
            name = %self.name,
            port = %self.port,
            "server stopped"
        );
        Ok(())
    }

    fn build_router(controllers: Vec<Box<dyn Controller>>) -> Router {
        let mut router = Router::new();
        for controller in controllers {
            router = controller.add_route(router);
        }
        router.layer(TimeoutLayer::new(REQUEST_TIMEOUT))
    }
}
