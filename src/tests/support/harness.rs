// Application harness and clients for the integration cases.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::app::App;
use crate::config::{new_test_config, Config};
use crate::liveness;
use crate::time::ManualClock;

pub const T0: u64 = 1_700_000_000;

/// An application on a manual clock, not yet validated.
pub struct TestApp {
    pub app: App,
    pub clock: ManualClock,
    pub shutdown_token: CancellationToken,
}

pub fn test_app(cfg: Config) -> TestApp {
    let clock = ManualClock::new(T0);
    let shutdown_token = CancellationToken::new();
    let probe = Arc::new(liveness::Probe::new(Duration::from_secs(1)));
    let app = App::with_clock(shutdown_token.clone(), cfg, probe, Arc::new(clock.clone()));
    TestApp {
        app,
        clock,
        shutdown_token,
    }
}

/// Validated and started application on the default test config.
pub async fn running_app() -> (TestApp, SocketAddr) {
    running_app_with(new_test_config()).await
}

pub async fn running_app_with(cfg: Config) -> (TestApp, SocketAddr) {
    let t = test_app(cfg);
    assert!(t
        .app
        .validate(crate::lifecycle::ValidationMode::ValidateErrorsOnly)
        .await
        .unwrap());
    let addr = t.app.start().await.unwrap();
    (t, addr)
}

/// Sends one request through the admin routes without a socket.
pub async fn admin_call(router: &Router, method: &str, path: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn admin_json(router: &Router, method: &str, path: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = admin_call(router, method, path).await;
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("{path}: invalid json ({e}): {}", String::from_utf8_lossy(&body)));
    (status, json)
}

/// Line client for the router intake.
pub struct IntakeClient {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl IntakeClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    /// Sends one line and returns the response line without its newline.
    pub async fn send(&mut self, line: &str) -> String {
        let resp = self.send_raw(format!("{line}\n").as_bytes()).await;
        String::from_utf8(resp).expect("router answered with invalid UTF-8")
    }

    /// Writes raw bytes and returns the next response line without its newline.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Vec<u8> {
        self.writer.write_all(bytes).await.unwrap();
        self.recv_raw().await
    }

    pub async fn recv_raw(&mut self) -> Vec<u8> {
        let mut resp = Vec::new();
        let n = tokio::time::timeout(Duration::from_secs(5), self.reader.read_until(b'\n', &mut resp))
            .await
            .expect("router did not answer in time")
            .unwrap();
        assert!(n > 0, "router closed the connection");
        resp.pop();
        resp
    }

    /// Returns true once the router closed the connection.
    pub async fn is_closed(&mut self) -> bool {
        let mut buf = Vec::new();
        matches!(
            tokio::time::timeout(Duration::from_secs(5), self.reader.read_until(b'\n', &mut buf)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }
}
