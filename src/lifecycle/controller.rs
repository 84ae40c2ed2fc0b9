//! Service lifecycle: validate, initialize, start, shutdown.

use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::api::{CollaboratorFactory, Ledger, Router};
use super::error::LifecycleError;
use super::state::{State, ValidationMode};
use crate::config::{self, Config, ConfigTrait, Severity};
use crate::liveness;

#[derive(Default)]
struct Inner {
    cfg: Option<Config>,
    ledger: Option<Arc<dyn Ledger>>,
    router: Option<Arc<dyn Router>>,
    ledger_started: bool,
    router_started: bool,
}

/// Drives the process through its one-way lifecycle.
///
/// The ledger is started before the router and stopped after it, so spend can
/// be authorized for as long as the router may issue bids. All transitions are
/// serialized by one async mutex.
pub struct LifecycleController {
    factory: Arc<dyn CollaboratorFactory>,
    inner: tokio::sync::Mutex<Inner>,
    state: RwLock<State>,
    transport_addr: RwLock<Option<SocketAddr>>,
}

impl LifecycleController {
    pub fn new(factory: Arc<dyn CollaboratorFactory>) -> Self {
        Self {
            factory,
            inner: tokio::sync::Mutex::new(Inner::default()),
            state: RwLock::new(State::Uninitialized),
            transport_addr: RwLock::new(None),
        }
    }

    pub fn state(&self) -> State {
        *self.state.read()
    }

    /// Address the router transport was bound to, once initialized.
    pub fn transport_addr(&self) -> Option<SocketAddr> {
        *self.transport_addr.read()
    }

    fn advance(&self, to: State) {
        let from = std::mem::replace(&mut *self.state.write(), to);
        info!(
            component = "lifecycle",
            event = "transition",
            from = %from,
            to = %to,
            "lifecycle state changed"
        );
    }

    /// Logs every configuration issue and decides whether startup may proceed.
    ///
    /// `ValidateAll` blocks on any issue, `ValidateErrorsOnly` only on errors.
    pub async fn validate(&self, mut cfg: Config, mode: ValidationMode) -> Result<bool, LifecycleError> {
        let mut inner = self.inner.lock().await;
        let state = self.state();
        if state != State::Uninitialized {
            return Err(LifecycleError::InvalidTransition {
                action: "validate",
                state,
            });
        }

        let issues = config::check(&cfg);
        for issue in &issues {
            match issue.severity {
                Severity::Error => error!(
                    component = "lifecycle",
                    event = "config_issue",
                    severity = %issue.severity,
                    path = %issue.path,
                    "{}", issue.message
                ),
                Severity::Warning => warn!(
                    component = "lifecycle",
                    event = "config_issue",
                    severity = %issue.severity,
                    path = %issue.path,
                    "{}", issue.message
                ),
            }
        }

        let errors = issues.iter().filter(|i| i.is_error()).count();
        let warnings = issues.len() - errors;
        let blocked = match mode {
            ValidationMode::ValidateAll => !issues.is_empty(),
            ValidationMode::ValidateErrorsOnly => errors > 0,
        };

        if blocked {
            error!(
                component = "lifecycle",
                event = "config_rejected",
                mode = ?mode,
                errors = errors,
                warnings = warnings,
                "configuration rejected"
            );
            return Ok(false);
        }

        if let Err(e) = cfg.resolve_exchanges() {
            error!(
                component = "lifecycle",
                event = "config_rejected",
                error = %format!("{e:#}"),
                "exchange configuration could not be loaded"
            );
            return Ok(false);
        }

        info!(
            component = "lifecycle",
            event = "config_validated",
            mode = ?mode,
            warnings = warnings,
            exchanges = cfg.exchanges().len(),
            "configuration accepted"
        );

        inner.cfg = Some(cfg);
        self.advance(State::ConfigValidated);
        Ok(true)
    }

    /// Builds the collaborators, hands the router its ledger and binds the
    /// transport. Only legal after a passing `validate`.
    pub async fn initialize(&self) -> Result<SocketAddr, LifecycleError> {
        let mut inner = self.inner.lock().await;
        let state = self.state();
        if state != State::ConfigValidated {
            return Err(LifecycleError::NotValidated(state));
        }
        let cfg = inner
            .cfg
            .as_ref()
            .ok_or(LifecycleError::NotValidated(state))?;

        let ledger = self.factory.ledger(cfg).map_err(LifecycleError::Initialization)?;
        let router = self.factory.router(cfg).map_err(LifecycleError::Initialization)?;

        router.set_ledger(ledger.clone());
        let addr = router
            .bind_transport()
            .await
            .map_err(LifecycleError::Initialization)?;

        info!(
            component = "lifecycle",
            event = "initialized",
            ledger = ledger.name(),
            router = router.name(),
            addr = %addr,
            "collaborators initialized"
        );

        inner.ledger = Some(ledger);
        inner.router = Some(router);
        *self.transport_addr.write() = Some(addr);
        self.advance(State::Initialized);
        Ok(addr)
    }

    /// Starts the ledger, then the router, then enables every exchange with
    /// no expiry.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock().await;
        let state = self.state();
        if state != State::Initialized {
            return Err(LifecycleError::InvalidTransition {
                action: "start",
                state,
            });
        }
        let (Some(ledger), Some(router)) = (inner.ledger.clone(), inner.router.clone()) else {
            return Err(LifecycleError::InvalidTransition {
                action: "start",
                state,
            });
        };

        ledger.start().await.map_err(LifecycleError::Start)?;
        inner.ledger_started = true;

        router.start().await.map_err(LifecycleError::Start)?;
        inner.router_started = true;

        let exchanges = inner
            .cfg
            .as_ref()
            .map(|cfg| cfg.exchanges().to_vec())
            .unwrap_or_default();
        for exchange in &exchanges {
            router.activate_exchange(exchange).await.map_err(|e| {
                LifecycleError::Start(e.context(format!(
                    "activate exchange {}",
                    exchange.display_name()
                )))
            })?;
        }

        info!(
            component = "lifecycle",
            event = "started",
            exchanges = exchanges.len(),
            "router running"
        );
        self.advance(State::Running);
        Ok(())
    }

    /// Stops the router, then the ledger. Both are attempted even when the
    /// first fails; every failure is reported. A second call is a no-op.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        let mut inner = self.inner.lock().await;
        if self.state() == State::ShutDown {
            debug!(
                component = "lifecycle",
                event = "shutdown_skipped",
                "already shut down"
            );
            return Ok(());
        }

        let mut failures = Vec::new();

        if inner.router_started {
            if let Some(router) = inner.router.clone() {
                if let Err(e) = router.shutdown().await {
                    error!(
                        component = "lifecycle",
                        scope = "router",
                        event = "shutdown_failed",
                        error = %format!("{e:#}"),
                        "router shutdown failed"
                    );
                    failures.push(format!("router {}: {e:#}", router.name()));
                }
            }
            inner.router_started = false;
        }

        if inner.ledger_started {
            if let Some(ledger) = inner.ledger.clone() {
                if let Err(e) = ledger.shutdown().await {
                    error!(
                        component = "lifecycle",
                        scope = "ledger",
                        event = "shutdown_failed",
                        error = %format!("{e:#}"),
                        "ledger shutdown failed"
                    );
                    failures.push(format!("ledger {}: {e:#}", ledger.name()));
                }
            }
            inner.ledger_started = false;
        }

        self.advance(State::ShutDown);

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::ShutdownFailed(failures))
        }
    }
}

impl liveness::Service for LifecycleController {
    fn name(&self) -> &str {
        "lifecycle"
    }

    fn is_alive(&self, _timeout: Duration) -> bool {
        self.state() == State::Running
    }
}
