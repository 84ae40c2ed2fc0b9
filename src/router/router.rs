//! In-process routing collaborator.

use anyhow::{bail, Context, Result};
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::exchange::{Activation, ExchangeConnector};
use super::intake::{parse_line, Event, EventKind};
use super::load::LoadMonitor;
use crate::config::{Config, ConfigTrait, Exchange};
use crate::governor::{Governor, RegimeSelector};
use crate::lifecycle::{Ledger, Router};
use crate::time::Clock;

/// Trace decisions taken for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub metric: bool,
    pub message: bool,
}

struct Settings {
    addr: String,
    loss_timeout: Duration,
    max_bid_price: f64,
    log_auctions: bool,
    log_bids: bool,
}

/// State shared with the accept loop, the connection tasks and the ticker.
struct Core {
    settings: Settings,
    governor: Arc<dyn Governor>,
    monitor: LoadMonitor,
    shutdown_token: CancellationToken,
    conns: Mutex<JoinSet<()>>,
}

/// Accepts newline-delimited auction/bid events over TCP and asks the
/// governor, per event, whether to trace it.
pub struct EventRouter {
    name: String,
    core: Arc<Core>,
    ledger: RwLock<Option<Arc<dyn Ledger>>>,
    listener: Mutex<Option<TcpListener>>,
    exchanges: RwLock<Vec<Arc<ExchangeConnector>>>,
    tasks: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl EventRouter {
    pub fn new(
        name: impl Into<String>,
        shutdown_token: CancellationToken,
        cfg: &Config,
        governor: Arc<dyn Governor>,
        regime: Arc<RegimeSelector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let core = Core {
            settings: Settings {
                addr: cfg.transport().addr.clone(),
                loss_timeout: cfg.router.loss_timeout,
                max_bid_price: cfg.router.max_bid_price,
                log_auctions: cfg.router.log_auctions,
                log_bids: cfg.router.log_bids,
            },
            governor,
            monitor: LoadMonitor::new(cfg.slow_mode().threshold, regime, clock),
            shutdown_token,
            conns: Mutex::new(JoinSet::new()),
        };
        Self {
            name: name.into(),
            core: Arc::new(core),
            ledger: RwLock::new(None),
            listener: Mutex::new(None),
            exchanges: RwLock::new(Vec::new()),
            tasks: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    /// Connectors activated so far, in activation order.
    pub fn exchanges(&self) -> Vec<Arc<ExchangeConnector>> {
        self.exchanges.read().clone()
    }

    /// How long an auction waits for its outcome before it counts as lost.
    pub fn loss_timeout(&self) -> Duration {
        self.core.settings.loss_timeout
    }

    /// Highest bid price the router lets through.
    pub fn max_bid_price(&self) -> f64 {
        self.core.settings.max_bid_price
    }

    /// Runs the governor for one event and emits the admitted traces.
    pub fn route(&self, event: &Event<'_>) -> Decision {
        self.core.route(event)
    }
}

impl Core {
    fn route(&self, event: &Event<'_>) -> Decision {
        self.monitor.observe();

        // One regime read per event so both channels agree.
        let regime = self.governor.regime().current();
        let metric_category = event.kind.metric_category();
        let message_category = event.kind.message_category();

        let decision = Decision {
            metric: self.governor.should_trace_in(event.id, metric_category, regime),
            message: self.governor.should_trace_in(event.id, message_category, regime),
        };

        metrics::counter!("bidrouter_events_total", "kind" => event.kind.as_str()).increment(1);

        if decision.metric {
            metrics::counter!("bidrouter_trace_samples_total", "category" => metric_category.as_str())
                .increment(1);
            debug!(
                target: "bidrouter::trace",
                category = %metric_category,
                regime = %regime,
                id = %event.display_id(),
                "metric sample"
            );
        }

        if decision.message {
            metrics::counter!("bidrouter_trace_samples_total", "category" => message_category.as_str())
                .increment(1);
            info!(
                target: "bidrouter::trace",
                category = %message_category,
                regime = %regime,
                kind = %event.kind,
                id = %event.display_id(),
                "message dump"
            );
        }

        let log_event = match event.kind {
            EventKind::Auction => self.settings.log_auctions,
            EventKind::Bid => self.settings.log_bids,
        };
        if log_event {
            info!(
                component = "router",
                event = event.kind.as_str(),
                id = %event.display_id(),
                "event logged"
            );
        }

        decision
    }

    /// Builds the response line for one intake line. Acks echo the raw id.
    fn handle_line(&self, line: &[u8]) -> Option<Vec<u8>> {
        match parse_line(line) {
            Ok(Some(event)) => {
                self.route(&event);
                let mut resp = Vec::with_capacity(event.id.len() + 5);
                resp.extend_from_slice(b"ack ");
                resp.extend_from_slice(event.id);
                resp.push(b'\n');
                Some(resp)
            }
            Ok(None) => None,
            Err(e) => {
                debug!(component = "router", event = "bad_line", error = %e, "malformed intake line");
                Some(format!("err {e}\n").into_bytes())
            }
        }
    }

    async fn serve_conn(self: Arc<Self>, stream: TcpStream, peer: SocketAddr) {
        let (read, mut write) = stream.into_split();
        let mut reader = BufReader::new(read);
        let mut line = Vec::new();

        loop {
            line.clear();
            // Cancellation wins over a ready line: nothing is routed once
            // shutdown has begun.
            let read = tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => break,
                read = reader.read_until(b'\n', &mut line) => read,
            };
            match read {
                Ok(0) => break,
                Ok(_) => {
                    let Some(resp) = self.handle_line(&line) else {
                        continue;
                    };
                    let written = tokio::select! {
                        biased;
                        _ = self.shutdown_token.cancelled() => break,
                        written = write.write_all(&resp) => written,
                    };
                    if let Err(e) = written {
                        debug!(component = "router", peer = %peer, error = %e, "peer write failed");
                        break;
                    }
                }
                Err(e) => {
                    debug!(component = "router", peer = %peer, error = %e, "peer read failed");
                    break;
                }
            }
        }
    }

    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let mut conns = self.conns.lock();
                        while conns.try_join_next().is_some() {}
                        conns.spawn(self.clone().serve_conn(stream, peer));
                    }
                    Err(e) => {
                        warn!(component = "router", event = "accept_failed", error = %e, "accept failed");
                    }
                },
            }
        }
    }

    /// Waits for every connection task; call only after the accept loop ended.
    async fn drain_conns(&self) -> usize {
        let mut conns = std::mem::take(&mut *self.conns.lock());
        let mut failed = 0usize;
        while let Some(res) = conns.join_next().await {
            if let Err(e) = res {
                error!(component = "router", event = "conn_failed", error = %e, "connection task failed");
                failed += 1;
            }
        }
        failed
    }

    async fn load_ticker(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => break,
                _ = interval.tick() => self.monitor.tick(),
            }
        }
    }
}

#[async_trait::async_trait]
impl Router for EventRouter {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_ledger(&self, ledger: Arc<dyn Ledger>) {
        *self.ledger.write() = Some(ledger);
    }

    async fn bind_transport(&self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.core.settings.addr)
            .await
            .with_context(|| format!("failed to bind router transport on {}", self.core.settings.addr))?;
        let addr = listener.local_addr().context("failed to read bound address")?;
        *self.listener.lock() = Some(listener);

        info!(
            component = "router",
            event = "transport_bound",
            addr = %addr,
            "router transport bound"
        );
        Ok(addr)
    }

    async fn start(&self) -> Result<()> {
        let ledger_ready = self.ledger.read().as_ref().map(|l| l.is_available());
        match ledger_ready {
            None => bail!("router {} has no ledger", self.name),
            Some(false) => bail!("router {} cannot start: ledger is not available", self.name),
            Some(true) => {}
        }

        let Some(listener) = self.listener.lock().take() else {
            bail!("router {} transport is not bound", self.name);
        };

        let mut tasks = self.tasks.lock().await;
        tasks.push(tokio::spawn(self.core.clone().accept_loop(listener)));
        if self.core.monitor.is_enabled() {
            tasks.push(tokio::spawn(self.core.clone().load_ticker()));
        }

        info!(
            component = "router",
            name = %self.name,
            event = "started",
            loss_timeout = ?self.core.settings.loss_timeout,
            max_bid_price = self.core.settings.max_bid_price,
            "router accepting events"
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.core.shutdown_token.cancel();

        let handles: Vec<_> = self.tasks.lock().await.drain(..).collect();
        let mut failed = 0usize;
        for handle in handles {
            if let Err(e) = handle.await {
                error!(component = "router", event = "task_failed", error = %e, "router task failed");
                failed += 1;
            }
        }
        failed += self.core.drain_conns().await;

        for connector in self.exchanges.read().iter() {
            connector.disable();
        }

        if failed > 0 {
            bail!("{failed} router task(s) did not finish cleanly");
        }

        info!(component = "router", name = %self.name, event = "stopped", "router stopped");
        Ok(())
    }

    async fn activate_exchange(&self, exchange: &Exchange) -> Result<()> {
        let connector = Arc::new(ExchangeConnector::new(exchange.clone()));
        connector.enable(Activation::Indefinitely);

        info!(
            component = "router",
            event = "exchange_activated",
            exchange = connector.name(),
            exchange_type = %exchange.exchange_type,
            "exchange enabled indefinitely"
        );
        self.exchanges.write().push(connector);
        Ok(())
    }
}
