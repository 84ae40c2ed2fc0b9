// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::governor::{RegimeRates, TraceRateSpec, TraceRates};

pub mod check;
pub mod exchange;
mod test_config;

#[cfg(test)]
mod check_test;

pub use check::{check, Issue, Severity};
pub use exchange::Exchange;
#[allow(dead_code)]
pub use test_config::new_test_config;

pub const PROD: &str = "prod";
/// Service name used when `api.name` is unset.
pub const DEFAULT_SERVICE_NAME: &str = "router";
#[allow(dead_code)]
pub const DEV: &str = "dev";
#[allow(dead_code)]
pub const DEBUG: &str = "debug";
#[allow(dead_code)]
pub const TEST: &str = "test";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Router {
    #[serde(rename = "router")]
    pub router: RouterBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub runtime: Option<Runtime>,
    pub api: Option<Api>,
    pub transport: Transport,
    pub k8s: Option<K8S>,
    #[serde(rename = "loss_timeout", with = "humantime_serde", default = "default_loss_timeout")]
    pub loss_timeout: Duration,
    #[serde(default = "default_max_bid_price")]
    pub max_bid_price: f64,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log_auctions: bool,
    #[serde(default)]
    pub log_bids: bool,
    #[serde(default)]
    pub slow_mode: SlowMode,
    /// JSON file with the exchange list; wins over `exchanges` when set.
    #[serde(rename = "exchange_configuration")]
    pub exchange_configuration: Option<PathBuf>,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
    #[serde(default)]
    pub traces: Traces,
}

fn default_loss_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_max_bid_price() -> f64 {
    200.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Runtime {
    pub num_cpus: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Api {
    pub name: Option<String>,
    pub port: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transport {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Probe {
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct K8S {
    pub probe: Probe,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SlowMode {
    /// Events per second above which the router reports slow mode, `0` disables.
    #[serde(default)]
    pub threshold: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryRates {
    #[serde(default = "default_auction_metric")]
    pub auction: RegimeRates,
    #[serde(default = "default_bid_metric")]
    pub bid: RegimeRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageRates {
    #[serde(default = "default_message")]
    pub auction: RegimeRates,
    #[serde(default = "default_message")]
    pub bid: RegimeRates,
}

/// Per-second trace limits. Slow mode is usually allowed more samples to
/// help diagnosing the slowdown; avoid `max: 0` (unlimited) at high QPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Traces {
    #[serde(default = "default_metric_rates")]
    pub metrics: CategoryRates,
    #[serde(default = "default_message_rates")]
    pub messages: MessageRates,
}

fn default_auction_metric() -> RegimeRates {
    RegimeRates {
        normal: TraceRateSpec::new(500, 50, 10, false),
        slow: TraceRateSpec::new(1000, 100, 5, false),
    }
}

fn default_bid_metric() -> RegimeRates {
    RegimeRates {
        normal: TraceRateSpec::new(250, 25, 10, false),
        slow: TraceRateSpec::new(500, 50, 5, false),
    }
}

fn default_message() -> RegimeRates {
    RegimeRates {
        normal: TraceRateSpec::new(10, 0, 0, false),
        slow: TraceRateSpec::new(20, 0, 0, false),
    }
}

fn default_metric_rates() -> CategoryRates {
    CategoryRates {
        auction: default_auction_metric(),
        bid: default_bid_metric(),
    }
}

fn default_message_rates() -> MessageRates {
    MessageRates {
        auction: default_message(),
        bid: default_message(),
    }
}

impl Default for Traces {
    fn default() -> Self {
        Self {
            metrics: default_metric_rates(),
            messages: default_message_rates(),
        }
    }
}

impl Traces {
    /// Flattens the document shape into the governor's eight channels.
    pub fn rates(&self) -> TraceRates {
        TraceRates::new(
            self.metrics.auction,
            self.metrics.bid,
            self.messages.auction,
            self.messages.bid,
        )
    }
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    #[allow(dead_code)]
    fn is_debug(&self) -> bool;
    #[allow(dead_code)]
    fn is_dev(&self) -> bool;
    #[allow(dead_code)]
    fn is_test(&self) -> bool;
    fn runtime(&self) -> &Runtime;
    fn api(&self) -> Option<&Api>;
    fn transport(&self) -> &Transport;
    fn service_name(&self) -> &str;
    fn k8s(&self) -> Option<&K8S>;
    fn traces(&self) -> &Traces;
    fn slow_mode(&self) -> &SlowMode;
    fn exchanges(&self) -> &[Exchange];
}

// Config type alias for convenience
pub type Config = Router;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.router.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.router.env == PROD
    }

    fn is_debug(&self) -> bool {
        self.router.env == DEBUG
    }

    fn is_dev(&self) -> bool {
        self.router.env == DEV
    }

    fn is_test(&self) -> bool {
        self.router.env == TEST
    }

    fn runtime(&self) -> &Runtime {
        const ALL_CORES: Runtime = Runtime { num_cpus: 0 };
        self.router.runtime.as_ref().unwrap_or(&ALL_CORES)
    }

    fn api(&self) -> Option<&Api> {
        self.router.api.as_ref()
    }

    fn transport(&self) -> &Transport {
        &self.router.transport
    }

    fn service_name(&self) -> &str {
        self.router
            .api
            .as_ref()
            .and_then(|api| api.name.as_deref())
            .unwrap_or(DEFAULT_SERVICE_NAME)
    }

    fn k8s(&self) -> Option<&K8S> {
        self.router.k8s.as_ref()
    }

    fn traces(&self) -> &Traces {
        &self.router.traces
    }

    fn slow_mode(&self) -> &SlowMode {
        &self.router.slow_mode
    }

    fn exchanges(&self) -> &[Exchange] {
        &self.router.exchanges
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        let mut cfg = Self::from_yaml(&data)
            .with_context(|| format!("unmarshal yaml from {:?}", abs_path))?;

        // Relative exchange files are resolved against the config directory.
        if let Some(ref file) = cfg.router.exchange_configuration {
            if file.is_relative() && !file.exists() {
                if let Some(dir) = abs_path.parent() {
                    cfg.router.exchange_configuration = Some(dir.join(file));
                }
            }
        }

        Ok(cfg)
    }

    /// Parses a YAML document without touching the exchange file.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Router = serde_yaml::from_str(data)?;
        Ok(cfg)
    }

    /// Replaces the inline exchange list with the one from
    /// `exchange_configuration`, when that is set.
    pub fn resolve_exchanges(&mut self) -> Result<()> {
        if let Some(ref file) = self.router.exchange_configuration {
            self.router.exchanges = exchange::load(file)?;
        }
        Ok(())
    }
}
