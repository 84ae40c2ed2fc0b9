//! Semantic configuration checks.

use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;

use super::{exchange, Config, ConfigTrait};
use crate::governor::{Regime, RegimeRates, TraceRateSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One configuration finding, addressed by its document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl Issue {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.path, self.message)
    }
}

/// Returns every issue found in `cfg`. An empty list means the document is clean.
pub fn check(cfg: &Config) -> Vec<Issue> {
    let mut issues = Vec::new();
    let r = &cfg.router;

    if !r.max_bid_price.is_finite() || r.max_bid_price <= 0.0 {
        issues.push(Issue::error(
            "router.max_bid_price",
            format!("must be a positive price, got {}", r.max_bid_price),
        ));
    }

    if r.loss_timeout.is_zero() {
        issues.push(Issue::error("router.loss_timeout", "must be greater than zero"));
    }

    if cfg.transport().addr.parse::<SocketAddr>().is_err() {
        issues.push(Issue::error(
            "router.transport.addr",
            format!("{:?} is not a socket address", cfg.transport().addr),
        ));
    }

    if r.debug {
        issues.push(Issue::warning(
            "router.debug",
            "debug mechanisms enabled, not recommended at high QPS",
        ));
    }

    let traces = cfg.traces();
    check_rates(&mut issues, "router.traces.metrics.auction", &traces.metrics.auction);
    check_rates(&mut issues, "router.traces.metrics.bid", &traces.metrics.bid);
    check_rates(&mut issues, "router.traces.messages.auction", &traces.messages.auction);
    check_rates(&mut issues, "router.traces.messages.bid", &traces.messages.bid);

    check_exchanges(&mut issues, cfg);

    issues
}

fn check_rates(issues: &mut Vec<Issue>, path: &str, rates: &RegimeRates) {
    for regime in Regime::ALL {
        check_spec(issues, &format!("{path}.{regime}"), rates.get(regime));
    }

    if rates.normal.max != 0 && rates.slow.max != 0 && rates.slow.max < rates.normal.max {
        issues.push(Issue::warning(
            path,
            format!(
                "slow mode max {} is lower than normal mode max {}",
                rates.slow.max, rates.normal.max
            ),
        ));
    }
}

fn check_spec(issues: &mut Vec<Issue>, path: &str, spec: &TraceRateSpec) {
    if !spec.is_unlimited() && spec.min > spec.max {
        issues.push(Issue::error(
            path,
            format!("min {} is greater than max {}", spec.min, spec.max),
        ));
    }

    if spec.is_unlimited() {
        let message = if spec.all {
            "max 0 (unlimited) with all: every event is traced"
        } else {
            "max 0 (unlimited), avoid at high QPS"
        };
        issues.push(Issue::warning(path, message));
    }

    if spec.all && spec.modulus != 0 {
        issues.push(Issue::warning(
            path,
            format!("mod {} is ignored while all is set", spec.modulus),
        ));
    }
}

fn check_exchanges(issues: &mut Vec<Issue>, cfg: &Config) {
    let loaded;
    let exchanges = match cfg.router.exchange_configuration {
        Some(ref file) => match exchange::load(file) {
            Ok(list) => {
                loaded = list;
                &loaded[..]
            }
            Err(err) => {
                issues.push(Issue::error(
                    "router.exchange_configuration",
                    format!("{err:#}"),
                ));
                return;
            }
        },
        None => cfg.exchanges(),
    };

    if exchanges.is_empty() {
        issues.push(Issue::warning(
            "router.exchanges",
            "no exchanges configured, the router will not receive traffic",
        ));
    }

    for (i, ex) in exchanges.iter().enumerate() {
        if ex.exchange_type.trim().is_empty() {
            issues.push(Issue::error(
                format!("router.exchanges[{i}].exchangeType"),
                "must not be empty",
            ));
        }
    }
}
