//! Adaptive trace-sampling governor.

use std::sync::Arc;
use tracing::info;

use super::api::Governor;
use super::regime::RegimeSelector;
use super::spec::{event_hash, Regime, TraceCategory, TraceRates};
use super::stats::{Counters, TraceStats};
use super::window::WindowCounter;
use crate::time::{Clock, SystemClock};

/// Owns the sampling policies and the window state of all eight channels.
///
/// Build one per process and share it behind an `Arc`; rate limits only hold
/// when every caller goes through the same instance.
pub struct SamplingGovernor {
    rates: TraceRates,
    windows: [[WindowCounter; 2]; 4],
    counters: [Counters; 4],
    regime: Arc<RegimeSelector>,
    clock: Arc<dyn Clock>,
}

impl SamplingGovernor {
    /// Creates a governor driven by the cached system clock.
    pub fn new(rates: TraceRates, regime: Arc<RegimeSelector>) -> Self {
        Self::with_clock(rates, regime, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(rates: TraceRates, regime: Arc<RegimeSelector>, clock: Arc<dyn Clock>) -> Self {
        for category in TraceCategory::ALL {
            for r in Regime::ALL {
                info!(
                    component = "governor",
                    event = "policy_loaded",
                    category = %category,
                    regime = %r,
                    policy = %rates.get(category, r),
                    "trace policy configured"
                );
            }
        }

        Self {
            rates,
            windows: Default::default(),
            counters: Default::default(),
            regime,
            clock,
        }
    }

    /// Window start and count of one channel.
    pub fn window(&self, category: TraceCategory, regime: Regime) -> (u32, u32) {
        self.windows[category.index()][regime.index()].snapshot()
    }

    fn decide(&self, event_id: &[u8], category: TraceCategory, regime: Regime) -> bool {
        let spec = self.rates.get(category, regime);
        let hash_selected = spec.selects(event_hash(event_id));
        let now = self.clock.unix_secs();

        let admitted = self.windows[category.index()][regime.index()].try_admit(now, spec, hash_selected);
        self.counters[category.index()].record(admitted);
        admitted
    }
}

impl Governor for SamplingGovernor {
    fn should_trace(&self, event_id: &[u8], category: TraceCategory) -> bool {
        let regime = self.regime.current();
        self.decide(event_id, category, regime)
    }

    fn should_trace_in(&self, event_id: &[u8], category: TraceCategory, regime: Regime) -> bool {
        self.decide(event_id, category, regime)
    }

    fn regime(&self) -> &RegimeSelector {
        &self.regime
    }

    fn stats(&self) -> TraceStats {
        TraceStats::collect(&self.counters)
    }
}
