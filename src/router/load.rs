//! Intake load monitor feeding the regime selector.
//
// Same packed (second, count) word as the governor windows: the caller that
// rolls a second over is the only one judging the closed second.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::governor::{Regime, RegimeSelector};
use crate::time::Clock;

pub struct LoadMonitor {
    /// Events per second above which the router is slow, `0` disables.
    threshold: u64,
    state: AtomicU64,
    reported_slow: AtomicBool,
    regime: Arc<RegimeSelector>,
    clock: Arc<dyn Clock>,
}

impl LoadMonitor {
    pub fn new(threshold: u64, regime: Arc<RegimeSelector>, clock: Arc<dyn Clock>) -> Self {
        let reported_slow = AtomicBool::new(regime.is_slow());
        Self {
            threshold,
            state: AtomicU64::new(0),
            reported_slow,
            regime,
            clock,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold > 0
    }

    /// Counts one intake event.
    pub fn observe(&self) {
        self.advance(1);
    }

    /// Closes an elapsed second even when no events arrive.
    pub fn tick(&self) {
        self.advance(0);
    }

    fn advance(&self, add: u32) {
        if !self.is_enabled() {
            return;
        }
        // Saturates past u32::MAX seconds like the trace windows do.
        let now = u32::try_from(self.clock.unix_secs()).unwrap_or(u32::MAX);
        let mut cur = self.state.load(Ordering::Acquire);
        loop {
            let (second, count) = ((cur >> 32) as u32, cur as u32);
            let rolled = now > second;
            let next = if rolled {
                (u64::from(now) << 32) | u64::from(add)
            } else {
                (u64::from(second) << 32) | u64::from(count.saturating_add(add))
            };
            if next == cur {
                return;
            }
            match self
                .state
                .compare_exchange_weak(cur, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    if rolled && second != 0 {
                        // A gap of more than one second means the later seconds were idle.
                        let last = if now - second > 1 { 0 } else { count };
                        self.judge(last);
                    }
                    return;
                }
                Err(actual) => cur = actual,
            }
        }
    }

    fn judge(&self, events_per_sec: u32) {
        let slow = u64::from(events_per_sec) > self.threshold;
        debug!(
            component = "load_monitor",
            event = "second_closed",
            events = events_per_sec,
            threshold = self.threshold,
            "intake rate measured"
        );
        // Only transitions are reported, so an operator override sticks until
        // the load actually changes.
        if self.reported_slow.swap(slow, Ordering::AcqRel) != slow {
            self.regime.set(if slow { Regime::Slow } else { Regime::Normal });
        }
    }
}
