//! Normal / slow regime switch.

use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{info, warn};

use super::spec::Regime;

const NORMAL: u8 = 0;
const SLOW: u8 = 1;

/// Current regime, flipped by whoever observes system load.
#[derive(Debug)]
pub struct RegimeSelector {
    current: AtomicU8,
}

impl RegimeSelector {
    pub fn new(initial: Regime) -> Self {
        Self {
            current: AtomicU8::new(Self::encode(initial)),
        }
    }

    fn encode(regime: Regime) -> u8 {
        match regime {
            Regime::Normal => NORMAL,
            Regime::Slow => SLOW,
        }
    }

    fn decode(v: u8) -> Regime {
        if v == SLOW {
            Regime::Slow
        } else {
            Regime::Normal
        }
    }

    pub fn current(&self) -> Regime {
        Self::decode(self.current.load(Ordering::Acquire))
    }

    /// Switches the regime and returns the previous one.
    pub fn set(&self, regime: Regime) -> Regime {
        let prev = Self::decode(self.current.swap(Self::encode(regime), Ordering::AcqRel));
        if prev != regime {
            match regime {
                Regime::Slow => warn!(
                    component = "regime",
                    event = "switched",
                    from = %prev,
                    to = %regime,
                    "entered slow mode"
                ),
                Regime::Normal => info!(
                    component = "regime",
                    event = "switched",
                    from = %prev,
                    to = %regime,
                    "left slow mode"
                ),
            }
        }
        prev
    }

    pub fn enter_slow(&self) -> Regime {
        self.set(Regime::Slow)
    }

    pub fn leave_slow(&self) -> Regime {
        self.set(Regime::Normal)
    }

    pub fn is_slow(&self) -> bool {
        self.current() == Regime::Slow
    }
}

impl Default for RegimeSelector {
    fn default() -> Self {
        Self::new(Regime::Normal)
    }
}
