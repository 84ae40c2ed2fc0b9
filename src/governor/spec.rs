//! Trace sampling policies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One sampling policy for a single (category, regime) channel.
///
/// `max == 0` means the channel is not capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TraceRateSpec {
    /// Cap on admissions per one-second window, `0` = unlimited.
    #[serde(default)]
    pub max: u32,
    /// Admissions guaranteed per window even when the hash misses.
    #[serde(default)]
    pub min: u32,
    /// Hash-selection modulus, `0` disables hash selection.
    #[serde(rename = "mod", default)]
    pub modulus: u32,
    /// Every event is eligible (still bounded by `max`).
    #[serde(default)]
    pub all: bool,
}

impl TraceRateSpec {
    pub const fn new(max: u32, min: u32, modulus: u32, all: bool) -> Self {
        Self {
            max,
            min,
            modulus,
            all,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.max == 0
    }

    /// Hash-selection rule. Stable for a given hash.
    pub fn selects(&self, hash: u64) -> bool {
        self.modulus > 0 && hash % u64::from(self.modulus) == 0
    }

    /// Admission rule evaluated against the count already admitted in the
    /// current window. The cap wins over every other rule.
    pub fn admits(&self, count: u32, hash_selected: bool) -> bool {
        if self.max != 0 && count >= self.max {
            return false;
        }
        self.all || hash_selected || count < self.min
    }
}

impl fmt::Display for TraceRateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max={} min={} mod={} all={}",
            self.max, self.min, self.modulus, self.all
        )
    }
}

/// Independent observability channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceCategory {
    AuctionMetric,
    BidMetric,
    AuctionMessage,
    BidMessage,
}

impl TraceCategory {
    pub const ALL: [TraceCategory; 4] = [
        TraceCategory::AuctionMetric,
        TraceCategory::BidMetric,
        TraceCategory::AuctionMessage,
        TraceCategory::BidMessage,
    ];

    pub(crate) const fn index(self) -> usize {
        match self {
            TraceCategory::AuctionMetric => 0,
            TraceCategory::BidMetric => 1,
            TraceCategory::AuctionMessage => 2,
            TraceCategory::BidMessage => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TraceCategory::AuctionMetric => "auction_metric",
            TraceCategory::BidMetric => "bid_metric",
            TraceCategory::AuctionMessage => "auction_message",
            TraceCategory::BidMessage => "bid_message",
        }
    }
}

impl fmt::Display for TraceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode under which trace limits are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Normal,
    Slow,
}

impl Regime {
    pub const ALL: [Regime; 2] = [Regime::Normal, Regime::Slow];

    pub(crate) const fn index(self) -> usize {
        match self {
            Regime::Normal => 0,
            Regime::Slow => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Normal => "normal",
            Regime::Slow => "slow",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normal and slow-mode specs for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegimeRates {
    pub normal: TraceRateSpec,
    pub slow: TraceRateSpec,
}

impl RegimeRates {
    pub fn get(&self, regime: Regime) -> &TraceRateSpec {
        match regime {
            Regime::Normal => &self.normal,
            Regime::Slow => &self.slow,
        }
    }
}

/// The eight specs, one per (category, regime) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRates {
    specs: [[TraceRateSpec; 2]; 4],
}

impl TraceRates {
    pub fn new(
        auction_metric: RegimeRates,
        bid_metric: RegimeRates,
        auction_message: RegimeRates,
        bid_message: RegimeRates,
    ) -> Self {
        let pair = |r: RegimeRates| [r.normal, r.slow];
        Self {
            specs: [
                pair(auction_metric),
                pair(bid_metric),
                pair(auction_message),
                pair(bid_message),
            ],
        }
    }

    /// Same spec on every channel.
    pub fn uniform(spec: TraceRateSpec) -> Self {
        Self {
            specs: [[spec; 2]; 4],
        }
    }

    pub fn get(&self, category: TraceCategory, regime: Regime) -> &TraceRateSpec {
        &self.specs[category.index()][regime.index()]
    }

    pub fn with(mut self, category: TraceCategory, regime: Regime, spec: TraceRateSpec) -> Self {
        self.specs[category.index()][regime.index()] = spec;
        self
    }
}

/// Stable hash of an event identity used for hash selection.
pub fn event_hash(event_id: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(event_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_wins_over_all_and_hash() {
        let spec = TraceRateSpec::new(3, 1, 2, true);
        assert!(spec.admits(2, true));
        assert!(!spec.admits(3, true));
        assert!(!spec.admits(3, false));
    }

    #[test]
    fn test_zero_max_is_unlimited() {
        let spec = TraceRateSpec::new(0, 0, 0, true);
        assert!(spec.is_unlimited());
        assert!(spec.admits(u32::MAX - 1, false));
    }

    #[test]
    fn test_zero_mod_never_selects() {
        let spec = TraceRateSpec::new(10, 0, 0, false);
        for h in 0..64 {
            assert!(!spec.selects(h));
        }
    }

    #[test]
    fn test_floor_admits_below_min_only() {
        let spec = TraceRateSpec::new(5, 2, 0, false);
        assert!(spec.admits(0, false));
        assert!(spec.admits(1, false));
        assert!(!spec.admits(2, false));
    }

    #[test]
    fn test_event_hash_is_stable_for_any_bytes() {
        assert_eq!(event_hash(b""), event_hash(b""));
        assert_eq!(event_hash(&[0xff, 0xfe, 0x00]), event_hash(&[0xff, 0xfe, 0x00]));
        assert_ne!(event_hash(b"auction-1"), event_hash(b"auction-2"));
    }

    #[test]
    fn test_spec_deserializes_mod_keyword() {
        let spec: TraceRateSpec = serde_yaml::from_str("{max: 3, min: 1, mod: 2}").unwrap();
        assert_eq!(spec, TraceRateSpec::new(3, 1, 2, false));
    }

    #[test]
    fn test_rates_lookup_per_channel() {
        let special = TraceRateSpec::new(9, 9, 9, false);
        let rates = TraceRates::uniform(TraceRateSpec::new(1, 0, 0, false)).with(
            TraceCategory::BidMessage,
            Regime::Slow,
            special,
        );
        assert_eq!(*rates.get(TraceCategory::BidMessage, Regime::Slow), special);
        assert_ne!(*rates.get(TraceCategory::BidMessage, Regime::Normal), special);
    }
}
