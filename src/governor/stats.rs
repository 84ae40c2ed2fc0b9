//! Counters for trace admission statistics.
//

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::spec::TraceCategory;

/// Admitted/denied totals for one category.
#[derive(Debug, Default)]
pub struct Counters {
    pub admitted: AtomicU64,
    pub denied: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&self, admitted: bool) {
        if admitted {
            self.admitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.denied.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Point-in-time totals for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub category: TraceCategory,
    pub admitted: u64,
    pub denied: u64,
}

/// Point-in-time totals for every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStats {
    pub channels: Vec<ChannelStats>,
}

impl TraceStats {
    pub(crate) fn collect(counters: &[Counters; 4]) -> Self {
        let channels = TraceCategory::ALL
            .iter()
            .map(|&category| {
                let c = &counters[category.index()];
                ChannelStats {
                    category,
                    admitted: c.admitted.load(Ordering::Relaxed),
                    denied: c.denied.load(Ordering::Relaxed),
                }
            })
            .collect();
        Self { channels }
    }

    pub fn channel(&self, category: TraceCategory) -> Option<&ChannelStats> {
        self.channels.iter().find(|c| c.category == category)
    }
}
