// Package governor provides the Governor interface.

use super::regime::RegimeSelector;
use super::spec::{Regime, TraceCategory};
use super::stats::TraceStats;

/// Per-event trace admission, shared by every routing worker.
pub trait Governor: Send + Sync {
    /// Decides whether the event is traced on `category` under the current regime.
    fn should_trace(&self, event_id: &[u8], category: TraceCategory) -> bool;

    /// Decides whether the event is traced on `category` under `regime`.
    fn should_trace_in(&self, event_id: &[u8], category: TraceCategory, regime: Regime) -> bool;

    /// Regime switch consulted by `should_trace`.
    fn regime(&self) -> &RegimeSelector;

    /// Admission totals since start.
    fn stats(&self) -> TraceStats;
}
