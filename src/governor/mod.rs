//! Trace sampling governance: policies, windows, regime switch.

pub mod api;
pub mod governor;
pub mod regime;
pub mod spec;
pub mod stats;
pub mod window;


pub use api::Governor;
pub use governor::SamplingGovernor;
pub use regime::RegimeSelector;
pub use spec::{event_hash, Regime, RegimeRates, TraceCategory, TraceRateSpec, TraceRates};
pub use stats::{ChannelStats, TraceStats};
pub use window::WindowCounter;
