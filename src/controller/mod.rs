// HTTP admin controllers.

pub mod config;
pub mod controller;
pub mod metrics;
pub mod probe;
pub mod regime;
pub mod traces;

pub use config::ShowConfigController;
pub use metrics::PrometheusMetricsController;
pub use probe::LivenessProbeController;
pub use regime::RegimeController;
pub use traces::TraceStatsController;
