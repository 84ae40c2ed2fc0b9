#[path = "k8s/probe/liveness/mod.rs"]
pub mod liveness;
#[path = "shared/time/mod.rs"]
pub mod time;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod banker;
pub mod config;
pub mod controller;
pub mod governor;
pub mod http;
pub mod lifecycle;
pub mod router;
pub mod shutdown;
