// Package lifecycle provides the collaborator interfaces.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{Config, Exchange};

/// Spend authorization service ("banker"). Must be running before the router
/// accepts traffic and must outlive it.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self) -> Result<()>;

    async fn shutdown(&self) -> Result<()>;

    /// Whether spend can be authorized right now.
    fn is_available(&self) -> bool;
}

/// Routing collaborator hosting the event intake and the exchange connectors.
#[async_trait::async_trait]
pub trait Router: Send + Sync {
    fn name(&self) -> &str;

    /// Hands the router the ledger it authorizes spend against.
    fn set_ledger(&self, ledger: Arc<dyn Ledger>);

    /// Binds the network transport and returns the bound address.
    async fn bind_transport(&self) -> Result<SocketAddr>;

    async fn start(&self) -> Result<()>;

    async fn shutdown(&self) -> Result<()>;

    /// Enables an exchange connector with no scheduled disablement.
    async fn activate_exchange(&self, exchange: &Exchange) -> Result<()>;
}

/// Builds the collaborators from a validated configuration.
pub trait CollaboratorFactory: Send + Sync {
    fn ledger(&self, cfg: &Config) -> Result<Arc<dyn Ledger>>;

    fn router(&self, cfg: &Config) -> Result<Arc<dyn Router>>;
}
