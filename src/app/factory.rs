// Builds the in-process collaborators.

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::banker::LocalBanker;
use crate::config::{Config, ConfigTrait};
use crate::governor::{Governor, RegimeSelector};
use crate::lifecycle::{CollaboratorFactory, Ledger, Router};
use crate::router::EventRouter;
use crate::time::Clock;

/// Creates a `LocalBanker` and an `EventRouter` sharing one governor.
pub struct DefaultFactory {
    shutdown_token: CancellationToken,
    governor: Arc<dyn Governor>,
    regime: Arc<RegimeSelector>,
    clock: Arc<dyn Clock>,
}

impl DefaultFactory {
    pub fn new(
        shutdown_token: CancellationToken,
        governor: Arc<dyn Governor>,
        regime: Arc<RegimeSelector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shutdown_token,
            governor,
            regime,
            clock,
        }
    }
}

impl CollaboratorFactory for DefaultFactory {
    fn ledger(&self, cfg: &Config) -> Result<Arc<dyn Ledger>> {
        let name = format!("{}.slaveBanker", cfg.service_name());
        Ok(Arc::new(LocalBanker::new(name)))
    }

    fn router(&self, cfg: &Config) -> Result<Arc<dyn Router>> {
        Ok(Arc::new(EventRouter::new(
            cfg.service_name(),
            self.shutdown_token.child_token(),
            cfg,
            self.governor.clone(),
            self.regime.clone(),
            self.clock.clone(),
        )))
    }
}
