// Local banker: availability only, accounting lives with the real banker.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::lifecycle::Ledger;

pub struct LocalBanker {
    name: String,
    running: AtomicBool,
}

impl LocalBanker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl Ledger for LocalBanker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        info!(
            component = "banker",
            name = %self.name,
            event = "started",
            "spend authorization available"
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        info!(
            component = "banker",
            name = %self.name,
            event = "stopped",
            "spend authorization withdrawn"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
