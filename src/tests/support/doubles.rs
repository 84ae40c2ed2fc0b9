// Instrumented collaborators recording every lifecycle call.

use anyhow::{bail, Result};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Config, Exchange};
use crate::lifecycle::{CollaboratorFactory, Ledger, Router};

/// Shared, ordered call log.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Position of `entry`, panics when it was never recorded.
    pub fn position(&self, entry: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{entry} not recorded in {:?}", self.entries()))
    }
}

/// Which collaborator calls fail.
#[derive(Clone, Copy, Default)]
pub struct Faults {
    pub ledger_start: bool,
    pub ledger_shutdown: bool,
    pub router_bind: bool,
    pub router_start: bool,
    pub router_shutdown: bool,
    pub router_build: bool,
}

pub struct RecordingLedger {
    journal: Journal,
    faults: Faults,
    running: AtomicBool,
}

#[async_trait::async_trait]
impl Ledger for RecordingLedger {
    fn name(&self) -> &str {
        "recording-ledger"
    }

    async fn start(&self) -> Result<()> {
        self.journal.push("ledger.start");
        if self.faults.ledger_start {
            bail!("ledger refused to start");
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.journal.push("ledger.shutdown");
        self.running.store(false, Ordering::SeqCst);
        if self.faults.ledger_shutdown {
            bail!("ledger stuck");
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub struct RecordingRouter {
    journal: Journal,
    faults: Faults,
    ledger: Mutex<Option<Arc<dyn Ledger>>>,
}

#[async_trait::async_trait]
impl Router for RecordingRouter {
    fn name(&self) -> &str {
        "recording-router"
    }

    fn set_ledger(&self, ledger: Arc<dyn Ledger>) {
        self.journal.push("router.set_ledger");
        *self.ledger.lock() = Some(ledger);
    }

    async fn bind_transport(&self) -> Result<SocketAddr> {
        self.journal.push("router.bind_transport");
        if self.faults.router_bind {
            bail!("address in use");
        }
        Ok("127.0.0.1:9950".parse()?)
    }

    async fn start(&self) -> Result<()> {
        let ledger_up = self.ledger.lock().as_ref().map(|l| l.is_available()).unwrap_or(false);
        self.journal.push(format!("router.start ledger_available={ledger_up}"));
        if self.faults.router_start {
            bail!("router refused to start");
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        let ledger_up = self.ledger.lock().as_ref().map(|l| l.is_available()).unwrap_or(false);
        self.journal.push(format!("router.shutdown ledger_available={ledger_up}"));
        if self.faults.router_shutdown {
            bail!("router stuck");
        }
        Ok(())
    }

    async fn activate_exchange(&self, exchange: &Exchange) -> Result<()> {
        self.journal.push(format!("router.activate {}", exchange.display_name()));
        Ok(())
    }
}

/// Factory handing out recording doubles that share one journal.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub journal: Journal,
    pub faults: Faults,
}

impl RecordingFactory {
    pub fn with_faults(faults: Faults) -> Self {
        Self {
            journal: Journal::default(),
            faults,
        }
    }
}

impl CollaboratorFactory for RecordingFactory {
    fn ledger(&self, _cfg: &Config) -> Result<Arc<dyn Ledger>> {
        self.journal.push("factory.ledger");
        Ok(Arc::new(RecordingLedger {
            journal: self.journal.clone(),
            faults: self.faults,
            running: AtomicBool::new(false),
        }))
    }

    fn router(&self, _cfg: &Config) -> Result<Arc<dyn Router>> {
        self.journal.push("factory.router");
        if self.faults.router_build {
            bail!("router construction failed");
        }
        Ok(Arc::new(RecordingRouter {
            journal: self.journal.clone(),
            faults: self.faults,
            ledger: Mutex::new(None),
        }))
    }
}
