//! Cached wall-clock time and the clock abstraction used by the governor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

static NOW_UNIX_SECS: AtomicU64 = AtomicU64::new(0);

fn system_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Starts the time caching ticker.
/// Updates the cached time value at the specified resolution.
/// Cancel the returned token to stop the ticker.
pub fn start(resolution: Duration) -> CancellationToken {
    NOW_UNIX_SECS.store(system_unix_secs(), Ordering::Relaxed);

    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(resolution);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    NOW_UNIX_SECS.store(system_unix_secs(), Ordering::Relaxed);
                }
                _ = token_clone.cancelled() => {
                    break;
                }
            }
        }
    });

    token
}

/// Returns the cached current time as Unix seconds.
/// Falls back to a syscall while the ticker has not been started.
pub fn unix_secs() -> u64 {
    match NOW_UNIX_SECS.load(Ordering::Relaxed) {
        0 => system_unix_secs(),
        secs => secs,
    }
}

/// Source of second-granularity wall-clock time.
pub trait Clock: Send + Sync {
    /// Current Unix time in whole seconds.
    fn unix_secs(&self) -> u64;
}

/// Clock backed by the cached ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn unix_secs(&self) -> u64 {
        unix_secs()
    }
}

/// Manually driven clock. All clones share the same time value.
#[derive(Debug, Clone)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(start_secs)),
        }
    }

    /// Moves time forward by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn unix_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}
