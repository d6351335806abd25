#![allow(dead_code)]

use std::sync::{Arc, atomic::{AtomicU64, Ordering::Relaxed}};
use bouncer::TimeSource;
use tracing_subscriber::EnvFilter;

pub const MINUTE_MS: u64 = 60 * 1_000;
pub const HOUR_MS: u64 = 60 * MINUTE_MS;

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self { now_ms: Arc::new(AtomicU64::new(now_ms)) }
    }

    pub fn advance(&self, millis: u64) {
        self.now_ms.fetch_add(millis, Relaxed);
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_ms.load(Relaxed)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
