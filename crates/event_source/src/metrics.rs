//! EventSource counters

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SourceMetrics {
    ticks: AtomicU64,
    generated: AtomicU64,
    dropped: AtomicU64,
    random_fallbacks: AtomicU64,
}

impl SourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn inc_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Events accepted by the dispatch queue
    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn inc_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Events lost to a full dispatch queue
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn random_fallbacks(&self) -> u64 {
        self.random_fallbacks.load(Ordering::Relaxed)
    }

    pub fn inc_random_fallbacks(&self) {
        self.random_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SourceSnapshot {
        SourceSnapshot {
            ticks: self.ticks(),
            generated: self.generated(),
            dropped: self.dropped(),
            random_fallbacks: self.random_fallbacks(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSnapshot {
    pub ticks: u64,
    pub generated: u64,
    pub dropped: u64,
    pub random_fallbacks: u64,
}
