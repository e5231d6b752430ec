//! Dispatcher metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use crate::dispatcher::DispatchOutcome;

/// Per-outcome counters
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    received: AtomicU64,
    delivered: AtomicU64,
    redirected: AtomicU64,
    fell_back: AtomicU64,
    lost: AtomicU64,
    unrouted: AtomicU64,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one routed event
    pub fn record(&self, outcome: &DispatchOutcome) {
        self.received.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DispatchOutcome::Delivered(_) => &self.delivered,
            DispatchOutcome::Redirected { .. } => &self.redirected,
            DispatchOutcome::FellBack(_) => &self.fell_back,
            DispatchOutcome::Lost(_) => &self.lost,
            DispatchOutcome::Unrouted(_) => &self.unrouted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn redirected(&self) -> u64 {
        self.redirected.load(Ordering::Relaxed)
    }

    pub fn fell_back(&self) -> u64 {
        self.fell_back.load(Ordering::Relaxed)
    }

    /// Events whose final send timed out
    pub fn lost(&self) -> u64 {
        self.lost.load(Ordering::Relaxed)
    }

    pub fn unrouted(&self) -> u64 {
        self.unrouted.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received(),
            delivered: self.delivered(),
            redirected: self.redirected(),
            fell_back: self.fell_back(),
            lost: self.lost(),
            unrouted: self.unrouted(),
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub delivered: u64,
    pub redirected: u64,
    pub fell_back: u64,
    pub lost: u64,
    pub unrouted: u64,
}
