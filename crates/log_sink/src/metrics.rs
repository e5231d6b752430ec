//! LogSink metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the LogSink consumer
#[derive(Debug, Default)]
pub struct LogSinkMetrics {
    /// Records written through the output resource
    written: AtomicU64,
    /// Records dropped because the output resource was not acquired in time
    lock_timeouts: AtomicU64,
    /// Records the transport failed to write
    write_failures: AtomicU64,
}

impl LogSinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn inc_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lock_timeouts(&self) -> u64 {
        self.lock_timeouts.load(Ordering::Relaxed)
    }

    pub fn inc_lock_timeouts(&self) {
        self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn inc_write_failures(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LogSinkSnapshot {
        LogSinkSnapshot {
            written: self.written(),
            lock_timeouts: self.lock_timeouts(),
            write_failures: self.write_failures(),
        }
    }
}

/// Snapshot of LogSink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSinkSnapshot {
    pub written: u64,
    pub lock_timeouts: u64,
    pub write_failures: u64,
}
