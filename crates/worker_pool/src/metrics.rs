//! Per-pool monitoring state
//!
//! Written by the workers, read by reporting code. Never consulted for
//! scheduling.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use contracts::Department;
use observability::{RunningStats, StatsSummary};

/// What a worker is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Blocked on the department queue
    Idle,
    /// Simulating a service interval
    Busy,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Idle => f.write_str("idle"),
            WorkerState::Busy => f.write_str("busy"),
        }
    }
}

#[derive(Debug, Default)]
struct UnitSlot {
    busy: AtomicBool,
    processed: AtomicU64,
}

/// Monitoring state of one department's units
#[derive(Debug)]
pub struct PoolMetrics {
    department: Department,
    units: Vec<UnitSlot>,
    fallbacks: AtomicU64,
    service_ms: Mutex<RunningStats>,
}

impl PoolMetrics {
    pub fn new(department: Department, units: usize) -> Self {
        Self {
            department,
            units: (0..units).map(|_| UnitSlot::default()).collect(),
            fallbacks: AtomicU64::new(0),
            service_ms: Mutex::new(RunningStats::default()),
        }
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn units(&self) -> usize {
        self.units.len()
    }

    pub fn state(&self, unit: usize) -> Option<WorkerState> {
        self.units.get(unit).map(|slot| {
            if slot.busy.load(Ordering::Acquire) {
                WorkerState::Busy
            } else {
                WorkerState::Idle
            }
        })
    }

    /// Idle -> Busy
    pub(crate) fn begin(&self, unit: usize) {
        if let Some(slot) = self.units.get(unit) {
            slot.busy.store(true, Ordering::Release);
        }
        observability::record_worker_busy(self.department, self.busy_count());
    }

    /// Busy -> Idle, counting one processed event
    pub(crate) fn finish(&self, unit: usize, service_ms: f64) {
        if let Some(slot) = self.units.get(unit) {
            slot.processed.fetch_add(1, Ordering::Relaxed);
            slot.busy.store(false, Ordering::Release);
        }
        if let Ok(mut stats) = self.service_ms.lock() {
            stats.push(service_ms);
        }
        observability::record_worker_busy(self.department, self.busy_count());
        observability::record_service_duration_ms(self.department, service_ms);
        observability::record_event_processed(self.department);
    }

    pub(crate) fn inc_fallbacks(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        observability::record_random_fallback("worker_pool");
    }

    pub fn busy_count(&self) -> usize {
        self.units
            .iter()
            .filter(|slot| slot.busy.load(Ordering::Acquire))
            .count()
    }

    pub fn processed(&self, unit: usize) -> u64 {
        self.units
            .get(unit)
            .map_or(0, |slot| slot.processed.load(Ordering::Relaxed))
    }

    pub fn total_processed(&self) -> u64 {
        (0..self.units.len()).map(|unit| self.processed(unit)).sum()
    }

    pub fn random_fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn service_summary(&self) -> StatsSummary {
        self.service_ms
            .lock()
            .map(|stats| stats.summary())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            department: self.department,
            units: self.units(),
            busy: self.busy_count(),
            processed: self.total_processed(),
            random_fallbacks: self.random_fallbacks(),
            service_ms: self.service_summary(),
        }
    }
}

/// Snapshot of one pool (for reporting)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSnapshot {
    pub department: Department,
    pub units: usize,
    pub busy: usize,
    pub processed: u64,
    pub random_fallbacks: u64,
    pub service_ms: StatsSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let metrics = PoolMetrics::new(Department::Police, 3);
        assert_eq!(metrics.state(1), Some(WorkerState::Idle));

        metrics.begin(1);
        assert_eq!(metrics.state(1), Some(WorkerState::Busy));
        assert_eq!(metrics.busy_count(), 1);

        metrics.finish(1, 420.0);
        assert_eq!(metrics.state(1), Some(WorkerState::Idle));
        assert_eq!(metrics.processed(1), 1);
        assert_eq!(metrics.total_processed(), 1);
        assert_eq!(metrics.state(3), None);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.units, 3);
        assert_eq!(snapshot.busy, 0);
        assert_eq!(snapshot.service_ms.count, 1);
    }
}
