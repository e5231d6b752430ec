//! 仿真指标
//!
//! `metrics` 门面的薄封装。未安装 recorder 时所有调用均为空操作。

use contracts::{Department, EventCode};
use metrics::{counter, gauge, histogram};

/// Event accepted into the dispatch queue
pub fn record_event_generated(code: EventCode) {
    counter!("dispatch_sim_events_generated_total", "code" => code.to_string()).increment(1);
}

/// Event discarded because the dispatch queue was full
pub fn record_event_dropped(code: EventCode) {
    counter!("dispatch_sim_events_dropped_total", "code" => code.to_string()).increment(1);
}

/// Random draw failed and a fallback value was used
pub fn record_random_fallback(component: &'static str) {
    counter!("dispatch_sim_random_fallbacks_total", "component" => component).increment(1);
}

/// Routing decision for one event
///
/// `outcome` is one of `delivered`, `redirected`, `fell_back`, `lost`,
/// `unrouted`.
pub fn record_dispatch_outcome(outcome: &'static str, department: Option<Department>) {
    let department = department.map(Department::name).unwrap_or("none");
    counter!(
        "dispatch_sim_dispatch_total",
        "outcome" => outcome,
        "department" => department
    )
    .increment(1);
}

/// Current depth of a named queue
pub fn record_queue_depth(queue: &str, depth: usize) {
    gauge!("dispatch_sim_queue_depth", "queue" => queue.to_string()).set(depth as f64);
}

/// Number of busy units in a department
pub fn record_worker_busy(department: Department, busy: usize) {
    gauge!("dispatch_sim_workers_busy", "department" => department.name()).set(busy as f64);
}

/// Simulated service time of one event
pub fn record_service_duration_ms(department: Department, millis: f64) {
    histogram!("dispatch_sim_service_duration_ms", "department" => department.name())
        .record(millis);
}

/// Event fully serviced by a worker
pub fn record_event_processed(department: Department) {
    counter!("dispatch_sim_events_processed_total", "department" => department.name())
        .increment(1);
}

/// Log record dropped (`queue_full` or `lock_timeout`)
pub fn record_log_dropped(reason: &'static str) {
    counter!("dispatch_sim_log_dropped_total", "reason" => reason).increment(1);
}

/// Log record written to the output
pub fn record_log_written() {
    counter!("dispatch_sim_log_written_total").increment(1);
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            min: self.min,
            max: self.max,
            mean: self.mean(),
            std_dev: self.std_dev(),
        }
    }
}

/// Frozen view of [`RunningStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "n/a");
        }
        write!(
            f,
            "n={} min={:.0} max={:.0} mean={:.1} sd={:.1}",
            self.count, self.min, self.max, self.mean, self.std_dev
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [200.0, 400.0, 600.0, 800.0, 1000.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 600.0).abs() < 1e-9);
        assert!((stats.min() - 200.0).abs() < 1e-9);
        assert!((stats.max() - 1000.0).abs() < 1e-9);
        assert!((stats.variance() - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(StatsSummary::default().to_string(), "n/a");

        let mut stats = RunningStats::default();
        stats.push(300.0);
        stats.push(500.0);
        let text = stats.summary().to_string();
        assert!(text.contains("n=2"));
        assert!(text.contains("mean=400.0"));
    }

    #[test]
    fn test_helpers_without_recorder() {
        record_event_generated(EventCode::Police);
        record_dispatch_outcome("lost", None);
        record_worker_busy(Department::FireDept, 2);
        record_log_dropped("queue_full");
    }
}
