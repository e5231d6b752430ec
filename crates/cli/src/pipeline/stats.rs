//! Run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use event_source::SourceSnapshot;
use log_sink::LogSinkSnapshot;
use serde::Serialize;
use worker_pool::PoolSnapshot;

/// Statistics from one simulation run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Wall-clock run time
    pub duration: Duration,

    /// EventSource counters
    pub source: SourceSnapshot,

    /// Routing outcomes
    pub dispatch: MetricsSnapshot,

    /// One entry per department
    pub pools: Vec<PoolSnapshot>,

    /// LogSink consumer counters
    pub log: LogSinkSnapshot,

    /// Records dropped by producers (log queue full)
    pub log_dropped: u64,
}

impl PipelineStats {
    /// Events per second accepted into the dispatch queue
    pub fn event_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.source.generated as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of generated events that never reached a department queue, in percent
    pub fn loss_rate(&self) -> f64 {
        let offered = self.source.generated + self.source.dropped;
        if offered > 0 {
            let lost = self.source.dropped + self.dispatch.lost + self.dispatch.unrouted;
            (lost as f64 / offered as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn total_processed(&self) -> u64 {
        self.pools.iter().map(|p| p.processed).sum()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Simulation Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Ticks: {}", self.source.ticks);
        println!("   ├─ Events generated: {}", self.source.generated);
        println!("   ├─ Events dropped (dispatch queue full): {}", self.source.dropped);
        println!("   ├─ Event rate: {:.2}/s", self.event_rate());
        println!("   └─ Loss rate: {:.2}%", self.loss_rate());

        println!("\n🚦 Dispatcher");
        println!("   ├─ Delivered: {}", self.dispatch.delivered);
        println!("   ├─ Redirected: {}", self.dispatch.redirected);
        println!("   ├─ Fell back: {}", self.dispatch.fell_back);
        println!("   ├─ Lost: {}", self.dispatch.lost);
        println!("   └─ Unrouted: {}", self.dispatch.unrouted);

        println!("\n🚑 Departments");
        for (i, pool) in self.pools.iter().enumerate() {
            let prefix = if i == self.pools.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {}: {} units, {} processed, service ms {}",
                prefix, pool.department, pool.units, pool.processed, pool.service_ms
            );
        }

        println!("\n📝 Log");
        println!("   ├─ Written: {}", self.log.written);
        println!("   ├─ Dropped (queue full): {}", self.log_dropped);
        println!("   ├─ Dropped (output busy): {}", self.log.lock_timeouts);
        println!("   └─ Write failures: {}", self.log.write_failures);

        println!();
    }
}

/// Serializable form of the statistics
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub duration_secs: f64,
    pub generated: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub redirected: u64,
    pub fell_back: u64,
    pub lost: u64,
    pub unrouted: u64,
    pub processed: u64,
    pub log_written: u64,
    pub log_dropped: u64,
}

impl From<&PipelineStats> for StatsReport {
    fn from(stats: &PipelineStats) -> Self {
        Self {
            duration_secs: stats.duration.as_secs_f64(),
            generated: stats.source.generated,
            dropped: stats.source.dropped,
            delivered: stats.dispatch.delivered,
            redirected: stats.dispatch.redirected,
            fell_back: stats.dispatch.fell_back,
            lost: stats.dispatch.lost,
            unrouted: stats.dispatch.unrouted,
            processed: stats.total_processed(),
            log_written: stats.log.written,
            log_dropped: stats.log_dropped + stats.log.lock_timeouts,
        }
    }
}
