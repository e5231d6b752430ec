//! Logger - producer side of the LogSink
//!
//! Every component holds a clone. Formatting happens at the call site, then
//! the record is enqueued with a small bounded wait; a record that does not
//! fit in time is dropped and counted.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    BoundedQueue, DispatchContext, LogLevel, LogRecord, SimulationBlueprint,
    DEFAULT_RECORD_MAX_BYTES,
};

/// Producer-side settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Records below this level are never formatted
    pub min_level: LogLevel,
    /// Bounded wait for the log queue
    pub send_timeout: Duration,
    /// Record size limit, terminator included
    pub record_max_bytes: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            send_timeout: Duration::from_millis(10),
            record_max_bytes: DEFAULT_RECORD_MAX_BYTES,
        }
    }
}

impl From<&SimulationBlueprint> for LoggerConfig {
    fn from(blueprint: &SimulationBlueprint) -> Self {
        Self {
            min_level: blueprint.logging.min_level,
            send_timeout: blueprint.timeouts.log_send(),
            record_max_bytes: blueprint.logging.record_max_bytes,
        }
    }
}

/// Cloneable producer handle into the log queue
#[derive(Debug, Clone)]
pub struct Logger {
    queue: BoundedQueue<LogRecord>,
    config: LoggerConfig,
    dropped: Arc<AtomicU64>,
}

impl Logger {
    pub fn new(ctx: &DispatchContext, config: LoggerConfig) -> Self {
        Self {
            queue: ctx.log_queue().clone(),
            config,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether records of `level` pass the threshold
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.config.min_level
    }

    pub fn min_level(&self) -> LogLevel {
        self.config.min_level
    }

    /// Format a record, or `None` when `level` is below the threshold
    pub fn format(&self, level: LogLevel, args: fmt::Arguments<'_>) -> Option<LogRecord> {
        if !self.enabled(level) {
            return None;
        }
        let message = match args.as_str() {
            Some(literal) => literal.to_string(),
            None => args.to_string(),
        };
        Some(LogRecord::new(
            level,
            &message,
            self.config.record_max_bytes,
        ))
    }

    /// Enqueue with a bounded wait
    ///
    /// Returns `false` if the record was dropped.
    pub async fn submit(&self, record: LogRecord) -> bool {
        match self
            .queue
            .push_timeout(record, self.config.send_timeout)
            .await
        {
            Ok(()) => true,
            Err(_) => {
                self.record_drop();
                false
            }
        }
    }

    /// Enqueue without waiting (for contexts that must never block)
    pub fn try_submit(&self, record: LogRecord) -> bool {
        match self.queue.try_push(record) {
            Ok(()) => true,
            Err(_) => {
                self.record_drop();
                false
            }
        }
    }

    /// Format and enqueue without waiting
    pub fn try_log(&self, level: LogLevel, args: fmt::Arguments<'_>) -> bool {
        match self.format(level, args) {
            Some(record) => self.try_submit(record),
            None => false,
        }
    }

    /// Records dropped because the log queue stayed full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        observability::record_log_dropped("queue_full");
    }
}

/// Log through a [`Logger`] with a bounded wait
///
/// The level threshold is checked once, before any formatting. Must be used
/// inside an async context.
///
/// ```ignore
/// emit!(logger, LogLevel::Warn, "Primary Dept [{}] is full", dept);
/// ```
#[macro_export]
macro_rules! emit {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let record = logger.format($level, ::std::format_args!($($arg)+));
        if let ::std::option::Option::Some(record) = record {
            logger.submit(record).await;
        }
    }};
}
