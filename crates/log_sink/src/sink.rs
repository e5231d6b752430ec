//! LogSink - single consumer of the log queue
//!
//! Each record is written while holding the output guard, so records never
//! interleave. A record whose guard acquisition times out is dropped.

use std::sync::Arc;
use std::time::Duration;

use contracts::{BoundedQueue, DispatchContext, LogRecord, LogWriter};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::guard::OutputGuard;
use crate::metrics::LogSinkMetrics;

/// Result of handling one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    LockTimeout,
    Failed,
}

/// Consumer side of the logging path
pub struct LogSink<W> {
    queue: BoundedQueue<LogRecord>,
    guard: OutputGuard<W>,
    lock_timeout: Duration,
    metrics: Arc<LogSinkMetrics>,
}

impl<W: LogWriter + 'static> LogSink<W> {
    /// Bind the sink to the context's log queue; takes ownership of the guard
    pub fn new(ctx: &DispatchContext, guard: OutputGuard<W>, lock_timeout: Duration) -> Self {
        Self {
            queue: ctx.log_queue().clone(),
            guard,
            lock_timeout,
            metrics: Arc::new(LogSinkMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<LogSinkMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Consume records for the lifetime of the log queue
    #[instrument(name = "log_sink_run", skip(self), fields(output = %self.guard.name()))]
    pub async fn run(self) {
        debug!("LogSink started");
        while let Some(record) = self.queue.pop().await {
            self.write(&record).await;
        }
        debug!("LogSink stopped");
    }

    /// Spawn the consumer as a background task
    pub fn spawn(self) -> LogSinkHandle {
        let metrics = self.metrics();
        let task = tokio::spawn(self.run());
        LogSinkHandle { metrics, task }
    }

    /// Acquire, write the whole record, flush, release
    pub async fn write(&self, record: &LogRecord) -> WriteOutcome {
        let Some(mut writer) = self.guard.acquire(self.lock_timeout).await else {
            self.metrics.inc_lock_timeouts();
            observability::record_log_dropped("lock_timeout");
            return WriteOutcome::LockTimeout;
        };

        let result = match writer.write_record(record.as_bytes()).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        drop(writer);

        match result {
            Ok(()) => {
                self.metrics.inc_written();
                observability::record_log_written();
                WriteOutcome::Written
            }
            Err(e) => {
                self.metrics.inc_write_failures();
                error!(output = %self.guard.name(), error = %e, "Log record write failed");
                WriteOutcome::Failed
            }
        }
    }
}

/// Handle to a running LogSink task
pub struct LogSinkHandle {
    metrics: Arc<LogSinkMetrics>,
    task: JoinHandle<()>,
}

impl LogSinkHandle {
    pub fn metrics(&self) -> &Arc<LogSinkMetrics> {
        &self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the consumer; records still queued are discarded
    pub fn abort(&self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit;
    use crate::logger::{Logger, LoggerConfig};
    use crate::writers::MemoryWriter;
    use contracts::{ContractError, LogLevel, QueueCapacities};

    fn context() -> DispatchContext {
        DispatchContext::new(&QueueCapacities::default()).unwrap()
    }

    async fn wait_for_written(metrics: &LogSinkMetrics, expected: u64) {
        for _ in 0..200 {
            if metrics.written() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("only {} of {} records written", metrics.written(), expected);
    }

    /// Writer whose transport always fails
    struct BrokenWriter;

    impl LogWriter for BrokenWriter {
        fn name(&self) -> &str {
            "broken"
        }

        async fn write_record(&mut self, _record: &[u8]) -> Result<(), ContractError> {
            Err(ContractError::output_write("broken", "wire cut"))
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_writes_in_queue_order() {
        let ctx = context();
        let capture = MemoryWriter::new();
        let sink = LogSink::new(
            &ctx,
            OutputGuard::new(capture.clone()),
            Duration::from_millis(100),
        );
        let handle = sink.spawn();
        let logger = Logger::new(&ctx, LoggerConfig::default());

        emit!(logger, LogLevel::Info, "one");
        emit!(logger, LogLevel::Warn, "two");
        emit!(logger, LogLevel::Error, "three");

        wait_for_written(handle.metrics(), 3).await;
        assert_eq!(
            capture.records(),
            vec!["[INFO]  one\r\n", "[WARN]  two\r\n", "[ERROR] three\r\n"]
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_lock_timeout_drops_record() {
        let ctx = context();
        let capture = MemoryWriter::new();
        let sink = LogSink::new(
            &ctx,
            OutputGuard::new(capture.clone()),
            Duration::from_millis(20),
        );

        let held = sink.guard.writer.lock().await;
        let record = LogRecord::new(LogLevel::Info, "blocked", 128);
        assert_eq!(sink.write(&record).await, WriteOutcome::LockTimeout);
        drop(held);

        assert_eq!(sink.write(&record).await, WriteOutcome::Written);
        assert_eq!(capture.records().len(), 1);
        let snapshot = sink.metrics().snapshot();
        assert_eq!(snapshot.lock_timeouts, 1);
        assert_eq!(snapshot.written, 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_counted() {
        let ctx = context();
        let sink = LogSink::new(&ctx, OutputGuard::new(BrokenWriter), Duration::from_millis(20));
        let record = LogRecord::new(LogLevel::Error, "nowhere", 128);
        assert_eq!(sink.write(&record).await, WriteOutcome::Failed);
        assert_eq!(sink.metrics().write_failures(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_never_interleave() {
        let ctx = DispatchContext::new(&QueueCapacities {
            log: 256,
            ..Default::default()
        })
        .unwrap();
        let capture = MemoryWriter::new();
        let handle = LogSink::new(
            &ctx,
            OutputGuard::new(capture.clone()),
            Duration::from_millis(100),
        )
        .spawn();
        let logger = Logger::new(
            &ctx,
            LoggerConfig {
                send_timeout: Duration::from_millis(200),
                ..Default::default()
            },
        );

        let mut producers = Vec::new();
        for p in 0..8 {
            let logger = logger.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..20 {
                    emit!(logger, LogLevel::Info, "producer {p} record {i} {}", "#".repeat(60));
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        let expected = 160 - logger.dropped_count();
        wait_for_written(handle.metrics(), expected).await;

        for record in capture.records() {
            assert!(record.starts_with("[INFO]  producer "), "got: {record:?}");
            assert!(record.ends_with("\r\n"));
            assert_eq!(record.matches("\r\n").count(), 1);
            assert!(record.len() <= 128);
        }
        handle.abort();
    }
}
