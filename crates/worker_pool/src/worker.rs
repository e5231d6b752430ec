//! Single response unit

use std::sync::Arc;

use contracts::{BoundedQueue, Event, LogLevel, RandomSource};
use log_sink::{emit, Logger};
use tracing::{debug, instrument};

use crate::metrics::PoolMetrics;
use crate::timing::ServiceTiming;

pub(crate) struct Worker {
    pub(crate) name: String,
    pub(crate) unit: usize,
    pub(crate) queue: BoundedQueue<Event>,
    pub(crate) timing: ServiceTiming,
    pub(crate) random: Box<dyn RandomSource>,
    pub(crate) logger: Logger,
    pub(crate) metrics: Arc<PoolMetrics>,
}

impl Worker {
    /// Wait, serve, repeat for the lifetime of the department queue
    #[instrument(name = "worker_run", skip(self), fields(worker = %self.name))]
    pub(crate) async fn run(mut self) {
        emit!(
            self.logger,
            LogLevel::Info,
            "{} Task started, listening on its queue.",
            self.name
        );

        loop {
            emit!(self.logger, LogLevel::Debug, "{} waiting for event...", self.name);
            let Some(event) = self.queue.pop().await else {
                break;
            };
            self.serve(event).await;
        }

        debug!(worker = %self.name, "Worker stopped");
    }

    async fn serve(&mut self, event: Event) {
        self.metrics.begin(self.unit);
        emit!(
            self.logger,
            LogLevel::Info,
            "{} received event code {}. Processing...",
            self.name,
            event.code
        );

        let (ticks, fallback) = self.timing.draw(self.random.as_mut());
        if fallback {
            self.metrics.inc_fallbacks();
        }
        let duration = self.timing.duration(ticks);
        emit!(
            self.logger,
            LogLevel::Debug,
            "{} task duration: {} ticks ({} ms)",
            self.name,
            ticks,
            duration.as_millis()
        );

        tokio::time::sleep(duration).await;

        emit!(
            self.logger,
            LogLevel::Info,
            "{} finished processing call {}. Becoming idle.",
            self.name,
            event.code
        );
        self.metrics.finish(self.unit, duration.as_secs_f64() * 1000.0);
    }
}
