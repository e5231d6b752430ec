//! EventSource task

use std::sync::Arc;

use contracts::{
    BoundedQueue, DispatchContext, Event, EventCode, EventSourceConfig, LogLevel, RandomSource,
    Tick,
};
use log_sink::Logger;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, instrument};

use crate::metrics::SourceMetrics;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Threshold not reached yet
    Idle,
    /// Event accepted by the dispatch queue
    Emitted(Event),
    /// Dispatch queue full, event discarded
    Dropped(Event),
}

/// Tick-driven event generator
///
/// The counters live here and nowhere else; only the owning task touches
/// them.
pub struct EventSource {
    queue: BoundedQueue<Event>,
    random: Box<dyn RandomSource>,
    logger: Logger,
    tick: Duration,
    min_delay: u32,
    max_delay: u32,
    /// Ticks since startup, used as event timestamp
    now: Tick,
    ticks_since_event: u32,
    ticks_until_next: u32,
    metrics: Arc<SourceMetrics>,
}

impl EventSource {
    pub fn new(
        ctx: &DispatchContext,
        config: &EventSourceConfig,
        random: Box<dyn RandomSource>,
        logger: Logger,
    ) -> Self {
        let min_delay = config.min_delay_ticks().max(1);
        let max_delay = config.max_delay_ticks().max(min_delay);
        Self {
            queue: ctx.dispatch_queue().clone(),
            random,
            logger,
            tick: config.tick(),
            min_delay,
            max_delay,
            now: 0,
            ticks_since_event: 0,
            ticks_until_next: min_delay,
            metrics: Arc::new(SourceMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<SourceMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Ticks left before the next emission attempt
    pub fn ticks_until_next(&self) -> u32 {
        self.ticks_until_next.saturating_sub(self.ticks_since_event)
    }

    /// One timer period; never waits
    pub fn on_tick(&mut self) -> TickOutcome {
        self.now += 1;
        self.ticks_since_event += 1;
        self.metrics.inc_ticks();

        if self.ticks_since_event < self.ticks_until_next {
            return TickOutcome::Idle;
        }

        let event = Event::new(self.draw_code(), self.now);
        let outcome = match self.queue.try_push(event) {
            Ok(()) => {
                self.metrics.inc_generated();
                observability::record_event_generated(event.code);
                self.logger.try_log(
                    LogLevel::Debug,
                    format_args!(
                        "EventSource generated event code {} at tick {}",
                        event.code, event.timestamp
                    ),
                );
                TickOutcome::Emitted(event)
            }
            Err(_) => {
                self.metrics.inc_dropped();
                observability::record_event_dropped(event.code);
                self.logger.try_log(
                    LogLevel::Warn,
                    format_args!(
                        "Dispatcher queue full, event code {} dropped",
                        event.code
                    ),
                );
                TickOutcome::Dropped(event)
            }
        };

        self.ticks_until_next = self.draw_delay();
        self.ticks_since_event = 0;
        outcome
    }

    fn draw_code(&mut self) -> EventCode {
        match self.random.next_u32() {
            Ok(value) => EventCode::from_random(value),
            Err(_) => {
                self.record_fallback();
                EventCode::FALLBACK
            }
        }
    }

    fn draw_delay(&mut self) -> u32 {
        match self.random.draw_in_range(self.min_delay, self.max_delay) {
            Some(ticks) => ticks,
            None => {
                self.record_fallback();
                self.min_delay
            }
        }
    }

    fn record_fallback(&self) {
        self.metrics.inc_random_fallbacks();
        observability::record_random_fallback("event_source");
    }

    /// Drive `on_tick` from a periodic timer for the lifetime of the task
    #[instrument(name = "event_source_run", skip(self), fields(tick_ms = self.tick.as_millis() as u64))]
    pub async fn run(mut self) {
        debug!(
            min_delay = self.min_delay,
            max_delay = self.max_delay,
            "EventSource started"
        );
        let mut timer = interval_at(Instant::now() + self.tick, self.tick);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            timer.tick().await;
            self.on_tick();
        }
    }

    pub fn spawn(self) -> EventSourceHandle {
        let metrics = self.metrics();
        let task = tokio::spawn(self.run());
        EventSourceHandle { metrics, task }
    }
}

/// Handle to a running EventSource task
pub struct EventSourceHandle {
    metrics: Arc<SourceMetrics>,
    task: JoinHandle<()>,
}

impl EventSourceHandle {
    pub fn metrics(&self) -> &Arc<SourceMetrics> {
        &self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}
