//! Pipeline orchestrator - startup ordering and lifecycle.
//!
//! Startup follows a fixed order and any failing stage aborts the run:
//! queues and output guard, LogSink, EventSource, Dispatcher, WorkerPools.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use contracts::{Department, DispatchContext, LogLevel, LogWriter, RandomFactory, SimulationBlueprint};
use dispatcher::{Dispatcher, DispatcherHandle, RoutingTable};
use event_source::{EventSource, EventSourceHandle};
use log_sink::{emit, LogSink, LogSinkHandle, Logger, LoggerConfig, OutputGuard, StreamWriter};
use tracing::{debug, info, instrument, warn};
use worker_pool::{ServiceTiming, WorkerPool};

use super::PipelineStats;
use crate::error::CliError;

/// Longest wait for the LogSink to drain on shutdown
const LOG_DRAIN_LIMIT: Duration = Duration::from_millis(500);

/// How often the run loop checks for tasks that ended early
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated simulation blueprint
    pub blueprint: SimulationBlueprint,

    /// Run time limit (None = until shutdown signal)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run with the configured output until `shutdown` resolves or the
    /// duration elapses
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        let writer = StreamWriter::open(&self.config.blueprint.logging.output)
            .await
            .map_err(|e| CliError::startup("output", e))?;
        self.run_with_writer(writer, shutdown).await
    }

    /// Run with an explicit output transport
    #[instrument(name = "pipeline_run", skip_all)]
    pub async fn run_with_writer<W: LogWriter + 'static>(
        self,
        writer: W,
        shutdown: impl Future<Output = ()>,
    ) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // everything that can reject the blueprint runs before any task is spawned
        let table = RoutingTable::from_blueprint(blueprint)
            .map_err(|e| CliError::startup("dispatcher", e))?;
        if !table.is_complete() {
            return Err(CliError::startup(
                "dispatcher",
                "routing table does not cover every event code",
            )
            .into());
        }
        for (code, rule) in table.iter() {
            debug!(code = %code, primary = %rule.primary, alternative = ?rule.alternative, "Route");
        }
        for department in Department::ALL {
            if blueprint.departments.units(department) == 0 {
                return Err(CliError::startup(
                    "worker_pool",
                    format!("{department} needs at least one unit"),
                )
                .into());
            }
        }

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .map_err(|e| CliError::startup("metrics", e))?;
        }

        // 1. queues and the exclusive output guard
        let ctx = DispatchContext::new(&blueprint.queues)
            .map_err(|e| CliError::startup("queues", e))?;
        let guard = OutputGuard::new(writer);
        debug!(output = %guard.name(), "Queues and output guard created");

        // 2. LogSink, before anyone logs
        let log_sink = LogSink::new(&ctx, guard, blueprint.timeouts.output_lock()).spawn();
        let logger = Logger::new(&ctx, LoggerConfig::from(blueprint));
        emit!(logger, LogLevel::Info, "Logger Initialized.");

        // 3. EventSource
        let random = RandomFactory::from_seed(blueprint.random.seed);
        let source = EventSource::new(
            &ctx,
            &blueprint.event_source,
            random.source(0),
            logger.clone(),
        )
        .spawn();
        emit!(logger, LogLevel::Info, "Event Generator Initialized.");

        // 4. Dispatcher
        let dispatcher = Dispatcher::new(
            &ctx,
            table,
            blueprint.timeouts.department_send(),
            logger.clone(),
        )
        .spawn();
        emit!(logger, LogLevel::Info, "Dispatcher Task Initialized.");

        // 5. WorkerPools
        let timing = ServiceTiming::from_blueprint(blueprint);
        let mut pools = Vec::with_capacity(Department::ALL.len());
        for department in Department::ALL {
            let pool = match WorkerPool::spawn(
                &ctx,
                department,
                blueprint.departments.units(department),
                timing,
                &random,
                logger.clone(),
            ) {
                Ok(pool) => pool,
                Err(e) => {
                    abort_all(&log_sink, &source, &dispatcher, &pools);
                    return Err(CliError::startup("worker_pool", e).into());
                }
            };
            emit!(
                logger,
                LogLevel::Info,
                "{} Department Initialized with {} units.",
                department,
                pool.units()
            );
            pools.push(pool);
        }

        info!(
            seed = ?blueprint.random.seed,
            duration = ?self.config.duration,
            "Simulation running"
        );

        let limit = async {
            match self.config.duration {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        let watchdog = async {
            let mut poll = tokio::time::interval(TASK_POLL_INTERVAL);
            loop {
                poll.tick().await;
                if let Some(task) = exited_task(&log_sink, &source, &dispatcher, &pools) {
                    break task;
                }
            }
        };

        tokio::select! {
            _ = limit => {
                info!("Run duration elapsed");
            }
            _ = shutdown => {
                info!("Shutdown requested");
            }
            task = watchdog => {
                warn!(task, "Task exited early, stopping simulation");
            }
        }

        // stop producers first, then give the LogSink a moment to drain
        source.abort();
        dispatcher.abort();
        for pool in &pools {
            pool.abort();
        }
        let drain_deadline = Instant::now() + LOG_DRAIN_LIMIT;
        while !ctx.log_queue().is_empty() && Instant::now() < drain_deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        log_sink.abort();

        Ok(PipelineStats {
            duration: start_time.elapsed(),
            source: source.metrics().snapshot(),
            dispatch: dispatcher.metrics().snapshot(),
            pools: pools.iter().map(|p| p.metrics().snapshot()).collect(),
            log: log_sink.metrics().snapshot(),
            log_dropped: logger.dropped_count(),
        })
    }
}

/// Name of the first long-running task that has ended, if any
fn exited_task(
    log_sink: &LogSinkHandle,
    source: &EventSourceHandle,
    dispatcher: &DispatcherHandle,
    pools: &[WorkerPool],
) -> Option<&'static str> {
    if log_sink.is_finished() {
        return Some("log_sink");
    }
    if source.is_finished() {
        return Some("event_source");
    }
    if dispatcher.is_finished() {
        return Some("dispatcher");
    }
    pools
        .iter()
        .find(|pool| pool.any_exited())
        .map(|pool| pool.department().name())
}

fn abort_all(
    log_sink: &LogSinkHandle,
    source: &EventSourceHandle,
    dispatcher: &DispatcherHandle,
    pools: &[WorkerPool],
) {
    source.abort();
    dispatcher.abort();
    for pool in pools {
        pool.abort();
    }
    log_sink.abort();
}
