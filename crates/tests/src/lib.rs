//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract snapshots (queue names, defaults)
//! - Overflow scenario through a real LogSink
//! - Full pipeline smoke run (no external output)

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchContext, QueueCapacities, SimulationBlueprint};

    #[test]
    fn test_default_blueprint_is_valid() {
        let blueprint = SimulationBlueprint::default();
        config_loader::ConfigLoader::validate(&blueprint).unwrap();
    }

    #[test]
    fn test_queue_names() {
        let ctx = DispatchContext::new(&QueueCapacities::default()).unwrap();
        assert_eq!(ctx.dispatch_queue().name(), "DispatcherQ");
        assert_eq!(ctx.log_queue().name(), "LoggerQ");
        assert_eq!(ctx.dispatch_queue().capacity(), 20);
        assert_eq!(ctx.log_queue().capacity(), 50);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        Department, DispatchContext, Event, EventCode, LogLevel, LogRecord, QueueCapacities,
        RandomFactory,
    };
    use dispatcher::{Dispatcher, RoutingTable};
    use event_source::EventSource;
    use log_sink::{LogSink, Logger, LoggerConfig, MemoryWriter, OutputGuard};
    use worker_pool::{ServiceTiming, WorkerPool};

    const SEND_TIMEOUT: Duration = Duration::from_millis(10);
    const LOCK_TIMEOUT: Duration = Duration::from_millis(100);

    async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    }

    /// Ambulance and Police queues hold one event each and nothing consumes
    /// them. Three ambulance calls: the first stays home, the second
    /// overflows to Police, the third waits on Ambulance and is lost.
    #[tokio::test]
    async fn test_three_ambulance_calls_overflow() {
        let ctx = DispatchContext::new(&QueueCapacities {
            police: 1,
            ambulance: 1,
            ..Default::default()
        })
        .unwrap();
        let capture = MemoryWriter::new();
        let sink = LogSink::new(&ctx, OutputGuard::new(capture.clone()), LOCK_TIMEOUT).spawn();
        let logger = Logger::new(&ctx, LoggerConfig::default());

        let dispatcher =
            Dispatcher::new(&ctx, RoutingTable::default(), SEND_TIMEOUT, logger).spawn();
        for tick in 1..=3 {
            ctx.dispatch_queue()
                .try_push(Event::new(EventCode::Ambulance, tick))
                .unwrap();
        }

        let metrics = Arc::clone(dispatcher.metrics());
        assert!(eventually(|| metrics.received() == 3).await);

        let ambulance = ctx.department_queue(Department::Ambulance);
        let police = ctx.department_queue(Department::Police);
        assert_eq!(ambulance.len(), 1);
        assert_eq!(police.len(), 1);
        assert_eq!(ambulance.try_pop(), Some(Event::new(EventCode::Ambulance, 1)));
        assert_eq!(police.try_pop(), Some(Event::new(EventCode::Ambulance, 2)));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.redirected, 1);
        assert_eq!(snapshot.lost, 1);

        assert!(eventually(|| capture.count_matching("[ERROR] ") == 1).await);
        assert_eq!(
            capture.count_matching(
                "Failed to send event 2 to Primary Queue [Ambulance] even when busy"
            ),
            1
        );
        assert_eq!(capture.count_matching("Redirecting event 2 from [Ambulance]"), 1);

        dispatcher.abort();
        sink.abort();
    }

    #[tokio::test]
    async fn test_log_producer_wait_is_bounded() {
        let ctx = DispatchContext::new(&QueueCapacities {
            log: 1,
            ..Default::default()
        })
        .unwrap();
        let logger = Logger::new(
            &ctx,
            LoggerConfig {
                send_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );

        assert!(logger.submit(LogRecord::new(LogLevel::Info, "fills", 128)).await);
        for _ in 0..5 {
            let started = tokio::time::Instant::now();
            let accepted = logger
                .submit(LogRecord::new(LogLevel::Error, "overflow", 128))
                .await;
            assert!(!accepted);
            assert!(started.elapsed() < Duration::from_millis(500));
        }
        assert_eq!(logger.dropped_count(), 5);
    }

    /// EventSource -> Dispatcher -> WorkerPools, all logging into one sink
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_pipeline_smoke() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[event_source]
tick_ms = 1
min_delay_ms = 2
max_delay_ms = 4

[service]
min_task_duration_ms = 5
max_task_duration_ms = 15
fallback_task_duration_ms = 10

[queues]
log = 256

[logging]
min_level = "debug"

[random]
seed = 2024
"#
        )
        .unwrap();
        let blueprint = config_loader::ConfigLoader::load_from_path(file.path()).unwrap();

        let ctx = DispatchContext::new(&blueprint.queues).unwrap();
        let capture = MemoryWriter::new();
        let sink = LogSink::new(
            &ctx,
            OutputGuard::new(capture.clone()),
            blueprint.timeouts.output_lock(),
        )
        .spawn();
        let logger = Logger::new(&ctx, LoggerConfig::from(&blueprint));

        let random = RandomFactory::from_seed(blueprint.random.seed);
        let source = EventSource::new(
            &ctx,
            &blueprint.event_source,
            random.source(0),
            logger.clone(),
        )
        .spawn();
        let dispatcher = Dispatcher::new(
            &ctx,
            RoutingTable::from_blueprint(&blueprint).unwrap(),
            blueprint.timeouts.department_send(),
            logger.clone(),
        )
        .spawn();
        let pools: Vec<WorkerPool> = Department::ALL
            .into_iter()
            .map(|department| {
                WorkerPool::spawn(
                    &ctx,
                    department,
                    blueprint.departments.units(department),
                    ServiceTiming::from_blueprint(&blueprint),
                    &random,
                    logger.clone(),
                )
                .unwrap()
            })
            .collect();

        let processed = || pools.iter().map(|p| p.metrics().total_processed()).sum::<u64>();
        assert!(eventually(|| processed() >= 10).await);

        source.abort();
        dispatcher.abort();
        for pool in &pools {
            pool.abort();
        }
        sink.abort();

        let dispatched = dispatcher.metrics().snapshot();
        assert!(dispatched.received >= 10);
        assert_eq!(dispatched.unrouted, 0);
        assert!(source.metrics().generated() >= dispatched.received);

        let records = capture.records();
        assert!(!records.is_empty());
        for record in &records {
            assert!(record.len() <= blueprint.logging.record_max_bytes);
            assert!(record.ends_with("\r\n"));
            assert_eq!(record.matches("\r\n").count(), 1, "interleaved: {record:?}");
            assert!(
                ["[DEBUG] ", "[INFO]  ", "[WARN]  ", "[ERROR] "]
                    .iter()
                    .any(|prefix| record.starts_with(prefix)),
                "bad prefix: {record:?}"
            );
        }
    }
}
