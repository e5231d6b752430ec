//! Dispatcher - single consumer of the dispatch queue

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    BoundedQueue, Department, DepartmentQueues, DispatchContext, Event, EventCode, LogLevel,
};
use log_sink::{emit, Logger};
use tracing::{debug, instrument};

use crate::handle::DispatcherHandle;
use crate::metrics::DispatcherMetrics;
use crate::routing::RoutingTable;

/// Final state of one routed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Accepted by the primary queue
    Delivered(Department),
    /// Primary full, accepted by the alternative
    Redirected { from: Department, to: Department },
    /// Redirect send failed, accepted by the primary afterwards
    FellBack(Department),
    /// Last send attempt (to this department) timed out
    Lost(Department),
    /// No rule for the code
    Unrouted(EventCode),
}

impl DispatchOutcome {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered(_) => "delivered",
            Self::Redirected { .. } => "redirected",
            Self::FellBack(_) => "fell_back",
            Self::Lost(_) => "lost",
            Self::Unrouted(_) => "unrouted",
        }
    }

    /// Department that holds the event now (or last refused it)
    pub fn department(&self) -> Option<Department> {
        match *self {
            Self::Delivered(d) | Self::FellBack(d) | Self::Lost(d) => Some(d),
            Self::Redirected { to, .. } => Some(to),
            Self::Unrouted(_) => None,
        }
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Self::Lost(_) | Self::Unrouted(_))
    }
}

/// Routes events from the dispatch queue into department queues
pub struct Dispatcher {
    incoming: BoundedQueue<Event>,
    departments: DepartmentQueues,
    table: RoutingTable,
    send_timeout: Duration,
    logger: Logger,
    metrics: Arc<DispatcherMetrics>,
}

impl Dispatcher {
    pub fn new(
        ctx: &DispatchContext,
        table: RoutingTable,
        send_timeout: Duration,
        logger: Logger,
    ) -> Self {
        Self {
            incoming: ctx.dispatch_queue().clone(),
            departments: ctx.department_queues().clone(),
            table,
            send_timeout,
            logger,
            metrics: Arc::new(DispatcherMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<DispatcherMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.table
    }

    /// Consume the dispatch queue for the lifetime of the task
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(self) {
        emit!(self.logger, LogLevel::Info, "Dispatcher Task running.");
        debug!(send_timeout = ?self.send_timeout, "Dispatcher started");

        while let Some(event) = self.incoming.pop().await {
            self.dispatch(event).await;
        }

        debug!("Dispatcher stopped");
    }

    pub fn spawn(self) -> DispatcherHandle {
        let metrics = self.metrics();
        let task = tokio::spawn(self.run());
        DispatcherHandle::new(metrics, task)
    }

    /// Route one event
    ///
    /// At most two queues are probed and exactly one fallback send exists.
    /// Every send waits at most `send_timeout`.
    pub async fn dispatch(&self, event: Event) -> DispatchOutcome {
        let outcome = self.route(event).await;

        self.metrics.record(&outcome);
        observability::record_dispatch_outcome(outcome.label(), outcome.department());
        if let Some(department) = outcome.department() {
            let queue = self.departments.get(department);
            observability::record_queue_depth(queue.name(), queue.len());
        }
        outcome
    }

    async fn route(&self, event: Event) -> DispatchOutcome {
        let code = event.code;
        emit!(self.logger, LogLevel::Debug, "Dispatcher received event code {}", code);

        let Some(rule) = self.table.rule(code) else {
            emit!(
                self.logger,
                LogLevel::Warn,
                "Dispatcher received unknown event code {}",
                code
            );
            return DispatchOutcome::Unrouted(code);
        };

        let primary = rule.primary;
        let primary_free = self.departments.get(primary).free_capacity();
        emit!(
            self.logger,
            LogLevel::Debug,
            "Primary Dept [{}] Queue Check: {} spaces available.",
            primary,
            primary_free
        );

        let alternative = match rule.redirect_target() {
            Some(alternative) if primary_free == 0 => alternative,
            _ => {
                emit!(
                    self.logger,
                    LogLevel::Debug,
                    "Dispatching event {} to Primary [{}].",
                    code,
                    primary
                );
                if self.send(primary, event).await {
                    return DispatchOutcome::Delivered(primary);
                }
                emit!(
                    self.logger,
                    LogLevel::Error,
                    "Failed to send event {} to Primary Queue [{}] (Timeout?)",
                    code,
                    primary
                );
                return DispatchOutcome::Lost(primary);
            }
        };

        emit!(
            self.logger,
            LogLevel::Warn,
            "Primary Dept [{}] is full. Checking Alternative [{}]...",
            primary,
            alternative
        );
        let alternative_free = self.departments.get(alternative).free_capacity();
        emit!(
            self.logger,
            LogLevel::Debug,
            "Alternative Dept [{}] Queue Check: {} spaces available.",
            alternative,
            alternative_free
        );

        if alternative_free > 0 {
            emit!(
                self.logger,
                LogLevel::Info,
                "Redirecting event {} from [{}] to Alternative [{}].",
                code,
                primary,
                alternative
            );
            if self.send(alternative, event).await {
                return DispatchOutcome::Redirected {
                    from: primary,
                    to: alternative,
                };
            }
            emit!(
                self.logger,
                LogLevel::Error,
                "Failed to send event {} to Alternative Queue [{}] (Timeout?)",
                code,
                alternative
            );
            emit!(
                self.logger,
                LogLevel::Warn,
                "Redirect failed, sending event {} back to Primary Queue [{}] to wait.",
                code,
                primary
            );
            if self.send(primary, event).await {
                return DispatchOutcome::FellBack(primary);
            }
            emit!(
                self.logger,
                LogLevel::Error,
                "Fallback send to Primary Queue [{}] also failed! Event {} lost.",
                primary,
                code
            );
            return DispatchOutcome::Lost(primary);
        }

        emit!(
            self.logger,
            LogLevel::Warn,
            "Alternative Dept [{}] is full. Sending event {} to Primary Queue [{}] to wait.",
            alternative,
            code,
            primary
        );
        if self.send(primary, event).await {
            return DispatchOutcome::Delivered(primary);
        }
        emit!(
            self.logger,
            LogLevel::Error,
            "Failed to send event {} to Primary Queue [{}] even when busy (Timeout?) Event lost.",
            code,
            primary
        );
        DispatchOutcome::Lost(primary)
    }

    /// Bounded-wait send; `false` when the queue stayed full
    async fn send(&self, department: Department, event: Event) -> bool {
        self.departments
            .get(department)
            .push_timeout(event, self.send_timeout)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RoutingRule;
    use contracts::{LogRecord, QueueCapacities};
    use log_sink::LoggerConfig;

    const SEND_TIMEOUT: Duration = Duration::from_millis(10);

    fn context(police: usize, ambulance: usize, fire_dept: usize) -> DispatchContext {
        DispatchContext::new(&QueueCapacities {
            police,
            ambulance,
            fire_dept,
            log: 256,
            ..Default::default()
        })
        .unwrap()
    }

    fn dispatcher(ctx: &DispatchContext, table: RoutingTable) -> Dispatcher {
        let logger = Logger::new(
            ctx,
            LoggerConfig {
                min_level: LogLevel::Debug,
                ..Default::default()
            },
        );
        Dispatcher::new(ctx, table, SEND_TIMEOUT, logger)
    }

    fn drain_logs(ctx: &DispatchContext) -> Vec<LogRecord> {
        std::iter::from_fn(|| ctx.log_queue().try_pop()).collect()
    }

    fn count_level(records: &[LogRecord], level: LogLevel) -> usize {
        records.iter().filter(|r| r.level() == level).count()
    }

    fn fill(ctx: &DispatchContext, department: Department) {
        let queue = ctx.department_queue(department);
        while queue.try_push(Event::new(EventCode::Police, 0)).is_ok() {}
    }

    #[tokio::test]
    async fn test_each_code_follows_its_rule() {
        let ctx = context(10, 10, 10);
        let dispatcher = dispatcher(&ctx, RoutingTable::default());

        for code in EventCode::ALL {
            let outcome = dispatcher.dispatch(Event::new(code, 1)).await;
            let expected = dispatcher.routing_table().rule(code).unwrap().primary;
            assert_eq!(outcome, DispatchOutcome::Delivered(expected));
            assert_eq!(ctx.department_queue(expected).try_pop(), Some(Event::new(code, 1)));
        }
    }

    #[tokio::test]
    async fn test_primary_with_space_ignores_alternative() {
        let ctx = context(1, 2, 1);
        let dispatcher = dispatcher(&ctx, RoutingTable::default());

        // alternative full, primary has room
        fill(&ctx, Department::Police);
        let outcome = dispatcher.dispatch(Event::new(EventCode::Ambulance, 1)).await;
        assert_eq!(outcome, DispatchOutcome::Delivered(Department::Ambulance));

        // alternative empty, primary has room
        let _ = ctx.department_queue(Department::Police).try_pop();
        let outcome = dispatcher.dispatch(Event::new(EventCode::Ambulance, 2)).await;
        assert_eq!(outcome, DispatchOutcome::Delivered(Department::Ambulance));
        assert!(ctx.department_queue(Department::Police).is_empty());
    }

    #[tokio::test]
    async fn test_full_primary_without_alternative_is_lost() {
        let ctx = context(1, 1, 1);
        let dispatcher = dispatcher(&ctx, RoutingTable::default());
        fill(&ctx, Department::Police);

        let outcome = dispatcher.dispatch(Event::new(EventCode::Police, 7)).await;
        assert_eq!(outcome, DispatchOutcome::Lost(Department::Police));
        assert!(ctx.department_queue(Department::Ambulance).is_empty());
        assert!(ctx.department_queue(Department::FireDept).is_empty());

        let logs = drain_logs(&ctx);
        assert_eq!(count_level(&logs, LogLevel::Error), 1);
        assert!(logs
            .iter()
            .any(|r| r.as_str().contains("Failed to send event 1 to Primary Queue [Police] (Timeout?)")));
    }

    #[tokio::test]
    async fn test_redirect_disallowed_stays_on_primary() {
        let ctx = context(1, 1, 1);
        let table = RoutingTable::from_rules([(
            EventCode::FireDept,
            RoutingRule {
                redirect_allowed: false,
                ..RoutingRule::with_redirect(Department::FireDept, Department::Police)
            },
        )])
        .unwrap();
        let dispatcher = dispatcher(&ctx, table);
        fill(&ctx, Department::FireDept);

        let outcome = dispatcher.dispatch(Event::new(EventCode::FireDept, 1)).await;
        assert_eq!(outcome, DispatchOutcome::Lost(Department::FireDept));
        assert!(ctx.department_queue(Department::Police).is_empty());
    }

    #[tokio::test]
    async fn test_full_primary_redirects_to_alternative() {
        let ctx = context(1, 1, 1);
        let dispatcher = dispatcher(&ctx, RoutingTable::default());
        fill(&ctx, Department::Ambulance);

        let outcome = dispatcher.dispatch(Event::new(EventCode::Ambulance, 3)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Redirected {
                from: Department::Ambulance,
                to: Department::Police,
            }
        );
        assert_eq!(
            ctx.department_queue(Department::Police).try_pop(),
            Some(Event::new(EventCode::Ambulance, 3))
        );

        let logs = drain_logs(&ctx);
        assert_eq!(count_level(&logs, LogLevel::Error), 0);
        assert!(logs
            .iter()
            .any(|r| r.as_str() == "[INFO]  Redirecting event 2 from [Ambulance] to Alternative [Police].\r\n"));
    }

    #[tokio::test]
    async fn test_both_full_tries_primary_once_then_loses() {
        let ctx = context(1, 1, 1);
        let dispatcher = dispatcher(&ctx, RoutingTable::default());
        fill(&ctx, Department::Ambulance);
        fill(&ctx, Department::Police);

        let started = tokio::time::Instant::now();
        let outcome = dispatcher.dispatch(Event::new(EventCode::Ambulance, 4)).await;
        assert_eq!(outcome, DispatchOutcome::Lost(Department::Ambulance));
        assert!(started.elapsed() < Duration::from_secs(1));

        let logs = drain_logs(&ctx);
        let errors: Vec<_> = logs.iter().filter(|r| r.level() == LogLevel::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().contains("even when busy"));
        assert_eq!(dispatcher.metrics().lost(), 1);
    }

    #[tokio::test]
    async fn test_both_full_waits_for_primary_space() {
        let ctx = context(1, 1, 1);
        let table = RoutingTable::default();
        let logger = Logger::new(&ctx, LoggerConfig::default());
        let dispatcher = Dispatcher::new(&ctx, table, Duration::from_millis(500), logger);
        fill(&ctx, Department::Ambulance);
        fill(&ctx, Department::Police);

        let ambulance = ctx.department_queue(Department::Ambulance).clone();
        let consumer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            ambulance.try_pop()
        });

        let outcome = dispatcher.dispatch(Event::new(EventCode::Ambulance, 5)).await;
        assert_eq!(outcome, DispatchOutcome::Delivered(Department::Ambulance));
        assert!(consumer.await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unmapped_code_is_discarded() {
        let ctx = context(10, 10, 10);
        let table = RoutingTable::from_rules([(
            EventCode::Police,
            RoutingRule::primary_only(Department::Police),
        )])
        .unwrap();
        let dispatcher = dispatcher(&ctx, table);

        let outcome = dispatcher.dispatch(Event::new(EventCode::FireDept, 1)).await;
        assert_eq!(outcome, DispatchOutcome::Unrouted(EventCode::FireDept));
        for department in Department::ALL {
            assert!(ctx.department_queue(department).is_empty());
        }

        // later events are unaffected
        let outcome = dispatcher.dispatch(Event::new(EventCode::Police, 2)).await;
        assert_eq!(outcome, DispatchOutcome::Delivered(Department::Police));

        let logs = drain_logs(&ctx);
        assert_eq!(count_level(&logs, LogLevel::Warn), 1);
        assert_eq!(dispatcher.metrics().unrouted(), 1);
    }

    #[tokio::test]
    async fn test_spawned_dispatcher_consumes_queue() {
        let ctx = context(10, 10, 10);
        let handle = dispatcher(&ctx, RoutingTable::default()).spawn();

        for (tick, code) in EventCode::ALL.into_iter().enumerate() {
            ctx.dispatch_queue()
                .try_push(Event::new(code, tick as u64))
                .unwrap();
        }

        for department in Department::ALL {
            let event = tokio::time::timeout(
                Duration::from_secs(1),
                ctx.department_queue(department).pop(),
            )
            .await
            .unwrap()
            .unwrap();
            assert_eq!(event.code.home_department(), department);
        }
        for _ in 0..100 {
            if handle.metrics().delivered() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(handle.metrics().delivered(), 3);
        handle.abort();
    }
}
