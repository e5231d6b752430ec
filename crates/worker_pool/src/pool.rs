//! WorkerPool - one department's units

use std::sync::Arc;

use contracts::{ContractError, Department, DispatchContext, RandomFactory};
use log_sink::Logger;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::metrics::PoolMetrics;
use crate::timing::ServiceTiming;
use crate::worker::Worker;

/// Random streams reserved per department; stream 0 belongs to the EventSource
const STREAMS_PER_DEPARTMENT: u64 = 1_000;

/// Running units of one department
pub struct WorkerPool {
    department: Department,
    names: Vec<String>,
    metrics: Arc<PoolMetrics>,
    tasks: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `units` workers on the department's queue
    ///
    /// Workers are named `<Department>_<n>`, starting at 1.
    ///
    /// # Errors
    /// A pool without units is an initialization failure.
    #[instrument(name = "worker_pool_spawn", skip(ctx, service, random, logger))]
    pub fn spawn(
        ctx: &DispatchContext,
        department: Department,
        units: usize,
        service: ServiceTiming,
        random: &RandomFactory,
        logger: Logger,
    ) -> Result<Self, ContractError> {
        if units == 0 {
            return Err(ContractError::initialization(
                department.name(),
                "worker pool needs at least one unit",
            ));
        }

        let metrics = Arc::new(PoolMetrics::new(department, units));
        let stream_base = (department.index() as u64 + 1) * STREAMS_PER_DEPARTMENT;
        let mut names = Vec::with_capacity(units);
        let mut tasks = Vec::with_capacity(units);

        for unit in 0..units {
            let name = format!("{}_{}", department.name(), unit + 1);
            let worker = Worker {
                name: name.clone(),
                unit,
                queue: ctx.department_queue(department).clone(),
                timing: service,
                random: random.source(stream_base + unit as u64),
                logger: logger.clone(),
                metrics: Arc::clone(&metrics),
            };
            tasks.push(tokio::spawn(worker.run()));
            names.push(name);
        }

        info!(department = %department, units, "Worker pool started");
        Ok(Self {
            department,
            names,
            metrics,
            tasks,
        })
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn units(&self) -> usize {
        self.tasks.len()
    }

    /// Worker names in unit order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }

    /// True once any unit's task has ended
    pub fn any_exited(&self) -> bool {
        self.tasks.iter().any(JoinHandle::is_finished)
    }

    /// Stop every unit; an event being served is abandoned
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
