//! DispatcherHandle - owns the spawned dispatcher task

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::metrics::DispatcherMetrics;

/// Handle to a running dispatcher
pub struct DispatcherHandle {
    metrics: Arc<DispatcherMetrics>,
    task: JoinHandle<()>,
}

impl DispatcherHandle {
    pub(crate) fn new(metrics: Arc<DispatcherMetrics>, task: JoinHandle<()>) -> Self {
        Self { metrics, task }
    }

    pub fn metrics(&self) -> &Arc<DispatcherMetrics> {
        &self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the dispatcher; events still in the dispatch queue stay there
    pub fn abort(&self) {
        self.task.abort();
    }
}
