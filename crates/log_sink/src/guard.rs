//! OutputGuard - the exclusive output resource
//!
//! Created during startup next to the queues, then moved into the LogSink.
//! Nothing else can reach the writer afterwards.

use std::time::Duration;

use contracts::LogWriter;
use tokio::sync::{Mutex, MutexGuard};

/// Mutual-exclusion wrapper around the output transport
#[derive(Debug)]
pub struct OutputGuard<W> {
    name: String,
    pub(crate) writer: Mutex<W>,
}

impl<W: LogWriter> OutputGuard<W> {
    pub fn new(writer: W) -> Self {
        Self {
            name: writer.name().to_string(),
            writer: Mutex::new(writer),
        }
    }

    /// Transport name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquire the writer, waiting at most `wait`
    pub(crate) async fn acquire(&self, wait: Duration) -> Option<MutexGuard<'_, W>> {
        tokio::time::timeout(wait, self.writer.lock()).await.ok()
    }
}
