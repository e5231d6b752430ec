//! Output transports for the LogSink

use std::path::Path;
use std::sync::{Arc, Mutex};

use contracts::{ContractError, LogWriter, OutputTarget};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::instrument;

/// Boxed byte stream used when the transport is picked at runtime
pub type BoxedStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Writes records to any async byte stream
pub struct StreamWriter<S> {
    name: String,
    stream: S,
}

impl<S> StreamWriter<S> {
    pub fn new(name: impl Into<String>, stream: S) -> Self {
        Self {
            name: name.into(),
            stream,
        }
    }
}

impl StreamWriter<BoxedStream> {
    /// Open the transport named by the configuration
    ///
    /// # Errors
    /// File targets that cannot be opened for appending.
    #[instrument(name = "log_sink_open_output", skip(target))]
    pub async fn open(target: &OutputTarget) -> Result<Self, ContractError> {
        match target {
            OutputTarget::Stdout => Ok(Self::new("stdout", Box::new(tokio::io::stdout()))),
            OutputTarget::Stderr => Ok(Self::new("stderr", Box::new(tokio::io::stderr()))),
            OutputTarget::File(path) => {
                let file = open_append(path).await?;
                Ok(Self::new(path.display().to_string(), Box::new(file)))
            }
        }
    }
}

async fn open_append(path: &Path) -> Result<tokio::fs::File, ContractError> {
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    Ok(file)
}

impl<S: AsyncWrite + Send + Unpin> LogWriter for StreamWriter<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write_record(&mut self, record: &[u8]) -> Result<(), ContractError> {
        self.stream
            .write_all(record)
            .await
            .map_err(|e| ContractError::output_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.stream
            .flush()
            .await
            .map_err(|e| ContractError::output_write(&self.name, e.to_string()))
    }
}

/// Captures each record as one entry, for tests and in-process inspection
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    records: Arc<Mutex<Vec<String>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far, in write order
    pub fn records(&self) -> Vec<String> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of records that contain `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.records()
            .iter()
            .filter(|record| record.contains(needle))
            .count()
    }
}

impl LogWriter for MemoryWriter {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_record(&mut self, record: &[u8]) -> Result<(), ContractError> {
        let text = String::from_utf8_lossy(record).into_owned();
        let mut records = self
            .records
            .lock()
            .map_err(|_| ContractError::output_write("memory", "capture buffer poisoned"))?;
        records.push(text);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
