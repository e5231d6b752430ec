//! # LogSink
//!
//! The system's single serialized text-logging path.
//!
//! - `Logger`: cloneable producer handle, bounded-wait enqueue, drop on failure
//! - `emit!`: the single logging call, threshold checked at the call site
//! - `LogSink`: single consumer, writes each record while holding the
//!   exclusive `OutputGuard`
//!
//! ## Usage Example
//!
//! ```ignore
//! use log_sink::{emit, LogSink, Logger, LoggerConfig, OutputGuard, StreamWriter};
//!
//! let guard = OutputGuard::new(StreamWriter::open(&target).await?);
//! let handle = LogSink::new(&ctx, guard, lock_timeout).spawn();
//! let logger = Logger::new(&ctx, LoggerConfig::from(&blueprint));
//! emit!(logger, LogLevel::Info, "Dispatcher Task running.");
//! ```

mod guard;
mod logger;
mod metrics;
mod sink;
mod writers;

pub use contracts::{LogLevel, LogRecord, LogWriter};
pub use guard::OutputGuard;
pub use logger::{Logger, LoggerConfig};
pub use metrics::{LogSinkMetrics, LogSinkSnapshot};
pub use sink::{LogSink, LogSinkHandle, WriteOutcome};
pub use writers::{BoxedStream, MemoryWriter, StreamWriter};
