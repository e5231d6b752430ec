//! # Event Source
//!
//! Periodic generator of random emergency events.
//!
//! One background task owns all generator state. On every tick it checks
//! whether the inter-arrival threshold has elapsed and, if so, pushes a new
//! event into the dispatch queue without waiting. A full queue drops the
//! event.

mod metrics;
mod source;

pub use metrics::{SourceMetrics, SourceSnapshot};
pub use source::{EventSource, EventSourceHandle, TickOutcome};
