//! # Worker Pool
//!
//! Fixed set of response units per department.
//!
//! Every unit of a department competes for events on the one shared
//! department queue, holds an event for a random service time, then goes
//! back to waiting. Nothing is reported back to the dispatcher.

mod metrics;
mod pool;
mod timing;
mod worker;

pub use metrics::{PoolMetrics, PoolSnapshot, WorkerState};
pub use pool::WorkerPool;
pub use timing::ServiceTiming;
