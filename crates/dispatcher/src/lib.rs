//! # Dispatcher
//!
//! Routing stage between the EventSource and the department pools.
//!
//! Responsibilities:
//! - Consume events from the dispatch queue
//! - Apply the static routing table (primary, optional alternative)
//! - Redirect at most one level when the primary is full
//! - Never block indefinitely on a department queue

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod routing;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::DispatcherError;
pub use handle::DispatcherHandle;
pub use metrics::{DispatcherMetrics, MetricsSnapshot};
pub use routing::{RoutingRule, RoutingTable};
