//! # Contracts
//!
//! Frozen interface contracts shared by every component of the dispatch
//! simulation. All business crates depend on this crate; reverse dependencies
//! are prohibited.
//!
//! ## Time Model
//! - `Tick` counts EventSource ticks since startup and stamps every `Event`
//! - Millisecond settings are converted to ticks by integer division

mod blueprint;
mod context;
mod error;
mod event;
mod log;
mod queue;
mod random;
mod sink;

pub use blueprint::*;
pub use context::{DepartmentQueues, DispatchContext};
pub use error::*;
pub use event::*;
pub use log::*;
pub use queue::BoundedQueue;
pub use random::{OsRandom, RandomFactory, RandomSource, ScriptedRandom, SeededRandom};
pub use sink::*;
