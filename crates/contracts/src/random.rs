//! RandomSource - uniformly distributed integers for event codes, delays and
//! service durations.
//!
//! Sources are fallible; callers resolve a failure to a documented default and
//! never propagate it.

use std::collections::VecDeque;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};

use crate::RandomError;

/// Supplier of uniformly distributed `u32` values
pub trait RandomSource: Send {
    /// Next raw value
    fn next_u32(&mut self) -> Result<u32, RandomError>;

    /// Value in `[min, max]` inclusive, or `None` if the source failed
    fn draw_in_range(&mut self, min: u32, max: u32) -> Option<u32> {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let span = u64::from(high - low) + 1;
        self.next_u32()
            .ok()
            .map(|value| low + (u64::from(value) % span) as u32)
    }
}

/// Operating-system entropy; may fail
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_u32(&mut self) -> Result<u32, RandomError> {
        OsRng
            .try_next_u32()
            .map_err(|e| RandomError(e.to_string()))
    }
}

/// Deterministic generator for reproducible runs
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_u32(&mut self) -> Result<u32, RandomError> {
        Ok(self.rng.next_u32())
    }
}

/// Replays a fixed script; `None` entries and an exhausted script are failures
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: VecDeque<Option<u32>>,
}

impl ScriptedRandom {
    pub fn new(script: impl IntoIterator<Item = Option<u32>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// A source that fails on every call
    pub fn failing() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_u32(&mut self) -> Result<u32, RandomError> {
        self.script
            .pop_front()
            .flatten()
            .ok_or_else(|| RandomError("scripted failure".to_string()))
    }
}

/// Hands out one independent source per consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomFactory {
    /// Operating-system entropy for every stream
    #[default]
    Os,
    /// `StdRng` seeded with `seed + stream`
    Seeded(u64),
}

impl RandomFactory {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(RandomFactory::Os, RandomFactory::Seeded)
    }

    /// Source for the given stream index (one per component or worker)
    pub fn source(&self, stream: u64) -> Box<dyn RandomSource> {
        match *self {
            RandomFactory::Os => Box::new(OsRandom),
            RandomFactory::Seeded(seed) => Box::new(SeededRandom::new(seed.wrapping_add(stream))),
        }
    }
}
