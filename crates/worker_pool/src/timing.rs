//! Service duration draw

use std::time::Duration;

use contracts::{RandomSource, SimulationBlueprint};

/// Service time range in ticks, plus the value used when the random source fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTiming {
    pub tick: Duration,
    pub min_ticks: u32,
    pub max_ticks: u32,
    pub fallback_ticks: u32,
}

impl ServiceTiming {
    pub fn from_blueprint(blueprint: &SimulationBlueprint) -> Self {
        let (min_ticks, max_ticks, fallback_ticks) = blueprint.service_ticks();
        Self {
            tick: blueprint.event_source.tick(),
            min_ticks,
            max_ticks,
            fallback_ticks,
        }
    }

    /// Uniform draw in `[min_ticks, max_ticks]`
    ///
    /// Returns the tick count and whether the fallback was used.
    pub fn draw(&self, random: &mut dyn RandomSource) -> (u32, bool) {
        match random.draw_in_range(self.min_ticks, self.max_ticks) {
            Some(ticks) => (ticks, false),
            None => (self.fallback_ticks, true),
        }
    }

    /// Wall-clock length of `ticks`
    pub fn duration(&self, ticks: u32) -> Duration {
        self.tick.saturating_mul(ticks)
    }
}
