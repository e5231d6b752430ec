//! SimulationBlueprint - Config Loader output
//!
//! Describes the complete, startup-fixed configuration: event timing, service
//! timing, pool sizes, queue capacities, bounded-wait timeouts, logging and
//! routing rules. Every field defaults to the reference deployment's constants.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Department, EventCode, LogLevel, DEFAULT_RECORD_MAX_BYTES};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SimulationBlueprint {
    /// Config version
    pub version: ConfigVersion,

    /// Event generation timing
    #[validate(nested)]
    pub event_source: EventSourceConfig,

    /// Simulated service duration
    #[validate(nested)]
    pub service: ServiceConfig,

    /// Worker pool sizes
    #[validate(nested)]
    pub departments: DepartmentsConfig,

    /// Queue capacities
    #[validate(nested)]
    pub queues: QueueCapacities,

    /// Bounded-wait timeouts
    #[validate(nested)]
    pub timeouts: TimeoutConfig,

    /// Log record formatting and output
    #[validate(nested)]
    pub logging: LoggingConfig,

    /// Randomness source selection
    pub random: RandomConfig,

    /// Routing rules, one per event code
    #[serde(default = "default_routing")]
    pub routing: Vec<RouteConfig>,
}

impl Default for SimulationBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            event_source: EventSourceConfig::default(),
            service: ServiceConfig::default(),
            departments: DepartmentsConfig::default(),
            queues: QueueCapacities::default(),
            timeouts: TimeoutConfig::default(),
            logging: LoggingConfig::default(),
            random: RandomConfig::default(),
            routing: default_routing(),
        }
    }
}

impl SimulationBlueprint {
    /// Convert a millisecond setting into EventSource ticks
    pub fn ms_to_ticks(&self, ms: u64) -> u32 {
        ms_to_ticks(ms, self.event_source.tick_ms)
    }

    /// Service duration range and fallback, in ticks
    pub fn service_ticks(&self) -> (u32, u32, u32) {
        (
            self.ms_to_ticks(self.service.min_task_duration_ms),
            self.ms_to_ticks(self.service.max_task_duration_ms),
            self.ms_to_ticks(self.service.fallback_task_duration_ms),
        )
    }
}

/// Integer division of `ms` by the tick period, saturating at `u32::MAX`
pub fn ms_to_ticks(ms: u64, tick_ms: u64) -> u32 {
    let ticks = ms / tick_ms.max(1);
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

/// Event generation timing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EventSourceConfig {
    /// Tick period in milliseconds
    #[validate(range(min = 1))]
    pub tick_ms: u64,

    /// Minimum inter-arrival delay in milliseconds
    #[validate(range(min = 1))]
    pub min_delay_ms: u64,

    /// Maximum inter-arrival delay in milliseconds
    #[validate(range(min = 1))]
    pub max_delay_ms: u64,
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            min_delay_ms: 1000,
            max_delay_ms: 5000,
        }
    }
}

impl EventSourceConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn min_delay_ticks(&self) -> u32 {
        ms_to_ticks(self.min_delay_ms, self.tick_ms)
    }

    pub fn max_delay_ticks(&self) -> u32 {
        ms_to_ticks(self.max_delay_ms, self.tick_ms)
    }
}

/// Simulated service duration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServiceConfig {
    pub min_task_duration_ms: u64,
    pub max_task_duration_ms: u64,
    /// Used when the random source fails; must lie within the range
    pub fallback_task_duration_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_task_duration_ms: 200,
            max_task_duration_ms: 1500,
            fallback_task_duration_ms: 500,
        }
    }
}

/// Per-department pool size
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DepartmentConfig {
    /// Number of response units (workers)
    #[validate(range(min = 1))]
    pub units: usize,
}

/// Pool sizes for all departments
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DepartmentsConfig {
    #[validate(nested)]
    pub police: DepartmentConfig,
    #[validate(nested)]
    pub ambulance: DepartmentConfig,
    #[validate(nested)]
    pub fire_dept: DepartmentConfig,
}

impl Default for DepartmentsConfig {
    fn default() -> Self {
        Self {
            police: DepartmentConfig { units: 3 },
            ambulance: DepartmentConfig { units: 4 },
            fire_dept: DepartmentConfig { units: 2 },
        }
    }
}

impl DepartmentsConfig {
    pub fn units(&self, department: Department) -> usize {
        match department {
            Department::Police => self.police.units,
            Department::Ambulance => self.ambulance.units,
            Department::FireDept => self.fire_dept.units,
        }
    }
}

/// Queue capacities
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QueueCapacities {
    /// EventSource -> Dispatcher
    #[validate(range(min = 1))]
    pub dispatch: usize,
    #[validate(range(min = 1))]
    pub police: usize,
    #[validate(range(min = 1))]
    pub ambulance: usize,
    #[validate(range(min = 1))]
    pub fire_dept: usize,
    /// Producers -> LogSink
    #[validate(range(min = 1))]
    pub log: usize,
}

impl Default for QueueCapacities {
    fn default() -> Self {
        Self {
            dispatch: 20,
            police: 10,
            ambulance: 10,
            fire_dept: 10,
            log: 50,
        }
    }
}

impl QueueCapacities {
    pub fn department(&self, department: Department) -> usize {
        match department {
            Department::Police => self.police,
            Department::Ambulance => self.ambulance,
            Department::FireDept => self.fire_dept,
        }
    }
}

/// Bounded-wait timeouts in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Dispatcher -> department queue send
    #[validate(range(min = 1))]
    pub department_send_ms: u64,
    /// Producer -> log queue send
    #[validate(range(min = 1))]
    pub log_send_ms: u64,
    /// LogSink output resource acquisition
    #[validate(range(min = 1))]
    pub output_lock_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            department_send_ms: 10,
            log_send_ms: 10,
            output_lock_ms: 100,
        }
    }
}

impl TimeoutConfig {
    pub fn department_send(&self) -> Duration {
        Duration::from_millis(self.department_send_ms)
    }

    pub fn log_send(&self) -> Duration {
        Duration::from_millis(self.log_send_ms)
    }

    pub fn output_lock(&self) -> Duration {
        Duration::from_millis(self.output_lock_ms)
    }
}

/// Log record formatting and output
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Records below this level are never formatted
    pub min_level: LogLevel,

    /// Maximum record size, terminator included
    #[validate(range(min = 16))]
    pub record_max_bytes: usize,

    /// Where the exclusive output resource writes
    pub output: OutputTarget,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            record_max_bytes: DEFAULT_RECORD_MAX_BYTES,
            output: OutputTarget::Stdout,
        }
    }
}

/// Output transport behind the LogSink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    /// Append to a file
    File(PathBuf),
}

/// Randomness source selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Seed for reproducible runs; OS entropy when absent
    pub seed: Option<u64>,
}

/// Routing rule for one event code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub code: EventCode,
    pub primary: Department,
    #[serde(default)]
    pub alternative: Option<Department>,
    #[serde(default)]
    pub redirect_allowed: bool,
}

/// Police and FireDept stay home; Ambulance may redirect to Police
pub fn default_routing() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            code: EventCode::Police,
            primary: Department::Police,
            alternative: None,
            redirect_allowed: false,
        },
        RouteConfig {
            code: EventCode::Ambulance,
            primary: Department::Ambulance,
            alternative: Some(Department::Police),
            redirect_allowed: true,
        },
        RouteConfig {
            code: EventCode::FireDept,
            primary: Department::FireDept,
            alternative: None,
            redirect_allowed: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let bp = SimulationBlueprint::default();
        assert_eq!(bp.event_source.min_delay_ticks(), 100);
        assert_eq!(bp.event_source.max_delay_ticks(), 500);
        assert_eq!(bp.service_ticks(), (20, 150, 50));
        assert_eq!(bp.departments.units(Department::Ambulance), 4);
        assert_eq!(bp.queues.department(Department::FireDept), 10);
        assert_eq!(bp.timeouts.output_lock(), Duration::from_millis(100));
        assert_eq!(bp.routing.len(), 3);
    }

    #[test]
    fn test_default_routing_covers_every_code() {
        let bp = SimulationBlueprint::default();
        assert_eq!(bp.routing, default_routing());
        for code in EventCode::ALL {
            let rules = bp.routing.iter().filter(|r| r.code == code).count();
            assert_eq!(rules, 1, "code {code:?}");
        }
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let bp: SimulationBlueprint = serde_json::from_str("{}").unwrap();
        assert_eq!(bp.queues.log, 50);
        assert_eq!(bp.logging.min_level, LogLevel::Info);
        assert_eq!(bp.routing, default_routing());
        assert!(bp.validate().is_ok());
    }

    #[test]
    fn test_output_target_serde() {
        let file: OutputTarget = serde_json::from_str(r#"{"file":"/tmp/out.log"}"#).unwrap();
        assert_eq!(file, OutputTarget::File(PathBuf::from("/tmp/out.log")));
        let stdout: OutputTarget = serde_json::from_str(r#""stdout""#).unwrap();
        assert_eq!(stdout, OutputTarget::Stdout);
    }

    #[test]
    fn test_range_validation_rejects_zero_capacity() {
        let mut bp = SimulationBlueprint::default();
        bp.queues.police = 0;
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_ms_to_ticks_saturates() {
        assert_eq!(ms_to_ticks(25, 10), 2);
        assert_eq!(ms_to_ticks(u64::MAX, 1), u32::MAX);
        assert_eq!(ms_to_ticks(5, 0), 5);
    }
}
