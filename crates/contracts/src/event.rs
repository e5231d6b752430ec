//! Event - EventSource output
//!
//! One simulated incident. Immutable after creation; consumed once by the
//! Dispatcher and once by a WorkerPool member.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// EventSource tick counter (ticks since startup)
pub type Tick = u64;

/// Incident type carried by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventCode {
    Police = 1,
    Ambulance = 2,
    FireDept = 3,
}

impl EventCode {
    /// All valid codes, in code order
    pub const ALL: [EventCode; 3] = [EventCode::Police, EventCode::Ambulance, EventCode::FireDept];

    /// Default code used when the random source fails
    pub const FALLBACK: EventCode = EventCode::Police;

    /// Map a uniformly distributed value onto one of the three codes
    pub fn from_random(value: u32) -> Self {
        match value % 3 {
            0 => EventCode::Police,
            1 => EventCode::Ambulance,
            _ => EventCode::FireDept,
        }
    }

    /// Raw wire value (1, 2 or 3)
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Department that naturally owns this kind of incident
    pub fn home_department(self) -> Department {
        match self {
            EventCode::Police => Department::Police,
            EventCode::Ambulance => Department::Ambulance,
            EventCode::FireDept => Department::FireDept,
        }
    }
}

impl TryFrom<u8> for EventCode {
    type Error = ContractError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EventCode::Police),
            2 => Ok(EventCode::Ambulance),
            3 => Ok(EventCode::FireDept),
            other => Err(ContractError::UnknownEventCode(other)),
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Response department: owns one bounded queue and one WorkerPool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Police,
    Ambulance,
    FireDept,
}

impl Department {
    pub const ALL: [Department; 3] = [Department::Police, Department::Ambulance, Department::FireDept];

    /// Display name used in log records and worker names
    pub fn name(self) -> &'static str {
        match self {
            Department::Police => "Police",
            Department::Ambulance => "Ambulance",
            Department::FireDept => "FireDept",
        }
    }

    /// Position in `Department::ALL`
    pub fn index(self) -> usize {
        match self {
            Department::Police => 0,
            Department::Ambulance => 1,
            Department::FireDept => 2,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simulated incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub code: EventCode,
    /// Tick at which the event was generated
    pub timestamp: Tick,
}

impl Event {
    pub fn new(code: EventCode, timestamp: Tick) -> Self {
        Self { code, timestamp }
    }
}
