//! Layered error definitions
//!
//! Categorized by source: init / config / queue / routing / random / output

use std::time::Duration;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Initialization Errors =====
    /// A queue, pool, guard or task could not be created. Always fatal.
    #[error("initialization failure in {component}: {message}")]
    Initialization { component: String, message: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Routing Errors =====
    /// Raw event code outside the known set
    #[error("unknown event code: {0}")]
    UnknownEventCode(u8),

    // ===== Output Errors =====
    /// Writing to the output resource failed
    #[error("output '{target}' write error: {message}")]
    OutputWrite { target: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create initialization error
    pub fn initialization(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Initialization {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create output write error
    pub fn output_write(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutputWrite {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Failure of a queue operation. The item is gone in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Non-blocking push found no free slot
    #[error("queue '{queue}' is full")]
    Full { queue: String },

    /// Bounded-wait push did not find a free slot in time
    #[error("queue '{queue}' send timed out after {waited:?}")]
    Timeout { queue: String, waited: Duration },

    /// Every receiver is gone
    #[error("queue '{queue}' is closed")]
    Closed { queue: String },
}

/// Failure of the randomness source. Never propagated past the caller,
/// which always substitutes a documented default.
#[derive(Debug, Error)]
#[error("random source failure: {0}")]
pub struct RandomError(pub String);
