//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// A startup stage failed; the process halts
    #[error("Startup failed at {stage}: {message}")]
    Startup { stage: &'static str, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn startup(stage: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Startup {
            stage,
            message: cause.to_string(),
        }
    }
}
