//! Dispatcher error types

use contracts::EventCode;
use thiserror::Error;

/// Routing table construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatcherError {
    /// Two rules for the same code
    #[error("duplicate routing rule for event code {0}")]
    DuplicateRule(EventCode),

    /// Alternative points back at the primary
    #[error("routing rule for event code {0} uses its primary as alternative")]
    AlternativeIsPrimary(EventCode),
}
