//! LogWriter trait - LogSink output interface
//!
//! Defines the abstract interface for the transport behind the exclusive
//! output resource.

use crate::ContractError;

/// Output transport trait
///
/// Only the LogSink calls it, and only while holding the output guard.
#[trait_variant::make(LogWriter: Send)]
pub trait LocalLogWriter {
    /// Transport name (used for diagnostics)
    fn name(&self) -> &str;

    /// Write one complete record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write_record(&mut self, record: &[u8]) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;
}
