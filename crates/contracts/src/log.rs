//! LogRecord - unit of work for the LogSink
//!
//! A fixed-size, level-tagged, line-terminated text record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Line terminator appended to every record
pub const LINE_ENDING: &str = "\r\n";

/// Default maximum record size in bytes (terminator included)
pub const DEFAULT_RECORD_MAX_BYTES: usize = 128;

/// Record severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Fixed-width prefix written in front of every record
    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Debug => "[DEBUG] ",
            LogLevel::Info => "[INFO]  ",
            LogLevel::Warn => "[WARN]  ",
            LogLevel::Error => "[ERROR] ",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ContractError::config_parse(format!(
                "unknown log level '{other}'"
            ))),
        }
    }
}

/// One formatted log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    level: LogLevel,
    text: String,
}

impl LogRecord {
    /// Build a record of at most `max_bytes` bytes
    ///
    /// Long messages are cut on a character boundary; the terminator is
    /// always present.
    pub fn new(level: LogLevel, message: &str, max_bytes: usize) -> Self {
        let prefix = level.prefix();
        let message = message.trim_end_matches(['\r', '\n']);
        let budget = max_bytes.saturating_sub(prefix.len() + LINE_ENDING.len());

        let mut cut = message.len().min(budget);
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }

        let mut text = String::with_capacity(prefix.len() + cut + LINE_ENDING.len());
        text.push_str(prefix);
        text.push_str(&message[..cut]);
        text.push_str(LINE_ENDING);

        Self { level, text }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Full line including prefix and terminator
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
