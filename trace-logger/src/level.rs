//! Severity levels and the buckets they are routed through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TraceLoggerError;

/// Severity requested by the caller of an emission.
///
/// The set is wider than the four buckets a sink understands; see
/// [`Bucket::for_level`] for how the extra levels are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = TraceLoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            "panic" => Ok(LogLevel::Panic),
            other => Err(TraceLoggerError::Config(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}

/// Destination bucket of an emitted record, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Debug,
    Info,
    Warn,
    Error,
}

impl Bucket {
    /// Route a level to its bucket.
    ///
    /// Debug, Info and Warn map to themselves. Everything else lands in
    /// `Error` so that no level is ever dropped for lack of a bucket.
    pub fn for_level(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Bucket::Debug,
            LogLevel::Info => Bucket::Info,
            LogLevel::Warn => Bucket::Warn,
            _ => Bucket::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Debug => "debug",
            Bucket::Info => "info",
            Bucket::Warn => "warn",
            Bucket::Error => "error",
        }
    }

    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            Bucket::Debug => tracing::Level::DEBUG,
            Bucket::Info => tracing::Level::INFO,
            Bucket::Warn => tracing::Level::WARN,
            Bucket::Error => tracing::Level::ERROR,
        }
    }
}

impl From<LogLevel> for Bucket {
    fn from(level: LogLevel) -> Self {
        Bucket::for_level(level)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
