//! trace-logger: trace-correlated structured logging.
//!
//! An [`OperationSpan`] opens (or continues) a trace for one logical
//! operation; a [`TraceLogger`] emits Debug/Info/Warn/Error records stamped
//! with that span's trace and span IDs into an injected [`LogSink`].
//! [`observability::init_logging`] wires the process-wide `tracing`
//! subscriber and OpenTelemetry tracer provider from a [`LoggerConfig`].
pub mod config;
pub mod error;
pub mod level;
pub mod logger;
mod macros;
pub mod observability;
pub mod record;
pub mod sink;
pub mod span;

pub use config::{FileConfig, LogFormat, LoggerConfig, Rotation};
pub use error::{Result, TraceLoggerError};
pub use level::{Bucket, LogLevel};
pub use logger::TraceLogger;
pub use record::LogRecord;
pub use sink::{JsonLineSink, LogSink, MemorySink, TracingSink};
pub use span::OperationSpan;

pub use opentelemetry;
pub use tracing;
