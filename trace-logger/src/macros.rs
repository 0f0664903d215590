//! printf-style front ends for [`TraceLogger`](crate::TraceLogger).
//!
//! Each macro takes the logger, a sender and a format string with its
//! arguments. Attributes go in an `attrs = <slice>` argument placed before
//! the format string.

/// Log at an explicit [`LogLevel`](crate::LogLevel)
///
/// # Example
///
/// ```
/// # use opentelemetry::Context;
/// # use trace_logger::{LogLevel, MemorySink, OperationSpan, TraceLogger, log_at};
/// # let span = OperationSpan::start_global(&Context::new(), "docs", "op");
/// # let logger = TraceLogger::with_sink(span, MemorySink::new());
/// log_at!(logger, LogLevel::Fatal, "supervisor", "worker {} exited", 3);
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $sender:expr, attrs = $attrs:expr, $($arg:tt)+) => {
        $logger.log($level, $sender, $attrs, format_args!($($arg)+))
    };
    ($logger:expr, $level:expr, $sender:expr, $($arg:tt)+) => {
        $logger.log($level, $sender, &[], format_args!($($arg)+))
    };
}

/// Log at debug level
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $sender:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::LogLevel::Debug, $sender, $($rest)+)
    };
}

/// Log at info level
///
/// # Example
///
/// ```
/// # use opentelemetry::{Context, KeyValue};
/// # use trace_logger::{MemorySink, OperationSpan, TraceLogger, log_info};
/// # let span = OperationSpan::start_global(&Context::new(), "docs", "op");
/// # let logger = TraceLogger::with_sink(span, MemorySink::new());
/// log_info!(logger, "worker", "started job {}", 42);
/// log_info!(logger, "worker", attrs = &[KeyValue::new("job.id", 42_i64)], "done");
/// ```
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $sender:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::LogLevel::Info, $sender, $($rest)+)
    };
}

/// Log at warn level
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $sender:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::LogLevel::Warn, $sender, $($rest)+)
    };
}

/// Log at error level
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $sender:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::LogLevel::Error, $sender, $($rest)+)
    };
}
