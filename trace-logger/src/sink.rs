//! Destinations for trace-correlated records.
//!
//! A [`LogSink`] is injected into every [`TraceLogger`](crate::TraceLogger)
//! instead of being reached through a process-wide handle, which keeps the
//! emitter testable with [`MemorySink`].

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::level::Bucket;
use crate::record::LogRecord;

/// Receives one call per emitted record.
///
/// Implementations must not fail the caller: write errors, closed
/// channels and the like are swallowed.
pub trait LogSink: Send + Sync {
    fn submit(&self, record: &LogRecord);
}

// `attributes` is an `Option`, so the field is left out when it is `None`.
macro_rules! tracing_event {
    ($level:expr, $record:ident, $attributes:ident) => {
        tracing::event!(
            target: "trace_logger",
            $level,
            sender = %$record.sender,
            timestamp = %$record.timestamp.to_rfc3339(),
            trace_id = %$record.trace_id,
            span_id = %$record.span_id,
            attributes = $attributes.as_deref().map(tracing::field::display),
            "{}",
            $record.message
        )
    };
}

/// Forwards records to the `tracing` dispatcher, one event per record.
///
/// Level filtering, formatting and output are whatever the installed
/// subscriber does; see [`init_logging`](crate::observability::init_logging).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn submit(&self, record: &LogRecord) {
        let attributes = record.attributes_json();
        match record.bucket {
            Bucket::Debug => tracing_event!(tracing::Level::DEBUG, record, attributes),
            Bucket::Info => tracing_event!(tracing::Level::INFO, record, attributes),
            Bucket::Warn => tracing_event!(tracing::Level::WARN, record, attributes),
            Bucket::Error => tracing_event!(tracing::Level::ERROR, record, attributes),
        }
    }
}

/// Writes each record as a single JSON object followed by a newline.
pub struct JsonLineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer, e.g. to inspect a buffer in tests.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl JsonLineSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> LogSink for JsonLineSink<W> {
    fn submit(&self, record: &LogRecord) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *writer, record).is_ok() {
            writer.write_all(b"\n").ok();
        }
    }
}

/// In-memory capture of submitted records.
///
/// Clones share the same buffer, so a test keeps one clone and hands the
/// other to the logger.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<LogRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|r| r.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of captured records that landed in `bucket`.
    pub fn count(&self, bucket: Bucket) -> usize {
        self.records
            .lock()
            .map(|r| r.iter().filter(|rec| rec.bucket == bucket).count())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.records.lock().map(|mut r| r.clear()).ok();
    }
}

impl LogSink for MemorySink {
    fn submit(&self, record: &LogRecord) {
        self.records
            .lock()
            .map(|mut r| r.push(record.clone()))
            .ok();
    }
}
