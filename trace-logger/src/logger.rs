//! Trace-correlated log emission.
//!
//! A [`TraceLogger`] wraps one [`OperationSpan`] and stamps every record it
//! emits with that span's trace and span IDs, the caller-supplied `sender`
//! and any extra attributes before handing it to its [`LogSink`].
//!
//! # Example
//!
//! ```rust,no_run
//! use opentelemetry::{Context, KeyValue};
//! use trace_logger::{TraceLogger, log_info, log_warn};
//!
//! let logger = TraceLogger::new(&Context::current(), "billing/invoices", "generate");
//! log_info!(logger, "worker", "started job {}", 42);
//! log_warn!(
//!     logger,
//!     "worker",
//!     attrs = &[KeyValue::new("invoice.id", "inv-7")],
//!     "retrying after {} ms",
//!     250
//! );
//! logger.close();
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::Utc;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{SpanId, TraceId};
use opentelemetry::{Context, KeyValue};

use crate::level::{Bucket, LogLevel};
use crate::record::LogRecord;
use crate::sink::{LogSink, TracingSink};
use crate::span::OperationSpan;

pub struct TraceLogger<T = BoxedTracer> {
    span: OperationSpan<T>,
    sink: Arc<dyn LogSink>,
    min_bucket: Option<Bucket>,
}

impl TraceLogger<BoxedTracer> {
    /// Open a span with the global tracer and log through `tracing`.
    ///
    /// Requires [`init_logging`](crate::observability::init_logging) (or any
    /// other installed SDK tracer provider) to mint fresh trace IDs. Without
    /// one the global tracer is a no-op: a valid trace in `parent` is still
    /// carried over, but a parentless logger reports the all-zero
    /// [`TraceId::INVALID`].
    pub fn new(parent: &Context, component: &str, span_name: impl Into<String>) -> Self {
        Self::with_sink(
            OperationSpan::start_global(parent, component, span_name),
            TracingSink,
        )
    }
}

impl<T> TraceLogger<T> {
    pub fn with_sink(span: OperationSpan<T>, sink: impl LogSink + 'static) -> Self {
        Self::with_shared_sink(span, Arc::new(sink))
    }

    pub fn with_shared_sink(span: OperationSpan<T>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            span,
            sink,
            min_bucket: None,
        }
    }

    /// Drop records whose bucket is below `min`.
    pub fn with_min_bucket(mut self, min: Bucket) -> Self {
        self.min_bucket = Some(min);
        self
    }

    pub fn span(&self) -> &OperationSpan<T> {
        &self.span
    }

    pub fn trace_id(&self) -> TraceId {
        self.span.trace_id()
    }

    pub fn span_id(&self) -> SpanId {
        self.span.span_id()
    }

    pub fn debug(&self, sender: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, sender, &[], args)
    }

    pub fn debug_with_attributes(
        &self,
        sender: &str,
        attributes: &[KeyValue],
        args: fmt::Arguments<'_>,
    ) {
        self.log(LogLevel::Debug, sender, attributes, args)
    }

    pub fn info(&self, sender: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, sender, &[], args)
    }

    pub fn info_with_attributes(
        &self,
        sender: &str,
        attributes: &[KeyValue],
        args: fmt::Arguments<'_>,
    ) {
        self.log(LogLevel::Info, sender, attributes, args)
    }

    pub fn warn(&self, sender: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, sender, &[], args)
    }

    pub fn warn_with_attributes(
        &self,
        sender: &str,
        attributes: &[KeyValue],
        args: fmt::Arguments<'_>,
    ) {
        self.log(LogLevel::Warn, sender, attributes, args)
    }

    pub fn error(&self, sender: &str, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, sender, &[], args)
    }

    pub fn error_with_attributes(
        &self,
        sender: &str,
        attributes: &[KeyValue],
        args: fmt::Arguments<'_>,
    ) {
        self.log(LogLevel::Error, sender, attributes, args)
    }

    /// Emit one record at `level`.
    ///
    /// The message is rendered here, at emission time. Records emitted
    /// after [`close`](Self::close) still carry this logger's trace ID.
    pub fn log(
        &self,
        level: LogLevel,
        sender: &str,
        attributes: &[KeyValue],
        args: fmt::Arguments<'_>,
    ) {
        let bucket = Bucket::for_level(level);
        if self.min_bucket.is_some_and(|min| bucket < min) {
            return;
        }

        let span_context = self.span.span_context();
        let record = LogRecord {
            bucket,
            timestamp: Utc::now(),
            sender: sender.to_string(),
            trace_id: span_context.trace_id().to_string(),
            span_id: span_context.span_id().to_string(),
            attributes: attributes.to_vec(),
            message: render_message(args),
        };

        self.sink.submit(&record);
    }

    /// End the underlying span. Safe to call more than once.
    pub fn close(&self) {
        self.span.close();
    }
}

// A failing `Display` impl leaves whatever was written before the error.
fn render_message(args: fmt::Arguments<'_>) -> String {
    if let Some(literal) = args.as_str() {
        return literal.to_string();
    }
    let mut message = String::new();
    let _ = message.write_fmt(args);
    message
}

impl<T> fmt::Debug for TraceLogger<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceLogger")
            .field("span", &self.span)
            .field("min_bucket", &self.min_bucket)
            .finish_non_exhaustive()
    }
}
