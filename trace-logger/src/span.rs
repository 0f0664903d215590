//! Span lifecycle for one logical operation.
//!
//! An [`OperationSpan`] owns exactly one OpenTelemetry span. When the parent
//! context already carries a valid span context the new span joins that
//! trace as a child; otherwise it becomes the root of a fresh trace. The
//! span is ended by [`OperationSpan::close`] or, failing that, on drop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceId, Tracer};
use opentelemetry::Context;

use crate::observability::trace_context::current_context;

pub struct OperationSpan<T = BoxedTracer> {
    tracer: T,
    name: String,
    context: Context,
    span_context: SpanContext,
    ended: AtomicBool,
}

impl<T> OperationSpan<T>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    /// Start the operation's span under `parent` using `tracer`.
    pub fn start(parent: &Context, tracer: T, name: impl Into<String>) -> Self {
        Self::open(parent, tracer, None, name.into())
    }

    fn open(parent: &Context, tracer: T, component: Option<&str>, name: String) -> Self {
        let continued = parent.span().span_context().is_valid();

        let span = tracer.start_with_context(name.clone(), parent);
        let context = parent.with_span(span);
        let span_context = context.span().span_context().clone();

        tracing::info!(
            component,
            span = %name,
            trace_id = %span_context.trace_id(),
            span_id = %span_context.span_id(),
            continued,
            "Operation span started"
        );

        Self {
            tracer,
            name,
            context,
            span_context,
            ended: AtomicBool::new(false),
        }
    }
}

impl OperationSpan<BoxedTracer> {
    /// Start a span with the globally installed tracer provider.
    ///
    /// `component` names the tracer (instrumentation scope). Without an
    /// installed SDK provider the global tracer is a no-op and the trace ID
    /// is invalid; [`init_logging`](crate::observability::init_logging)
    /// always installs one.
    pub fn start_global(parent: &Context, component: &str, name: impl Into<String>) -> Self {
        let tracer = global::tracer(component.to_owned());
        Self::open(parent, tracer, Some(component), name.into())
    }

    /// Start a span parented on the current `tracing` span's context.
    pub fn start_in_current(component: &str, name: impl Into<String>) -> Self {
        Self::start_global(&current_context(), component, name)
    }
}

impl<T> OperationSpan<T> {
    pub fn trace_id(&self) -> TraceId {
        self.span_context.trace_id()
    }

    pub fn span_id(&self) -> SpanId {
        self.span_context.span_id()
    }

    pub fn span_context(&self) -> &SpanContext {
        &self.span_context
    }

    /// Context holding this operation's span, for parenting child work.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }

    /// End the span. Only the first call has an effect.
    pub fn close(&self) {
        if self.ended.swap(true, Ordering::AcqRel) {
            return;
        }
        self.context.span().end();
        tracing::trace!(
            span = %self.name,
            trace_id = %self.span_context.trace_id(),
            "Operation span closed"
        );
    }
}

impl<T> Drop for OperationSpan<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> fmt::Debug for OperationSpan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSpan")
            .field("name", &self.name)
            .field("trace_id", &self.span_context.trace_id())
            .field("span_id", &self.span_context.span_id())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{TraceFlags, TraceState, TracerProvider as _};
    use opentelemetry_sdk::trace::TracerProvider;

    // The SDK tracer only holds a weak reference to its provider, so the
    // provider has to outlive every span started in a test.
    fn sdk_tracer() -> (TracerProvider, opentelemetry_sdk::trace::Tracer) {
        let provider = TracerProvider::builder().build();
        let tracer = provider.tracer("span-tests");
        (provider, tracer)
    }

    fn remote_parent() -> Context {
        let span_context = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        Context::new().with_remote_span_context(span_context)
    }

    #[test]
    fn test_start_without_parent_creates_fresh_trace() {
        let (_provider, tracer) = sdk_tracer();
        let op = OperationSpan::start(&Context::new(), tracer, "op");

        assert_ne!(op.trace_id(), TraceId::INVALID);
        assert_ne!(op.span_id(), SpanId::INVALID);
        assert!(op.span_context().is_valid());
        assert_eq!(op.name(), "op");
    }

    #[test]
    fn test_start_with_parent_reuses_trace_id() {
        let parent = remote_parent();
        let (_provider, tracer) = sdk_tracer();
        let op = OperationSpan::start(&parent, tracer, "child-op");

        assert_eq!(
            op.trace_id(),
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap()
        );
        assert_ne!(
            op.span_id(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            "a child span gets its own span id"
        );
    }

    #[test]
    fn test_separate_operations_get_separate_traces() {
        let (_provider, tracer) = sdk_tracer();
        let first = OperationSpan::start(&Context::new(), tracer.clone(), "first");
        let second = OperationSpan::start(&Context::new(), tracer, "second");
        assert_ne!(first.trace_id(), second.trace_id());
    }

    #[test]
    fn test_close_ends_span_and_is_idempotent() {
        let (_provider, tracer) = sdk_tracer();
        let op = OperationSpan::start(&Context::new(), tracer, "op");
        assert!(op.context().span().is_recording());
        assert!(!op.is_closed());

        op.close();
        assert!(op.is_closed());
        assert!(!op.context().span().is_recording());

        op.close();
        assert!(op.is_closed());
    }

    #[test]
    fn test_drop_ends_span() {
        let (_provider, tracer) = sdk_tracer();
        let op = OperationSpan::start(&Context::new(), tracer, "op");
        let context = op.context().clone();
        assert!(context.span().is_recording());

        drop(op);
        assert!(!context.span().is_recording());
    }

    #[test]
    fn test_global_noop_tracer_does_not_panic() {
        let op = OperationSpan::start_global(&Context::new(), "svc/comp", "op");
        op.close();
        assert!(op.is_closed());
    }

    #[test]
    fn test_debug_output_names_span() {
        let (_provider, tracer) = sdk_tracer();
        let op = OperationSpan::start(&Context::new(), tracer, "debugged");
        let rendered = format!("{:?}", op);
        assert!(rendered.contains("debugged"));
        assert!(rendered.contains("closed: false"));
    }
}
