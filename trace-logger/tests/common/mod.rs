//! Common test utilities for trace-logger integration tests.

#![allow(dead_code)]

use opentelemetry::Context;
use opentelemetry::trace::{
    SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState, TracerProvider as _,
};
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use std::fmt;
use std::sync::{Arc, Mutex, Once};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{self, Layer, SubscriberExt};

pub const REMOTE_TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const REMOTE_SPAN_ID: &str = "00f067aa0ba902b7";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,trace_logger=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// SDK tracer whose ended spans land in an in-memory exporter.
///
/// Keep the returned provider alive for as long as spans are started.
pub fn recording_tracer() -> (TracerProvider, InMemorySpanExporter, Tracer) {
    init_tracing();

    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("trace-logger-tests");
    (provider, exporter, tracer)
}

/// Context carrying a sampled remote parent, as extracted from headers.
pub fn remote_parent() -> Context {
    let span_context = SpanContext::new(
        TraceId::from_hex(REMOTE_TRACE_ID).unwrap(),
        SpanId::from_hex(REMOTE_SPAN_ID).unwrap(),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    Context::new().with_remote_span_context(span_context)
}

/// Names of all spans the exporter has received so far.
pub fn finished_span_names(exporter: &InMemorySpanExporter) -> Vec<String> {
    exporter
        .get_finished_spans()
        .expect("in-memory exporter should be readable")
        .into_iter()
        .map(|span| span.name.to_string())
        .collect()
}

/// One `tracing` event as seen by [`EventCapture`].
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Layer recording every event with its fields rendered as strings.
#[derive(Clone, Default)]
pub struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

impl EventCapture {
    /// Run `f` with this capture as the thread's default subscriber.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.field("message") == Some(message))
            .cloned()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{:?}", value)));
    }
}

impl<S: tracing::Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}
