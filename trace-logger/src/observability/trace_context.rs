//! W3C Trace Context propagation for operation spans.
//!
//! Helpers to turn incoming `traceparent`/`tracestate` headers into an
//! OpenTelemetry [`Context`] that an [`OperationSpan`](crate::OperationSpan)
//! can continue, and to hand the context of an operation on to downstream
//! calls.
//!
//! See: https://www.w3.org/TR/trace-context/

use std::collections::HashMap;

use opentelemetry::Context;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::SpanContext;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for W3C tracestate
pub const TRACESTATE_HEADER: &str = "tracestate";

/// OpenTelemetry context of the current `tracing` span.
///
/// Only carries a valid span context when the subscriber has the
/// OpenTelemetry layer installed.
pub fn current_context() -> Context {
    Span::current().context()
}

/// Format a span context as a `traceparent` value.
///
/// Format: version-trace_id-span_id-trace_flags, version is always "00".
pub fn traceparent(span_context: &SpanContext) -> Option<String> {
    if !span_context.is_valid() {
        return None;
    }
    Some(format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    ))
}

/// Build a parent context from incoming headers.
///
/// Returns a context without a valid span when the headers are missing or
/// malformed, in which case an operation started from it opens a new trace.
pub fn extract_context(headers: &HashMap<String, String>) -> Context {
    let propagator = TraceContextPropagator::new();
    propagator.extract_with_context(&Context::new(), headers)
}

/// Serialize the span context held by `cx` into W3C headers.
pub fn inject_context(cx: &Context) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    let propagator = TraceContextPropagator::new();
    propagator.inject_context(cx, &mut headers);
    headers
}

/// Extract the raw traceparent header value if present.
pub fn extract_traceparent(headers: &HashMap<String, String>) -> Option<String> {
    headers.get(TRACEPARENT_HEADER).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

    const TRACEPARENT: &str = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";

    #[test]
    fn test_extract_valid_traceparent() {
        let mut headers = HashMap::new();
        headers.insert(TRACEPARENT_HEADER.to_string(), TRACEPARENT.to_string());

        let cx = extract_context(&headers);
        let span_context = cx.span().span_context().clone();
        assert!(span_context.is_valid());
        assert!(span_context.is_remote());
        assert_eq!(
            span_context.trace_id(),
            TraceId::from_hex("0af7651916cd43dd8448eb211c80319c").unwrap()
        );
    }

    #[test]
    fn test_extract_missing_or_malformed_headers() {
        let cx = extract_context(&HashMap::new());
        assert!(!cx.span().span_context().is_valid());

        let mut headers = HashMap::new();
        headers.insert(TRACEPARENT_HEADER.to_string(), "not-a-traceparent".to_string());
        let cx = extract_context(&headers);
        assert!(!cx.span().span_context().is_valid());
    }

    #[test]
    fn test_inject_round_trips_traceparent() {
        let span_context = SpanContext::new(
            TraceId::from_hex("0af7651916cd43dd8448eb211c80319c").unwrap(),
            SpanId::from_hex("b7ad6b7169203331").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let cx = Context::new().with_remote_span_context(span_context.clone());

        let headers = inject_context(&cx);
        assert_eq!(extract_traceparent(&headers).as_deref(), Some(TRACEPARENT));
        assert_eq!(traceparent(&span_context).as_deref(), Some(TRACEPARENT));
    }

    #[test]
    fn test_invalid_span_context_has_no_traceparent() {
        assert!(traceparent(&SpanContext::empty_context()).is_none());
        assert!(inject_context(&Context::new()).is_empty());
    }

    #[test]
    fn test_current_context_without_layer_is_empty() {
        let cx = current_context();
        assert!(!cx.span().span_context().is_valid());
    }
}
