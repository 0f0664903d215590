pub mod logging;
pub mod trace_context;

pub use logging::{LoggingGuard, init_logging};
pub use trace_context::{
    TRACEPARENT_HEADER, TRACESTATE_HEADER, current_context, extract_context,
    extract_traceparent, inject_context, traceparent,
};
