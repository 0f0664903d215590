use opentelemetry::trace::TraceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceLoggerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Tracer error: {0}")]
    Tracer(#[from] TraceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tracing_subscriber::util::TryInitError> for TraceLoggerError {
    fn from(err: tracing_subscriber::util::TryInitError) -> Self {
        TraceLoggerError::Init(err.to_string())
    }
}

impl From<tracing_appender::rolling::InitError> for TraceLoggerError {
    fn from(err: tracing_appender::rolling::InitError) -> Self {
        TraceLoggerError::Init(format!("rolling file appender: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TraceLoggerError>;
