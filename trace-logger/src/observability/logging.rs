use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::{Resource, runtime, trace as sdktrace};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{FileConfig, LogFormat, LoggerConfig};
use crate::error::{Result, TraceLoggerError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the logging pipeline alive.
///
/// Dropping it flushes the file writer and shuts the tracer provider down,
/// exporting any spans still buffered.
#[must_use = "dropping the guard shuts logging down"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        global::shutdown_tracer_provider();
    }
}

/// Install the process-wide subscriber and tracer provider.
///
/// `RUST_LOG` takes precedence over `config.level`. When no OTLP endpoint
/// is configured an exporter-less SDK provider is installed so that trace
/// IDs are still generated. The OTLP pipeline exports in batches and must
/// be initialised from within a Tokio runtime.
pub fn init_logging(config: &LoggerConfig) -> Result<LoggingGuard> {
    config.validate()?;

    // Installing a second provider would orphan the tracer held by the
    // already-registered OpenTelemetry layer.
    if tracing::dispatcher::has_been_set() {
        return Err(TraceLoggerError::Init(
            "a global tracing subscriber is already installed".to_string(),
        ));
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| TraceLoggerError::Config(format!("invalid level filter: {}", e)))?;

    global::set_text_map_propagator(TraceContextPropagator::new());
    let tracer = install_tracer_provider(config)?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format)];

    let file_guard = match &config.file {
        Some(file) => {
            let (layer, guard) = file_layer(file)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        level = %config.level,
        otlp = config.otlp_endpoint.is_some(),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn service_resource(config: &LoggerConfig) -> Resource {
    let mut attributes = vec![KeyValue::new("service.name", config.service_name.clone())];
    if let Some(hostname) = &config.hostname {
        attributes.push(KeyValue::new("host.name", hostname.clone()));
    }
    Resource::new(attributes)
}

fn install_tracer_provider(config: &LoggerConfig) -> Result<sdktrace::Tracer> {
    let trace_config = sdktrace::config().with_resource(service_resource(config));

    match &config.otlp_endpoint {
        Some(endpoint) => {
            let otlp_exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.clone());

            // The pipeline registers its provider globally.
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(otlp_exporter)
                .with_trace_config(trace_config)
                .install_batch(runtime::Tokio)?;
            Ok(tracer)
        }
        None => {
            let provider = sdktrace::TracerProvider::builder()
                .with_config(trace_config)
                .build();
            let tracer = provider.tracer(config.service_name.clone());
            global::set_tracer_provider(provider);
            Ok(tracer)
        }
    }
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

fn file_layer(file: &FileConfig) -> Result<(BoxedLayer, WorkerGuard)> {
    std::fs::create_dir_all(&file.directory)?;

    let mut builder = RollingFileAppender::builder()
        .rotation(file.rotation.into())
        .filename_prefix(file.prefix.clone())
        .filename_suffix("log");
    if let Some(max_files) = file.max_files {
        builder = builder.max_log_files(max_files);
    }
    let appender = builder.build(&file.directory)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_ansi(false)
        .with_writer(writer)
        .boxed();

    Ok((layer, guard))
}
