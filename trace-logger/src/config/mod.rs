use std::path::{Path, PathBuf};

use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, TraceLoggerError};

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<Rotation> for tracing_appender::rolling::Rotation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
            Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
            Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
        }
    }
}

/// Rolling JSON log file output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub rotation: Rotation,
    /// Number of rolled files to keep; unlimited when unset.
    #[serde(default)]
    pub max_files: Option<usize>,
}

impl FileConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: default_file_prefix(),
            rotation: Rotation::default(),
            max_files: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub hostname: Option<String>,
    /// Level or full `EnvFilter` directive, e.g. `info,trace_logger=debug`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub file: Option<FileConfig>,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    "trace-logger".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "service".to_string()
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new(default_service_name())
    }
}

impl LoggerConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            hostname: None,
            level: default_level(),
            format: LogFormat::default(),
            file: None,
            otlp_endpoint: None,
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    /// Load from an optional `configuration` file in the working directory
    /// and `TRACE_LOGGER__*` environment variables, after reading `.env`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::build(File::with_name("configuration").required(false))
    }

    /// Load from the given file (format picked by extension), with
    /// environment variables layered on top.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Cfg::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("TRACE_LOGGER").separator("__"))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(TraceLoggerError::Config(
                "service_name must not be empty".to_string(),
            ));
        }

        EnvFilter::try_new(&self.level).map_err(|e| {
            TraceLoggerError::Config(format!("invalid level '{}': {}", self.level, e))
        })?;

        if let Some(file) = &self.file {
            if file.prefix.is_empty() {
                return Err(TraceLoggerError::Config(
                    "file.prefix must not be empty".to_string(),
                ));
            }
            if file.max_files == Some(0) {
                return Err(TraceLoggerError::Config(
                    "file.max_files must be at least 1".to_string(),
                ));
            }
        }

        if let Some(endpoint) = &self.otlp_endpoint
            && endpoint.trim().is_empty()
        {
            return Err(TraceLoggerError::Config(
                "otlp_endpoint must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }
}
