//! Tracing subscriber setup shared by the solspec binaries.
//!
//! ```ignore
//! let mut log_config = LogConfig::from_env("info").with_stderr();
//! if cli.verbose {
//!     log_config = log_config.with_level("debug");
//! }
//! let _logging_guards = init_logging(&log_config)?;
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::EnvParser;

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    const CHOICES: &'static [&'static str] = &["pretty", "json"];

    fn parse(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `solspec_common=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Also write JSON lines to this file.
    pub file: Option<PathBuf>,
    /// Console output goes to stderr instead of stdout.
    pub stderr: bool,
    /// Rejected `SOLSPEC_LOG_*` values, reported once logging is up.
    pub env_warnings: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
            stderr: false,
            env_warnings: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Read `SOLSPEC_LOG_LEVEL`, `SOLSPEC_LOG_FORMAT` and `SOLSPEC_LOG_FILE`.
    ///
    /// Invalid values fall back to the defaults and are kept in
    /// `env_warnings`.
    pub fn from_env(default_level: &str) -> Self {
        let mut parser = EnvParser::new();
        let level = parser.get_log_level("LOG_LEVEL", default_level).value;
        let format = parser
            .get_choice("LOG_FORMAT", LogFormat::CHOICES, "pretty")
            .value;
        let file = parser.get_optional_path("LOG_FILE").value;

        Self {
            level,
            format: LogFormat::parse(format),
            file,
            stderr: false,
            env_warnings: parser
                .take_errors()
                .into_iter()
                .map(|err| err.to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log file path has no file name: {path}")]
    LogFileName { path: PathBuf },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps non-blocking writers flushing until dropped.
#[must_use = "dropping the guards stops background log writers"]
#[derive(Debug, Default)]
pub struct LoggingGuards {
    guards: Vec<WorkerGuard>,
}

impl LoggingGuards {
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards, LoggingError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|source| LoggingError::Filter {
        directive: config.level.clone(),
        source,
    })?;

    let mut guards = LoggingGuards::default();
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    if let Some(path) = &config.file {
        let (layer, guard) = file_layer(path)?;
        layers.push(layer);
        guards.guards.push(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    for warning in &config.env_warnings {
        warn!(warning = %warning, "log_env_ignored");
    }
    Ok(guards)
}

fn console_layer(config: &LogConfig) -> BoxedLayer {
    let writer = if config.stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };
    match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .compact()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
    }
}

fn file_layer(path: &Path) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    let file_name = path.file_name().ok_or_else(|| LoggingError::LogFileName {
        path: path.to_path_buf(),
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::LogDir {
        path: dir.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .boxed();
    Ok((layer, guard))
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::config::env_test_lock;

    const VARS: &[&str] = &["SOLSPEC_LOG_LEVEL", "SOLSPEC_LOG_FORMAT", "SOLSPEC_LOG_FILE"];

    fn cleanup_env() {
        for var in VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn from_env_defaults() {
        let _lock = env_test_lock();
        cleanup_env();

        let config = LogConfig::from_env("warn");
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert!(!config.stderr);
        assert!(config.env_warnings.is_empty());
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = env_test_lock();
        cleanup_env();
        unsafe {
            std::env::set_var("SOLSPEC_LOG_LEVEL", "DEBUG");
            std::env::set_var("SOLSPEC_LOG_FORMAT", "json");
            std::env::set_var("SOLSPEC_LOG_FILE", "/tmp/solspec.log");
        }

        let config = LogConfig::from_env("info");
        cleanup_env();

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/solspec.log")));
    }

    #[test]
    fn invalid_env_values_fall_back_with_warnings() {
        let _lock = env_test_lock();
        cleanup_env();
        unsafe {
            std::env::set_var("SOLSPEC_LOG_LEVEL", "loud");
            std::env::set_var("SOLSPEC_LOG_FORMAT", "xml");
        }

        let config = LogConfig::from_env("info");
        cleanup_env();

        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.env_warnings.len(), 2);
    }

    #[test]
    fn builders() {
        let config = LogConfig::default()
            .with_stderr()
            .with_level("trace")
            .with_format(LogFormat::Json)
            .with_file("logs/run.jsonl");
        assert!(config.stderr);
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("logs/run.jsonl")));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = LogConfig::default().with_level("solspec=notalevel");
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::Filter { .. })
        ));
    }
}
