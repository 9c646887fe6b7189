//! Structured logging for the CGR routing stack
//!
//! The routing engine logs through `tracing` and never installs a
//! subscriber itself. Binaries and tests pick an output here.
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines, one event per line (default)
//! - **Pretty Console**: Human-readable output for development
//! - **File Output**: Daily, hourly or single-file logs via tracing-appender
//! - **RUST_LOG Override**: `EnvFilter` takes precedence over the configured level
//!
//! # Quick Start
//!
//! ```ignore
//! use cgr_logging::{CgrSubscriberBuilder, LogConfig};
//!
//! // Simple setup with defaults (JSONL to console)
//! CgrSubscriberBuilder::new().init();
//!
//! // Development mode with pretty human-readable output
//! CgrSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```
//!
//! Routing passes run inside a `candidate_routes` span, so JSONL output
//! carries the destination and priority on every event of a pass.

pub mod config;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// The log directory or file could not be created
    #[error("failed to create log file: {0}")]
    Io(#[from] std::io::Error),

    /// The rolling appender could not be created
    #[error("failed to create rolling log appender: {0}")]
    Appender(#[from] InitError),

    /// A global subscriber is already installed
    #[error("global subscriber already set: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Builder for configuring and initializing the logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct CgrSubscriberBuilder {
    config: LogConfig,
}

impl CgrSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// The configuration the subscriber will be built from
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Initialize the subscriber globally
    ///
    /// Returns a guard that must be kept alive for the duration of the
    /// program when file output is enabled.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been set or the log file
    /// cannot be created.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => panic!("failed to initialize logging: {e}"),
        }
    }

    /// Try to initialize the subscriber globally
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.config.default_level)?,
        };

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        let console = &self.config.console;
        if console.enabled {
            let layer = match (console.pretty, console.stderr) {
                (true, false) => pretty_layer(console.ansi, std::io::stdout),
                (true, true) => pretty_layer(console.ansi, std::io::stderr),
                (false, false) => jsonl_layer(&self.config.jsonl, std::io::stdout),
                (false, true) => jsonl_layer(&self.config.jsonl, std::io::stderr),
            };
            layers.push(layer);
        }

        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(jsonl_layer(&self.config.jsonl, writer));
        }

        Registry::default().with(layers).with(env_filter).try_init()?;
        Ok(guard)
    }
}

impl Default for CgrSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable layer writing to `writer`
fn pretty_layer<W>(ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(writer)
        .boxed()
}

/// JSONL formatting layer writing to `writer`
fn jsonl_layer<W>(config: &JsonlConfig, writer: W) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_writer(writer)
        .boxed()
}

/// Non-blocking writer for the configured file output
///
/// `Never` truncates a single file; the other strategies append to rolling files.
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            return Ok(tracing_appender::non_blocking(File::create(path)?));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.prefix)
        .filename_suffix("log")
        .build(&config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging with default settings (JSONL to console)
pub fn init_default() {
    CgrSubscriberBuilder::new().init();
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() {
    CgrSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init();
}

/// Initialize logging for testing (minimal output)
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_testing() {
    let _ = CgrSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = CgrSubscriberBuilder::new();
        assert_eq!(builder.config().default_level, "info");
    }

    #[test]
    fn test_default_is_jsonl() {
        let builder = CgrSubscriberBuilder::new();
        assert!(!builder.config().console.pretty); // JSONL by default
    }

    #[test]
    fn test_builder_with_config() {
        let builder = CgrSubscriberBuilder::new().with_config(LogConfig::development());
        assert_eq!(builder.config().default_level, "debug");
        assert!(builder.config().console.pretty);
    }

    #[test]
    fn test_builder_with_level_and_console() {
        let builder = CgrSubscriberBuilder::new()
            .with_level("trace")
            .with_console(false);
        assert_eq!(builder.config().default_level, "trace");
        assert!(!builder.config().console.enabled);
    }

    #[test]
    fn test_builder_with_file_output() {
        let builder = CgrSubscriberBuilder::new().with_file_output(FileConfig {
            rotation: RotationStrategy::Hourly,
            ..FileConfig::default()
        });
        assert_eq!(
            builder.config().file.as_ref().map(|f| f.rotation),
            Some(RotationStrategy::Hourly)
        );
    }

    #[test]
    fn test_init_testing_is_repeatable() {
        init_testing();
        init_testing();
        tracing::warn!("logging initialized twice");
    }
}
