//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from configuration
//! - Define the ordered verbosity levels shared by config and the HTTP client
//! - Provide the narrow `Logger` capability injected into components
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured filter, which overrides the level
//! - Console output is text or JSON; optional file sinks take info and error
//!   events respectively, never rotated
//! - Components receive a `Logger` instead of reaching for a global

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::schema::LogConfig;

/// Ordered log verbosity: `Error < Warning < Info < Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warn")]
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Logging capability handed to components at construction time.
///
/// Arguments are pre-formatted with `format_args!`, so implementations decide
/// where the text goes without components depending on a concrete backend.
pub trait Logger: Send + Sync {
    fn info(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
    /// Logs and terminates the process.
    fn fatal(&self, args: fmt::Arguments<'_>) -> !;
}

/// `Logger` backed by the process-wide tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!("{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!("{}", args);
    }

    fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        tracing::error!("{}", args);
        std::process::exit(1)
    }
}

/// Build the filter: `RUST_LOG`, then `log.filter`, then `log.level` for this crate.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    match config.filter.as_deref().map(str::trim) {
        Some(directive) if !directive.is_empty() => EnvFilter::try_new(directive)
            .unwrap_or_else(|_| level_filter(config.level)),
        _ => level_filter(config.level),
    }
}

fn level_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::new(format!("example_service={}", level.as_directive()))
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log file path '{}' has no file name", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to open log file '{}': {}", .path.display(), .source)]
    File {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Open `path` for appending, creating missing parent directories.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|source| LoggingError::File {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let console = if config.json {
        tracing_fmt::layer().json().boxed()
    } else {
        tracing_fmt::layer().boxed()
    };

    let file = match config.file.as_deref() {
        Some(path) => Some(
            tracing_fmt::layer()
                .with_writer(file_appender(path)?)
                .with_ansi(false)
                .with_filter(LevelFilter::INFO),
        ),
        None => None,
    };

    let error_file = match config.error_file.as_deref() {
        Some(path) => Some(
            tracing_fmt::layer()
                .with_writer(file_appender(path)?)
                .with_ansi(false)
                .with_filter(LevelFilter::ERROR),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console)
        .with(file)
        .with(error_file)
        .try_init()?;
    Ok(())
}
