//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from profile files.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::observability::LogLevel;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Logging settings.
    pub log: LogConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Console level; also the HTTP client's verbosity.
    pub level: LogLevel,

    /// Optional tracing filter directive (e.g. "example_service=debug,reqwest=info").
    pub filter: Option<String>,

    /// Console output as JSON lines instead of text.
    pub json: bool,

    /// Append info-and-above events to this file.
    pub file: Option<PathBuf>,

    /// Append error events to this file.
    pub error_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            filter: None,
            json: false,
            file: None,
            error_file: None,
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Headers sent with every CLI request, before per-call headers.
    pub headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "user-agent".to_string(),
            concat!("example-service/", env!("CARGO_PKG_VERSION")).to_string(),
        );
        Self { headers }
    }
}
