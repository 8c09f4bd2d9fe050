//! Service scaffold around a generic outbound HTTP client.

pub mod client;
pub mod config;
pub mod observability;

pub use client::{ClientError, Field, HttpClient, NamedFile, PartSource};
pub use config::ServiceConfig;
pub use observability::{LogLevel, Logger, TracingLogger};
