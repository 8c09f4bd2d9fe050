//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the log filter directive parses
//! - Check default client headers are valid HTTP header names and values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("log.filter '{directive}' is invalid: {reason}")]
    InvalidLogFilter { directive: String, reason: String },

    #[error("client.headers: '{0}' is not a valid header name")]
    InvalidHeaderName(String),

    #[error("client.headers: value of '{0}' is not a valid header value")]
    InvalidHeaderValue(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(directive) = config.log.filter.as_deref() {
        if !directive.trim().is_empty() {
            if let Err(e) = EnvFilter::try_new(directive) {
                errors.push(ValidationError::InvalidLogFilter {
                    directive: directive.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut names: Vec<&String> = config.client.headers.keys().collect();
    names.sort();
    for name in names {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        } else if HeaderValue::from_str(&config.client.headers[name]).is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
