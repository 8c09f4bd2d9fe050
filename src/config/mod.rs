//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config/<profile>.toml
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to logging init and the HTTP client at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_profile, ConfigError};
pub use schema::{ClientConfig, LogConfig, ServiceConfig};
