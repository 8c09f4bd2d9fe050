//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main:
//!     → logging::init_logging (tracing subscriber, filter from config,
//!       text or JSON console, optional info and error files)
//!     → TracingLogger handed to components as Arc<dyn Logger>
//!
//! HTTP client:
//!     → Logger::info (request dump at debug verbosity only)
//! ```

pub mod logging;

pub use logging::{init_logging, LogLevel, Logger, LoggingError, TracingLogger};
