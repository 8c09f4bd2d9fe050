//! Outbound HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → builders.rs (get | post_json | post_form | post_multipart | post_binary)
//!         - caller headers applied, then the builder's content type forced
//!         - parts.rs encodes multipart bodies and releases every source
//!     → http.rs do_request
//!         - debug verbosity: request dumped through Logger::info
//!         - one attempt through the pooled transport (transport.rs timeouts)
//!         - 200 → body bytes, anything else → ClientError
//!     → Caller
//! ```
//!
//! # Design Decisions
//! - One dispatch path for all encodings
//! - Logger and transport configuration are injected, never global
//! - Errors are returned, never logged or retried here

pub mod builders;
pub mod error;
pub mod http;
pub mod parts;
pub mod transport;

pub use builders::{BINARY_CONTENT_TYPE, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use parts::{Field, MultipartBody, NamedFile, PartSource};
pub use transport::{TransportConfig, DIAL_TIMEOUT, REQUEST_TIMEOUT, TLS_HANDSHAKE_TIMEOUT};
