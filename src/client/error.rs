//! Error taxonomy for outbound calls.

use thiserror::Error;

/// Errors returned by `HttpClient` builders and `do_request`.
///
/// Variants are listed in the order a call can hit them: construction,
/// transport, status validation, body read.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Target URL could not be parsed. No network activity happened.
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A caller header name or value is not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Request or transport could not be constructed.
    #[error("failed to build request: {0}")]
    Build(#[source] reqwest::Error),

    /// DNS, connect, TLS, timeout or connection failure. No response was read.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Remote answered with anything other than 200.
    #[error("status_code: {status}, content: {body}")]
    Status { status: u16, body: String },

    /// Remote answered with anything other than 200 and the body could not be read.
    #[error("status_code: {status}, failed to read response body: {reason}")]
    StatusBodyUnreadable { status: u16, reason: String },

    /// Status was 200 but reading the body failed.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// Copying a multipart source into its part failed.
    #[error("multipart part '{name}': {source}")]
    Part {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The blocking multipart assembly task did not complete.
    #[error("multipart assembly aborted: {0}")]
    Blocking(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the remote answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. }
            | ClientError::StatusBodyUnreadable { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "status_code: 500, content: boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_unreadable_body_display() {
        let err = ClientError::StatusBodyUnreadable {
            status: 502,
            reason: "connection closed".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("connection closed"));
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_part_error_keeps_source() {
        let err = ClientError::Part {
            name: "avatar".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read"),
        };
        assert_eq!(err.to_string(), "multipart part 'avatar': short read");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_invalid_url_display() {
        let source = url::Url::parse("::nope").unwrap_err();
        let err = ClientError::InvalidUrl {
            url: "::nope".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid url '::nope'"));
    }
}
