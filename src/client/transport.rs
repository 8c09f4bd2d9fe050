//! Transport construction and timeout constants.
//!
//! # Responsibilities
//! - Own the fixed dial, TLS handshake and overall request deadlines
//! - Build the pooled `reqwest::Client` every call goes through
//!
//! # Design Decisions
//! - Every outbound call has a deadline; a call past it is a transport error
//! - reqwest's connect timeout bounds the TCP dial; the TLS handshake runs
//!   inside the overall request deadline
//! - HTTP/1.1 only, no ALPN upgrade to HTTP/2
//! - No proxy is read from the environment; calls go direct

use std::time::Duration;

/// Budget for establishing the TCP connection.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for the TLS handshake once connected. reqwest exposes no separate
/// handshake knob, so it is enforced as part of `REQUEST_TIMEOUT`.
pub const TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for the whole call: connect, write, status line and body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeouts applied to the underlying transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub dial_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            dial_timeout: DIAL_TIMEOUT,
            tls_handshake_timeout: TLS_HANDSHAKE_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Connect budget handed to reqwest: the TCP dial, capped by the
    /// overall deadline.
    pub fn connect_timeout(&self) -> Duration {
        self.dial_timeout.min(self.request_timeout)
    }

    pub(crate) fn build(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout())
            .timeout(self.request_timeout)
            .http1_only()
            .no_proxy()
            .build()
    }
}
