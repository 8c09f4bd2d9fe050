//! Outbound HTTP client and its single dispatch path.
//!
//! # Responsibilities
//! - Hold the injected logger, verbosity and pooled transport
//! - Dump outbound requests at debug verbosity
//! - Send each request once and classify the outcome
//!
//! # Design Decisions
//! - Only status 200 is success; every other status is one error kind
//! - Response bodies are buffered fully
//! - No retry, no backoff; callers decide what to do with errors

use std::fmt::{self, Write as _};
use std::sync::Arc;

use reqwest::{Request, StatusCode};

use crate::client::error::{ClientError, ClientResult};
use crate::client::transport::TransportConfig;
use crate::observability::{LogLevel, Logger};

/// Generic outbound HTTP client shared by request handlers.
///
/// Cloning is cheap and clones share the connection pool. Holds no mutable
/// state, so concurrent calls need no locking.
#[derive(Clone)]
pub struct HttpClient {
    logger: Arc<dyn Logger>,
    level: LogLevel,
    pub(crate) transport: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the default dial, handshake and request timeouts.
    pub fn new(logger: Arc<dyn Logger>, level: LogLevel) -> ClientResult<Self> {
        Self::with_transport(logger, level, TransportConfig::default())
    }

    /// Create a client over an explicit transport configuration.
    pub fn with_transport(
        logger: Arc<dyn Logger>,
        level: LogLevel,
        transport: TransportConfig,
    ) -> ClientResult<Self> {
        let transport = transport.build().map_err(ClientError::Build)?;
        Ok(Self {
            logger,
            level,
            transport,
        })
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Send a fully built request and validate the response.
    ///
    /// Returns the body bytes when the status is exactly 200.
    pub async fn do_request(&self, request: Request) -> ClientResult<Vec<u8>> {
        if self.level == LogLevel::Debug {
            self.logger
                .info(format_args!("http request: {}", dump_request(&request)));
        }

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(match response.bytes().await {
                Ok(body) => ClientError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
                Err(e) => ClientError::StatusBodyUnreadable {
                    status: status.as_u16(),
                    reason: e.to_string(),
                },
            });
        }

        let body = response.bytes().await.map_err(ClientError::BodyRead)?;
        Ok(body.to_vec())
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Render a request as wire-like text: request line, headers, body.
pub fn dump_request(request: &Request) -> String {
    let url = request.url();
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut dump = String::new();
    let _ = write!(dump, "{} {} {:?}\r\n", request.method(), target, request.version());
    if let Some(host) = url.host_str() {
        let _ = match url.port() {
            Some(port) => write!(dump, "Host: {}:{}\r\n", host, port),
            None => write!(dump, "Host: {}\r\n", host),
        };
    }
    for (name, value) in request.headers() {
        let _ = write!(dump, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
    dump.push_str("\r\n");

    match request.body().map(|body| body.as_bytes()) {
        Some(Some(bytes)) => dump.push_str(&String::from_utf8_lossy(bytes)),
        Some(None) => dump.push_str("<streamed body>"),
        None => {}
    }
    dump
}
