//! Shared utilities for integration testing.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::{HeaderMap, Method, Uri, Version};
use axum::routing::{any, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use example_service::client::{HttpClient, TransportConfig};
use example_service::observability::{LogLevel, Logger};

/// Logger that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingLogger {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl Logger for RecordingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        self.infos.lock().unwrap().push(args.to_string());
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.errors.lock().unwrap().push(args.to_string());
    }

    fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        panic!("fatal: {}", args)
    }
}

/// Client at `level` with default timeouts, plus the logger it writes to.
#[allow(dead_code)]
pub fn client(level: LogLevel) -> (HttpClient, Arc<RecordingLogger>) {
    client_with_transport(level, TransportConfig::default())
}

#[allow(dead_code)]
pub fn client_with_transport(
    level: LogLevel,
    transport: TransportConfig,
) -> (HttpClient, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::default());
    let client = HttpClient::with_transport(logger.clone(), level, transport).unwrap();
    (client, logger)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Read the request head and a `Content-Length` body, if any.
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let mut expected: Option<usize> = None;
    loop {
        if expected.is_none() {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                expected = Some(end + 4 + body_len);
            }
        }
        if matches!(expected, Some(total) if buf.len() >= total) {
            return;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

async fn serve_raw<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = String> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        read_request(&mut socket).await;
                        let response = f().await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a programmable backend answering every request with `(status, body)`.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    serve_raw(move || {
        let f = f.clone();
        async move {
            let (status, body) = f().await;
            let reason = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown");
            format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            )
        }
    })
    .await
}

/// Start a backend writing `raw` verbatim, e.g. a response cut short.
#[allow(dead_code)]
pub async fn start_raw_backend(raw: &'static str) -> SocketAddr {
    serve_raw(move || async move { raw.to_string() }).await
}

/// Start an axum backend that reports what it received.
///
/// - `/echo` (any method): method, version, path, query, headers, body
/// - `/upload` (POST multipart): headers and every part's name, filename,
///   content type and content
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let app = Router::new()
        .route("/echo", any(echo))
        .route("/upload", post(upload));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn header_values(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        values
            .entry(name.to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    values
}

async fn echo(
    method: Method,
    version: Version,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "version": format!("{:?}", version),
        "path": uri.path(),
        "query": uri.query().unwrap_or(""),
        "headers": header_values(&headers),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Json<Value> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap();
        parts.push(json!({
            "name": name,
            "file_name": file_name,
            "content_type": content_type,
            "content": String::from_utf8_lossy(&data),
        }));
    }

    Json(json!({
        "headers": header_values(&headers),
        "parts": parts,
    }))
}
