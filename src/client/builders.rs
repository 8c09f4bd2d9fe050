//! Content-type specific request builders.
//!
//! Every builder applies the caller's headers first, then forces its own
//! content type (replacing any caller value), then hands the request to
//! `HttpClient::do_request`.

use std::borrow::Cow;
use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::client::error::{ClientError, ClientResult};
use crate::client::http::HttpClient;
use crate::client::parts::{encode_multipart, PartSource};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

impl HttpClient {
    /// GET `target` with `params` appended to its query string.
    ///
    /// String values are appended as-is; any other value is appended as its
    /// JSON text (`7`, `true`, `["a","b"]`).
    pub async fn get(
        &self,
        target: &str,
        params: &HashMap<String, Value>,
        headers: &HashMap<String, String>,
    ) -> ClientResult<Vec<u8>> {
        let mut url = parse_url(target)?;
        let headers = header_map(headers)?;

        if !params.is_empty() {
            let mut keys: Vec<&String> = params.keys().collect();
            keys.sort();
            let mut query = url.query_pairs_mut();
            for key in keys {
                query.append_pair(key, &query_value(&params[key]));
            }
        }

        let request = self
            .transport
            .get(url)
            .headers(headers)
            .build()
            .map_err(ClientError::Build)?;
        self.do_request(request).await
    }

    /// POST pre-serialized JSON bytes.
    pub async fn post_json(
        &self,
        target: &str,
        headers: &HashMap<String, String>,
        content: Vec<u8>,
    ) -> ClientResult<Vec<u8>> {
        self.post_bytes(target, headers, JSON_CONTENT_TYPE, content).await
    }

    /// POST a URL-encoded form.
    pub async fn post_form(
        &self,
        target: &str,
        headers: &HashMap<String, String>,
        content: &HashMap<String, String>,
    ) -> ClientResult<Vec<u8>> {
        self.post_bytes(target, headers, FORM_CONTENT_TYPE, encode_form(content).into_bytes())
            .await
    }

    /// POST a multipart form built from `content`.
    ///
    /// Sources with a filename become file parts, the rest plain fields.
    /// Every source is released before this returns, whatever the outcome.
    /// Parts are written in sorted name order.
    pub async fn post_multipart(
        &self,
        target: &str,
        headers: &HashMap<String, String>,
        content: HashMap<String, Box<dyn PartSource>>,
    ) -> ClientResult<Vec<u8>> {
        let url = parse_url(target)?;
        let headers = header_map(headers)?;

        let body = tokio::task::spawn_blocking(move || encode_multipart(content))
            .await
            .map_err(|e| ClientError::Blocking(e.to_string()))??;

        let content_type = HeaderValue::from_str(&body.content_type()).map_err(|e| {
            ClientError::InvalidHeader {
                name: CONTENT_TYPE.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.send(url, headers, content_type, body.into_bytes()).await
    }

    /// POST raw bytes.
    pub async fn post_binary(
        &self,
        target: &str,
        headers: &HashMap<String, String>,
        content: Vec<u8>,
    ) -> ClientResult<Vec<u8>> {
        self.post_bytes(target, headers, BINARY_CONTENT_TYPE, content).await
    }

    async fn post_bytes(
        &self,
        target: &str,
        headers: &HashMap<String, String>,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> ClientResult<Vec<u8>> {
        let url = parse_url(target)?;
        let headers = header_map(headers)?;
        self.send(url, headers, HeaderValue::from_static(content_type), body)
            .await
    }

    /// POST `body` with `content_type` replacing any caller value.
    async fn send(
        &self,
        url: Url,
        mut headers: HeaderMap,
        content_type: HeaderValue,
        body: Vec<u8>,
    ) -> ClientResult<Vec<u8>> {
        headers.insert(CONTENT_TYPE, content_type);

        let request = self
            .transport
            .post(url)
            .headers(headers)
            .body(body)
            .build()
            .map_err(ClientError::Build)?;
        self.do_request(request).await
    }
}

fn parse_url(target: &str) -> ClientResult<Url> {
    Url::parse(target).map_err(|source| ClientError::InvalidUrl {
        url: target.to_string(),
        source,
    })
}

/// Convert caller headers; a repeated name keeps the last value.
fn header_map(headers: &HashMap<String, String>) -> ClientResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ClientError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn query_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// `application/x-www-form-urlencoded` body with keys in sorted order.
fn encode_form(content: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = content.iter().collect();
    pairs.sort();
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
