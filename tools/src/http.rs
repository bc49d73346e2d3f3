//! HTTP request tool
//!
//! `http_request` performs exactly one request (no retries) and always answers
//! with the same shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "status_code": 200,
//!   "headers": {"content-type": "application/json"},
//!   "content": {"parsed": "json or raw text"},
//!   "url": "https://example.com/after/redirects"
//! }
//! ```
//!
//! Transport failures and timeouts come back as `success: false` with
//! `status_code: 0` and a message in `content`.

use crate::error::ToolkitError;
use agent_toolkit_core::{Tool, ToolError, ToolExecutorFn, ToolFuture};
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use std::time::Duration;

/// Maximum response size (50MB)
pub const MAX_RESPONSE_SIZE: usize = 50 * 1024 * 1024;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_method() -> String {
    "GET".to_string()
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Request body: raw text, or an object sent as JSON
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestBody {
    /// Sent verbatim
    Text(String),
    /// Serialized as `application/json`
    Json(serde_json::Map<String, Value>),
}

impl RequestBody {
    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Json(map) => map.is_empty(),
        }
    }
}

/// Arguments of the `http_request` tool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HttpRequest {
    /// Target URL
    pub url: String,
    /// HTTP method, case-insensitive
    #[serde(default = "default_method")]
    pub method: String,
    /// Request headers
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    /// Request body
    #[serde(default)]
    pub data: Option<RequestBody>,
    /// Query parameters
    #[serde(default)]
    pub params: Option<BTreeMap<String, String>>,
    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl HttpRequest {
    /// GET request with default settings
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: None,
            data: None,
            params: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Builder: Set method
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Builder: Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Builder: Add a query parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Builder: Set body
    #[must_use]
    pub fn with_data(mut self, data: RequestBody) -> Self {
        self.data = Some(data);
        self
    }

    /// Builder: Set timeout in seconds
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

/// Output of the `http_request` tool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HttpResponse {
    /// `status_code < 400`
    pub success: bool,
    /// HTTP status, 0 when no response was received
    pub status_code: u16,
    /// Response headers; repeated headers are joined with `", "`
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body, or the raw text when the body is not JSON
    pub content: Value,
    /// Final URL after redirects
    pub url: String,
}

impl HttpResponse {
    /// Failure shape: no status, no headers, message as content
    #[must_use]
    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: 0,
            headers: BTreeMap::new(),
            content: Value::String(message.into()),
            url: url.into(),
        }
    }
}

/// Execute one HTTP request
///
/// Never fails: every error is folded into [`HttpResponse::failed`].
pub async fn execute_http_request(client: &Client, request: &HttpRequest) -> HttpResponse {
    tracing::debug!(method = %request.method, url = %request.url, "Executing HTTP request");

    match send(client, request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(url = %request.url, error = %err, "HTTP request failed");
            HttpResponse::failed(&request.url, describe_failure(&err))
        }
    }
}

fn describe_failure(err: &ToolkitError) -> String {
    match err {
        ToolkitError::Timeout(timeout) => {
            format!("Request timed out after {} seconds", timeout.as_secs())
        }
        ToolkitError::Transport(message) => format!("Request error: {message}"),
        other => format!("Error making request: {other}"),
    }
}

async fn send(client: &Client, request: &HttpRequest) -> Result<HttpResponse, ToolkitError> {
    validate_url(&request.url)?;

    let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
        .map_err(|_| ToolkitError::InvalidMethod(request.method.clone()))?;
    let timeout = Duration::from_secs(request.timeout);

    let mut builder = client.request(method, &request.url).timeout(timeout);

    if let Some(headers) = &request.headers {
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
    }

    if let Some(params) = request.params.as_ref().filter(|p| !p.is_empty()) {
        builder = builder.query(params);
    }

    // Empty bodies are treated as absent
    match request.data.as_ref().filter(|data| !data.is_empty()) {
        Some(RequestBody::Json(map)) => builder = builder.json(map),
        Some(RequestBody::Text(text)) => builder = builder.body(text.clone()),
        None => {}
    }

    let response = builder
        .send()
        .await
        .map_err(|e| transport_error(&e, timeout))?;

    let status_code = response.status().as_u16();
    let url = response.url().to_string();
    let headers = header_map(response.headers());

    let body = read_body(response, timeout).await?;
    let text = String::from_utf8_lossy(&body).into_owned();
    let content = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

    Ok(HttpResponse {
        success: status_code < 400,
        status_code,
        headers,
        content,
        url,
    })
}

/// Only `http://` and `https://` URLs are allowed
pub(crate) fn validate_url(url: &str) -> Result<(), ToolkitError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ToolkitError::InvalidUrl(url.to_string()))
    }
}

pub(crate) fn transport_error(err: &reqwest::Error, timeout: Duration) -> ToolkitError {
    if err.is_timeout() {
        ToolkitError::Timeout(timeout)
    } else {
        ToolkitError::Transport(err.to_string())
    }
}

pub(crate) fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match map.entry(name.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let existing: &mut String = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    map
}

/// Stream a response body, enforcing [`MAX_RESPONSE_SIZE`]
pub(crate) async fn read_body(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<Vec<u8>, ToolkitError> {
    let mut body_bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transport_error(&e, timeout))?;

        if body_bytes.len() + chunk.len() > MAX_RESPONSE_SIZE {
            return Err(ToolkitError::ResponseTooLarge(MAX_RESPONSE_SIZE));
        }

        body_bytes.extend_from_slice(&chunk);
    }

    Ok(body_bytes)
}

/// Create the `http_request` tool with a fresh client
#[must_use]
pub fn http_request_tool() -> (Tool, ToolExecutorFn) {
    http_request_tool_with_client(Client::new())
}

/// Create the `http_request` tool around an existing client
#[must_use]
pub fn http_request_tool_with_client(client: Client) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "http_request".to_string(),
        description: "Make HTTP requests to APIs and web services. Returns status, headers \
                      and content (parsed JSON when possible)."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Target URL (must be http:// or https://)"
                },
                "method": {
                    "type": "string",
                    "description": "HTTP method (GET, POST, PUT, DELETE, etc.)",
                    "default": "GET"
                },
                "headers": {
                    "type": "object",
                    "description": "HTTP headers to include",
                    "additionalProperties": {"type": "string"}
                },
                "data": {
                    "description": "Request body: a string sent verbatim, or an object sent as JSON",
                    "oneOf": [{"type": "string"}, {"type": "object"}]
                },
                "params": {
                    "type": "object",
                    "description": "URL query parameters",
                    "additionalProperties": {"type": "string"}
                },
                "timeout": {
                    "type": "integer",
                    "description": "Request timeout in seconds",
                    "default": DEFAULT_TIMEOUT_SECS
                }
            },
            "required": ["url"]
        }),
    };

    let executor = Arc::new(move |input: String| {
        let client = client.clone();
        Box::pin(async move {
            let request: HttpRequest =
                serde_json::from_str(&input).map_err(|e| ToolError::invalid_input(&e))?;

            let response = execute_http_request(&client, &request).await;
            crate::to_json(&response)
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}
