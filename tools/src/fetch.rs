//! URL fetch tool
//!
//! `fetch_url` downloads a page with a GET request and converts the HTML to
//! markdown:
//!
//! ```json
//! {
//!   "url": "https://example.com/after/redirects",
//!   "markdown_content": "# Page Title\n\nContent...",
//!   "status_code": 200,
//!   "content_length": 27
//! }
//! ```
//!
//! Failures (network, non-2xx status) come back as
//! `{"error": "Fetch URL error: ...", "url": "<requested url>"}`.

use crate::config::DEFAULT_USER_AGENT;
use crate::error::{ErrorReport, ToolkitError};
use crate::http::{DEFAULT_TIMEOUT_SECS, read_body, transport_error, validate_url};
use crate::markdown::html_to_markdown;
use agent_toolkit_core::{Tool, ToolError, ToolExecutorFn, ToolFuture};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Arguments of the `fetch_url` tool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchRequest {
    /// URL to fetch
    pub url: String,
    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl FetchRequest {
    /// Request with the default timeout
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Output of a successful fetch
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    /// Page converted to markdown
    pub markdown_content: String,
    /// HTTP status code
    pub status_code: u16,
    /// Number of characters in `markdown_content`
    pub content_length: usize,
}

impl FetchedPage {
    fn new(url: String, status_code: u16, markdown_content: String) -> Self {
        Self {
            url,
            content_length: markdown_content.chars().count(),
            markdown_content,
            status_code,
        }
    }
}

/// Fetches pages and converts them to markdown
#[derive(Clone, Debug)]
pub struct UrlFetcher {
    client: Client,
    user_agent: String,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl UrlFetcher {
    /// Fetcher with the default user agent
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Builder: Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch a URL and convert it to markdown
    ///
    /// # Errors
    ///
    /// Returns an `ErrorReport` carrying the requested URL when the request
    /// fails, times out, or the server answers with a non-success status
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, ErrorReport> {
        tracing::debug!(url = %request.url, "Fetching URL");

        self.try_fetch(request).await.map_err(|err| {
            tracing::warn!(url = %request.url, error = %err, "URL fetch failed");
            ErrorReport::new(format!("Fetch URL error: {err}")).with_url(&request.url)
        })
    }

    async fn try_fetch(&self, request: &FetchRequest) -> Result<FetchedPage, ToolkitError> {
        validate_url(&request.url)?;
        let timeout = Duration::from_secs(request.timeout);

        let response = self
            .client
            .get(&request.url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(&e, timeout))?;

        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            return Err(ToolkitError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = read_body(response, timeout).await?;
        let html = String::from_utf8_lossy(&body);
        let markdown = html_to_markdown(&html);

        Ok(FetchedPage::new(url, status.as_u16(), markdown))
    }
}

/// Fetch a URL with a default [`UrlFetcher`]
///
/// # Errors
///
/// See [`UrlFetcher::fetch`]
pub async fn fetch_url(client: &Client, request: &FetchRequest) -> Result<FetchedPage, ErrorReport> {
    UrlFetcher::new(client.clone()).fetch(request).await
}

/// Create the `fetch_url` tool with a default fetcher
#[must_use]
pub fn fetch_url_tool() -> (Tool, ToolExecutorFn) {
    fetch_url_tool_with(UrlFetcher::default())
}

/// Create the `fetch_url` tool around a configured fetcher
#[must_use]
pub fn fetch_url_tool_with(fetcher: UrlFetcher) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "fetch_url".to_string(),
        description: "Fetch content from a URL and convert HTML to markdown format. After \
                      fetching, summarize the relevant parts for the user in natural language. \
                      Never show the raw markdown unless the user asks for it."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch (must be a valid HTTP/HTTPS URL)"
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
        let fetcher = fetcher.clone();
        Box::pin(async move {
            let request: FetchRequest =
                serde_json::from_str(&input).map_err(|e| ToolError::invalid_input(&e))?;

            match fetcher.fetch(&request).await {
                Ok(page) => crate::to_json(&page),
                Err(report) => crate::to_json(&report),
            }
        }) as ToolFuture
    }) as ToolExecutorFn;

    (tool, executor)
}
