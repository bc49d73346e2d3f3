//! Web search tool backed by the Tavily search API
//!
//! The search client is built once at startup and injected into [`WebSearch`].
//! Without a client (no `TAVILY_API_KEY`), every search returns an error
//! shape and no request is made:
//!
//! ```json
//! {"error": "TAVILY_API_KEY environment variable is not set. Web search is unavailable.", "query": "..."}
//! ```
//!
//! Successful searches return the provider payload untouched:
//!
//! ```json
//! {
//!   "query": "rust async runtimes",
//!   "results": [
//!     {"title": "...", "url": "https://...", "content": "excerpt", "score": 0.92}
//!   ]
//! }
//! ```

use crate::config::{DEFAULT_TAVILY_API_URL, TAVILY_API_KEY_VAR, TAVILY_API_URL_VAR};
use crate::error::{ErrorReport, SearchError, ToolkitError};
use agent_toolkit_core::{Tool, ToolError, ToolExecutor, ToolExecutorFn, ToolResult, executor_fn};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default number of results
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Upper bound on one search round trip
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

const fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

/// Search topic category
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    /// Most queries
    #[default]
    General,
    /// Current events
    News,
    /// Markets and companies
    Finance,
}

impl fmt::Display for SearchTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::News => write!(f, "news"),
            Self::Finance => write!(f, "finance"),
        }
    }
}

/// Arguments of the `web_search` tool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Maximum number of results
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Topic category
    #[serde(default)]
    pub topic: SearchTopic,
    /// Include full page content in each result
    #[serde(default)]
    pub include_raw_content: bool,
}

impl SearchRequest {
    /// Request with default settings
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            topic: SearchTopic::General,
            include_raw_content: false,
        }
    }

    /// Builder: Set topic
    #[must_use]
    pub const fn with_topic(mut self, topic: SearchTopic) -> Self {
        self.topic = topic;
        self
    }

    /// Builder: Set maximum number of results
    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

/// A web search provider
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a search and return the provider's JSON payload
    ///
    /// # Errors
    ///
    /// Returns `SearchError` for network failures, API errors, or parsing failures
    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError>;
}

/// Tavily search API client
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    api_url: String,
    timeout: Duration,
}

impl fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilyClient")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TavilyClient {
    /// Create a new client with API key from environment
    ///
    /// # Errors
    ///
    /// Returns `SearchError::MissingApiKey` if `TAVILY_API_KEY` is not set
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var(TAVILY_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SearchError::MissingApiKey(TAVILY_API_KEY_VAR))?;

        let client = Self::new(api_key);
        Ok(match std::env::var(TAVILY_API_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => client.with_api_url(url),
            _ => client,
        })
    }

    /// Create a new client with explicit API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: DEFAULT_TAVILY_API_URL.to_string(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    /// Builder: Share an existing HTTP client
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Builder: Set request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: Set base URL
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl TavilyClient {
    fn request_error(&self, err: &reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else {
            SearchError::RequestFailed(err.to_string())
        }
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
        let response = self
            .client
            .post(format!("{}/search", self.api_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({
                "query": request.query,
                "max_results": request.max_results,
                "topic": request.topic,
                "include_raw_content": request.include_raw_content,
            }))
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        match response.status() {
            StatusCode::OK => response
                .json::<Value>()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        SearchError::Timeout(self.timeout)
                    } else {
                        SearchError::ResponseParseFailed(e.to_string())
                    }
                }),
            StatusCode::TOO_MANY_REQUESTS => Err(SearchError::RateLimited),
            StatusCode::UNAUTHORIZED => Err(SearchError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SearchError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

/// The web search adapter
///
/// Holds the optional, read-only search client configured at startup.
#[derive(Clone, Default)]
pub struct WebSearch {
    client: Option<Arc<dyn SearchClient>>,
}

impl WebSearch {
    /// Adapter around an optional client
    #[must_use]
    pub fn new(client: Option<Arc<dyn SearchClient>>) -> Self {
        Self { client }
    }

    /// Adapter built from an optional credential
    ///
    /// `build` runs only when a credential is present.
    #[must_use]
    pub fn with_credential<F>(api_key: Option<&str>, build: F) -> Self
    where
        F: FnOnce(&str) -> Arc<dyn SearchClient>,
    {
        match api_key {
            Some(key) => Self::new(Some(build(key))),
            None => {
                tracing::info!(var = TAVILY_API_KEY_VAR, "Web search disabled");
                Self::new(None)
            }
        }
    }

    /// Adapter that reads `TAVILY_API_KEY` once
    #[must_use]
    pub fn from_env() -> Self {
        match TavilyClient::from_env() {
            Ok(client) => Self::new(Some(Arc::new(client))),
            Err(err) => {
                tracing::info!(error = %err, "Web search disabled");
                Self::new(None)
            }
        }
    }

    /// Whether a search client is configured
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Run a search
    ///
    /// # Errors
    ///
    /// Returns an `ErrorReport` carrying the query when no client is
    /// configured or the provider fails
    pub async fn search(&self, request: &SearchRequest) -> Result<Value, ErrorReport> {
        let Some(client) = &self.client else {
            let err = ToolkitError::MissingCredential(TAVILY_API_KEY_VAR);
            return Err(ErrorReport::new(err.to_string()).with_query(&request.query));
        };

        tracing::debug!(query = %request.query, topic = %request.topic, "Running web search");

        client.search(request).await.map_err(|err| {
            let err = ToolkitError::from(err);
            tracing::warn!(query = %request.query, error = %err, "Web search failed");
            ErrorReport::new(format!("Web search error: {err}")).with_query(&request.query)
        })
    }
}

impl ToolExecutor for WebSearch {
    async fn execute(&self, input: &str) -> ToolResult {
        let request: SearchRequest =
            serde_json::from_str(input).map_err(|e| ToolError::invalid_input(&e))?;

        match self.search(&request).await {
            Ok(payload) => crate::to_json(&payload),
            Err(report) => crate::to_json(&report),
        }
    }
}

/// Create the `web_search` tool
#[must_use]
pub fn web_search_tool(search: WebSearch) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "web_search".to_string(),
        description: "Search the web for current information and documentation. Returns \
                      results with title, url, content excerpt and relevance score. After \
                      searching, read the results and answer the user in natural language, \
                      citing sources by title or URL. Never show the raw JSON to the user."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query (be specific and detailed)"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "default": DEFAULT_MAX_RESULTS
                },
                "topic": {
                    "type": "string",
                    "enum": ["general", "news", "finance"],
                    "description": "Search topic: general for most queries, news for current events",
                    "default": "general"
                },
                "include_raw_content": {
                    "type": "boolean",
                    "description": "Include full page content (uses more tokens)",
                    "default": false
                }
            },
            "required": ["query"]
        }),
    };

    (tool, executor_fn(search))
}
