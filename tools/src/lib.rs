//! Tools for LLM-driven CLI agents
//!
//! Each tool is a stateless adapter around an external system:
//!
//! - `http`: generic HTTP requests (`http_request`)
//! - `search`: web search through Tavily (`web_search`)
//! - `fetch`: URL fetch with HTML→Markdown conversion (`fetch_url`)
//! - `deps`: dependency staleness via pip and npm
//!   (`check_python_dependencies`, `check_typescript_dependencies`)
//!
//! Supporting modules:
//!
//! - `config`: environment-based configuration
//! - `error`: typed errors and the error-shaped tool output
//! - `markdown`: HTML→Markdown conversion
//! - `registry`: tool registry for dynamic tool management
//!
//! ## Failures are data
//!
//! An adapter never fails its caller. Network errors, timeouts, missing
//! credentials, missing manifests and broken package managers all come back
//! as JSON with an `error` field (or, for `http_request`, `success: false`).
//! `ToolError` is reserved for arguments the tool cannot decode.

pub mod config;
pub mod deps;
pub mod error;
pub mod fetch;
pub mod http;
pub mod markdown;
pub mod registry;
pub mod search;

pub use agent_toolkit_core::{Tool, ToolError, ToolExecutorFn, ToolResult};

// Re-export commonly used types
pub use config::ToolsConfig;
pub use deps::{DependencyEntry, DependencyReport, NodeDependencyChecker, PythonDependencyChecker};
pub use error::{ErrorReport, ToolkitError};
pub use fetch::{FetchRequest, FetchedPage, UrlFetcher, fetch_url};
pub use http::{HttpRequest, HttpResponse, RequestBody, execute_http_request};
pub use registry::ToolRegistry;
pub use search::{SearchClient, SearchRequest, SearchTopic, TavilyClient, WebSearch};

/// Serialize a tool output
fn to_json<T: serde::Serialize>(value: &T) -> ToolResult {
    serde_json::to_string(value)
        .map_err(|e| ToolError::new(format!("Failed to serialize tool output: {e}")))
}
