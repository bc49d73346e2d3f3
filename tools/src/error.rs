//! Error types for the toolkit adapters
//!
//! Adapters work internally with `Result<_, ToolkitError>` and render the
//! error as data at their boundary. `ErrorReport` is that rendering.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failures of a single adapter call
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// URL scheme is not http or https
    #[error("URL must start with http:// or https://, got: {0}")]
    InvalidUrl(String),

    /// HTTP method name is not a valid token
    #[error("Unsupported method: {0}")]
    InvalidMethod(String),

    /// Request or command did not finish in time
    #[error("timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// Network-level failure (DNS, connect, TLS, body read)
    #[error("{0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for url ({url})")]
    Status {
        /// HTTP status code
        status: u16,
        /// URL that produced the status
        url: String,
    },

    /// Response body exceeded the size cap
    #[error("Response too large (>{0} bytes)")]
    ResponseTooLarge(usize),

    /// Search credential was not configured
    #[error("{0} environment variable is not set. Web search is unavailable.")]
    MissingCredential(&'static str),

    /// Search provider failure
    #[error(transparent)]
    Search(#[from] SearchError),

    /// None of the candidate manifests exist
    #[error("No dependency file found. Checked: {}", .checked.join(", "))]
    NoDependencyFile {
        /// Paths that were checked, in order
        checked: Vec<String>,
    },

    /// The package manifest does not exist
    #[error("No package.json found at: {0}")]
    PackageJsonNotFound(String),

    /// Subprocess could not be run to completion
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Subprocess exited unsuccessfully
    #[error("{program} exited with status {code:?}: {stderr}")]
    CommandFailed {
        /// Program name
        program: String,
        /// Exit code (`None` when killed by a signal)
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Subprocess produced output that could not be decoded
    #[error("Failed to parse {program} output: {message}")]
    MalformedOutput {
        /// Program name
        program: String,
        /// Decoder error
        message: String,
    },

    /// Subprocess failed without writing anything to stdout
    #[error("{program} produced no output: {stderr}")]
    NoOutput {
        /// Program name
        program: String,
        /// Captured standard error
        stderr: String,
    },
}

/// Errors from a web search provider
#[derive(Debug, Error)]
pub enum SearchError {
    /// Missing API key environment variable
    #[error("Missing {0} environment variable")]
    MissingApiKey(&'static str),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Provider did not answer in time
    #[error("Request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// Rate limited - too many requests
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Unauthorized - invalid API key
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },
}

/// Errors from spawning and waiting on a subprocess
#[derive(Debug, Error)]
pub enum CommandError {
    /// Program is not installed or not on `PATH`
    #[error("{program} is not installed or not in PATH")]
    NotFound {
        /// Program name
        program: String,
    },

    /// Wall-clock timeout expired; the child was killed
    #[error("{program} timed out after {} seconds", .timeout.as_secs())]
    Timeout {
        /// Program name
        program: String,
        /// Timeout that expired
        timeout: Duration,
    },

    /// Any other I/O failure while spawning or collecting output
    #[error("failed to run {program}: {message}")]
    Io {
        /// Program name
        program: String,
        /// I/O error message
        message: String,
    },
}

/// Error-shaped tool output
///
/// Carries a human-readable `error` plus whichever input the caller needs to
/// correlate the failure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorReport {
    /// Human-readable error message
    pub error: String,
    /// URL of the failed request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Query of the failed search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Manifest path of the failed dependency check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorReport {
    /// Report with only a message
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            url: None,
            query: None,
            path: None,
        }
    }

    /// Attach the URL of the failed request
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach the query of the failed search
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Attach the manifest path of the failed check
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::*;

    #[test]
    fn test_no_dependency_file_names_every_path() {
        let err = ToolkitError::NoDependencyFile {
            checked: vec!["requirements.txt".to_string(), "pyproject.toml".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No dependency file found. Checked: requirements.txt, pyproject.toml"
        );
    }

    #[test]
    fn test_timeout_message_uses_seconds() {
        let err = ToolkitError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "timed out after 30 seconds");
    }

    #[test]
    fn test_search_timeout_renders_through_toolkit_error() {
        let err = ToolkitError::from(SearchError::Timeout(Duration::from_secs(30)));
        assert_eq!(err.to_string(), "Request timed out after 30 seconds");
    }

    #[test]
    fn test_error_report_skips_empty_context() {
        let report = ErrorReport::new("boom").with_query("rust");
        let value = serde_json::to_value(&report).expect("serializable");

        assert_eq!(value["error"], "boom");
        assert_eq!(value["query"], "rust");
        assert!(value.get("url").is_none());
        assert!(value.get("path").is_none());
    }
}
