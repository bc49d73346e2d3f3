//! Tool definitions and executor types
//!
//! A tool is a named capability an agent host can offer to a model:
//! - `Tool` describes it (name, description, JSON schema of its arguments)
//! - `ToolExecutorFn` runs it on a JSON argument string
//! - `ToolResult` carries the JSON output or a `ToolError`
//!
//! Executors receive raw JSON and return raw JSON so hosts never need to know
//! the concrete argument types of a tool.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Tool definition as advertised to a model
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// Tool name (used to identify which tool to call)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: serde_json::Value,
}

/// Result from tool execution
pub type ToolResult = Result<String, ToolError>;

/// Boxed future returned by a [`ToolExecutorFn`]
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Type-erased tool executor: JSON arguments in, JSON output out
pub type ToolExecutorFn = Arc<dyn Fn(String) -> ToolFuture + Send + Sync>;

/// Tool execution errors
///
/// Raised only when the host-side contract is broken (malformed arguments,
/// unknown tool). Failures of the underlying operation are reported as data
/// in the tool output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    /// Error message
    pub message: String,
}

impl ToolError {
    /// Create an error with the given message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error for arguments that could not be decoded
    #[must_use]
    pub fn invalid_input(err: &serde_json::Error) -> Self {
        Self::new(format!("Invalid input JSON: {err}"))
    }
}

/// Tool executor trait for implementing stateful tools
///
/// **Edition 2024**: Uses RPITIT (Return Position Impl Trait In Traits)
pub trait ToolExecutor: Send + Sync {
    /// Execute tool with JSON input string, return result or error
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the input cannot be handled by this tool
    fn execute(&self, input: &str) -> impl Future<Output = ToolResult> + Send;
}

/// Erase a [`ToolExecutor`] into a [`ToolExecutorFn`]
pub fn executor_fn<E>(executor: E) -> ToolExecutorFn
where
    E: ToolExecutor + 'static,
{
    let executor = Arc::new(executor);
    Arc::new(move |input: String| {
        let executor = Arc::clone(&executor);
        Box::pin(async move { executor.execute(&input).await }) as ToolFuture
    })
}
