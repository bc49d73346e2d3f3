//! # Agent Toolkit Core
//!
//! Tool definition types shared between agent hosts and tool crates.
//!
//! ## Example
//!
//! ```ignore
//! use agent_toolkit_core::{Tool, ToolExecutorFn};
//!
//! fn register(tool: Tool, executor: ToolExecutorFn) {
//!     // Hand the definition to the model, keep the executor for tool calls
//! }
//! ```

pub mod tool;

pub use tool::{Tool, ToolError, ToolExecutor, ToolExecutorFn, ToolFuture, ToolResult, executor_fn};
