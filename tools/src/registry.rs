//! Tool registry for dynamic tool management
//!
//! The registry provides:
//! - Dynamic tool registration
//! - Thread-safe tool storage
//! - Tool execution by name
//! - Tool listing and introspection

use crate::config::ToolsConfig;
use crate::deps::{
    NodeDependencyChecker, PythonDependencyChecker, SystemCommandRunner,
    node::check_typescript_dependencies_tool, python::check_python_dependencies_tool,
};
use crate::fetch::{UrlFetcher, fetch_url_tool_with};
use crate::http::http_request_tool_with_client;
use crate::search::{SearchClient, TavilyClient, WebSearch, web_search_tool};
use agent_toolkit_core::{Tool, ToolError, ToolExecutorFn, ToolResult};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Entry = (Tool, ToolExecutorFn);

/// Thread-safe tool registry
///
/// ## Example
///
/// ```ignore
/// use agent_toolkit_tools::{ToolRegistry, ToolsConfig};
///
/// let registry = ToolRegistry::from_config(&ToolsConfig::from_env());
/// let result = registry
///     .execute("fetch_url", r#"{"url": "https://example.com"}"#.to_string())
///     .await;
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Entry>>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every toolkit tool, wired from `config`
    ///
    /// The search client is built here, once; without a credential the
    /// `web_search` tool is still registered and answers with an error shape.
    #[must_use]
    pub fn from_config(config: &ToolsConfig) -> Self {
        let registry = Self::new();
        let client = reqwest::Client::new();

        registry.register_pair(http_request_tool_with_client(client.clone()));

        let fetcher = UrlFetcher::new(client.clone()).with_user_agent(&config.user_agent);
        registry.register_pair(fetch_url_tool_with(fetcher));

        let search = WebSearch::with_credential(config.tavily_api_key.as_deref(), |key| {
            let tavily = TavilyClient::new(key)
                .with_client(client.clone())
                .with_api_url(&config.tavily_api_url);
            Arc::new(tavily) as Arc<dyn SearchClient>
        });
        registry.register_pair(web_search_tool(search));

        let runner = Arc::new(SystemCommandRunner);
        let python = PythonDependencyChecker::new(runner.clone())
            .with_program(&config.pip_program)
            .with_working_dir(&config.working_dir);
        registry.register_pair(check_python_dependencies_tool(python));

        let node = NodeDependencyChecker::new(runner)
            .with_program(&config.npm_program)
            .with_working_dir(&config.working_dir);
        registry.register_pair(check_typescript_dependencies_tool(node));

        tracing::debug!(tools = ?registry.list_tools(), "Tool registry ready");
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a tool with its executor
    ///
    /// If a tool with the same name already exists, it will be replaced
    /// and this method returns `true`. Otherwise, returns `false`.
    pub fn register(&self, tool: Tool, executor: ToolExecutorFn) -> bool {
        self.write()
            .insert(tool.name.clone(), (tool, executor))
            .is_some()
    }

    /// Register the pair returned by a `*_tool` constructor
    pub fn register_pair(&self, (tool, executor): Entry) -> bool {
        self.register(tool, executor)
    }

    /// Execute a tool by name
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the tool is not found or rejects its input
    pub async fn execute(&self, name: &str, input: String) -> ToolResult {
        // Get executor (release lock quickly)
        let executor = self.read().get(name).map(|(_, executor)| executor.clone());

        match executor {
            Some(executor) => executor(input).await,
            None => Err(ToolError::new(format!("Tool not found: {name}"))),
        }
    }

    /// Registered tool names, sorted alphabetically
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// All tool definitions sorted by name (for passing to an LLM API)
    #[must_use]
    pub fn get_tools(&self) -> Vec<Tool> {
        let mut tool_list: Vec<Tool> = self.read().values().map(|(tool, _)| tool.clone()).collect();
        tool_list.sort_by(|a, b| a.name.cmp(&b.name));
        tool_list
    }

    /// Get a specific tool by name
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        self.read().get(name).map(|(tool, _)| tool.clone())
    }

    /// Remove a tool; returns whether it existed
    pub fn unregister(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Number of registered tools
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().len()
    }
}
