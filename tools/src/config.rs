//! Toolkit configuration
//!
//! All settings come from environment variables and all of them are optional:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | `TAVILY_API_KEY` | unset | Web search credential; search is unavailable without it |
//! | `TAVILY_API_URL` | `https://api.tavily.com` | Web search base URL |
//! | `AGENT_TOOLKIT_PIP` | `pip` | Python package manager program |
//! | `AGENT_TOOLKIT_NPM` | `npm` | Node package manager program |
//! | `AGENT_TOOLKIT_WORKDIR` | `.` | Base directory for relative manifest paths |

use std::path::PathBuf;

/// Environment variable holding the search credential
pub const TAVILY_API_KEY_VAR: &str = "TAVILY_API_KEY";

/// Environment variable overriding the search base URL
pub const TAVILY_API_URL_VAR: &str = "TAVILY_API_URL";

/// Default search base URL
pub const DEFAULT_TAVILY_API_URL: &str = "https://api.tavily.com";

/// User agent sent by the URL fetch tool
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; AgentToolkit/1.0)";

/// Settings shared by the toolkit's tools
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolsConfig {
    /// Search credential; `None` puts web search in degraded mode
    pub tavily_api_key: Option<String>,
    /// Search base URL
    pub tavily_api_url: String,
    /// Python package manager program
    pub pip_program: String,
    /// Node package manager program
    pub npm_program: String,
    /// Base directory for relative manifest paths
    pub working_dir: PathBuf,
    /// User agent for URL fetches
    pub user_agent: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            tavily_api_url: DEFAULT_TAVILY_API_URL.to_string(),
            pip_program: "pip".to_string(),
            npm_program: "npm".to_string(),
            working_dir: PathBuf::from("."),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ToolsConfig {
    /// Load configuration from the process environment
    ///
    /// Missing or empty variables fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            tavily_api_key: get(TAVILY_API_KEY_VAR),
            tavily_api_url: get(TAVILY_API_URL_VAR).unwrap_or(defaults.tavily_api_url),
            pip_program: get("AGENT_TOOLKIT_PIP").unwrap_or(defaults.pip_program),
            npm_program: get("AGENT_TOOLKIT_NPM").unwrap_or(defaults.npm_program),
            working_dir: get("AGENT_TOOLKIT_WORKDIR").map_or(defaults.working_dir, PathBuf::from),
            user_agent: defaults.user_agent,
        }
    }

    /// Builder: Set search credential
    #[must_use]
    pub fn with_tavily_api_key(mut self, key: impl Into<String>) -> Self {
        self.tavily_api_key = Some(key.into());
        self
    }

    /// Builder: Set search base URL
    #[must_use]
    pub fn with_tavily_api_url(mut self, url: impl Into<String>) -> Self {
        self.tavily_api_url = url.into();
        self
    }

    /// Builder: Set base directory for manifest paths
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Builder: Set package manager programs
    #[must_use]
    pub fn with_programs(mut self, pip: impl Into<String>, npm: impl Into<String>) -> Self {
        self.pip_program = pip.into();
        self.npm_program = npm.into();
        self
    }
}
