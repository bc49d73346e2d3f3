//! Tool Showcase
//!
//! Runs every toolkit tool once through the registry:
//! - `http_request` against a public JSON API
//! - `fetch_url` with HTML→Markdown conversion
//! - `web_search` (set `TAVILY_API_KEY` to enable it)
//! - `check_python_dependencies` / `check_typescript_dependencies` in the
//!   current directory
//!
//! ```sh
//! RUST_LOG=debug cargo run -p tool-showcase
//! ```

use agent_toolkit_tools::{ToolRegistry, ToolsConfig};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agent_toolkit_tools=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ToolsConfig::from_env();
    let registry = ToolRegistry::from_config(&config);
    tracing::info!(tools = ?registry.list_tools(), "Registered tools");

    let demos = [
        (
            "http_request",
            json!({"url": "https://httpbin.org/get", "params": {"demo": "true"}}),
        ),
        ("fetch_url", json!({"url": "https://example.com"})),
        (
            "web_search",
            json!({"query": "Rust async runtimes comparison", "max_results": 3}),
        ),
        ("check_python_dependencies", json!({})),
        ("check_typescript_dependencies", json!({})),
    ];

    for (name, args) in demos {
        println!("=== {name} ===");
        let output = registry.execute(name, args.to_string()).await?;
        println!("{}\n", pretty_json(&output));
    }

    Ok(())
}

/// Pretty-print JSON string
fn pretty_json(json_str: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(json_str) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| json_str.to_string()),
        Err(_) => json_str.to_string(),
    }
}
