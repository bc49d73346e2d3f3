//! End-to-end checks of the tool contracts through the registry
//!
//! Every call goes through the JSON executor boundary the way an agent host
//! would use it.

#![allow(clippy::expect_used)] // Test code can use expect

use agent_toolkit_tools::{ToolRegistry, ToolsConfig};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn call(registry: &ToolRegistry, tool: &str, args: Value) -> Value {
    let output = registry
        .execute(tool, args.to_string())
        .await
        .expect("tool should answer with data");
    serde_json::from_str(&output).expect("valid JSON")
}

#[tokio::test]
async fn http_request_success_matches_status() {
    let server = MockServer::start().await;
    for status in [200_u16, 404, 500] {
        Mock::given(method("GET"))
            .and(path(format!("/status/{status}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"status": status})))
            .mount(&server)
            .await;
    }
    let registry = ToolRegistry::from_config(&ToolsConfig::default());

    for status in [200_u16, 404, 500] {
        let value = call(
            &registry,
            "http_request",
            json!({"url": format!("{}/status/{status}", server.uri()), "method": "get"}),
        )
        .await;

        assert_eq!(value["status_code"], status);
        assert_eq!(value["success"], status < 400);
        assert_eq!(value["content"]["status"], status);
    }
}

#[tokio::test]
async fn http_request_timeout_is_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let registry = ToolRegistry::from_config(&ToolsConfig::default());

    let value = call(
        &registry,
        "http_request",
        json!({"url": server.uri(), "timeout": 1}),
    )
    .await;

    assert_eq!(value["success"], false);
    assert_eq!(value["status_code"], 0);
    assert_eq!(value["headers"], json!({}));
}

#[tokio::test]
async fn fetch_url_produces_markdown_and_length() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<h1>Weekly Update</h1><p>Everything shipped on time.</p>\
             <a href=\"https://example.com/more\">More</a>",
        ))
        .mount(&server)
        .await;
    let registry = ToolRegistry::from_config(&ToolsConfig::default());

    let value = call(
        &registry,
        "fetch_url",
        json!({"url": format!("{}/article", server.uri())}),
    )
    .await;

    let markdown = value["markdown_content"].as_str().expect("markdown");
    assert!(markdown.contains("# Weekly Update"));
    assert!(markdown.contains("Everything shipped on time."));
    assert!(markdown.contains("[More](https://example.com/more)"));
    assert_eq!(value["content_length"], markdown.chars().count());
    assert_eq!(value["status_code"], 200);
}

#[tokio::test]
async fn web_search_against_tavily_mock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "rust",
            "results": [{
                "title": "Rust",
                "url": "https://www.rust-lang.org/",
                "content": "Reliable and efficient software.",
                "score": 0.9
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = ToolsConfig::default()
        .with_tavily_api_key("tvly-test")
        .with_tavily_api_url(server.uri());
    let registry = ToolRegistry::from_config(&config);

    let value = call(&registry, "web_search", json!({"query": "rust", "topic": "news"})).await;

    assert_eq!(value["results"][0]["title"], "Rust");
    assert!(value.get("error").is_none());
}

#[tokio::test]
async fn web_search_rejects_unknown_topic() {
    let registry = ToolRegistry::from_config(&ToolsConfig::default());

    let result = registry
        .execute("web_search", json!({"query": "q", "topic": "sports"}).to_string())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn python_check_without_manifests_names_both_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ToolsConfig::default()
        .with_working_dir(dir.path())
        .with_programs("definitely-not-pip-7f3a", "definitely-not-npm-7f3a");
    let registry = ToolRegistry::from_config(&config);

    let value = call(&registry, "check_python_dependencies", json!({})).await;

    assert_eq!(
        value["error"],
        "No dependency file found. Checked: requirements.txt, pyproject.toml"
    );
}

#[cfg(unix)]
mod with_fake_package_managers {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let script = dir.join(name);
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut permissions = std::fs::metadata(&script).expect("metadata").permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&script, permissions).expect("chmod");
        script
    }

    #[tokio::test]
    async fn npm_non_zero_exit_with_json_lists_outdated() {
        let bin = tempfile::tempdir().expect("tempdir");
        let project = tempfile::tempdir().expect("tempdir");
        std::fs::write(project.path().join("package.json"), "{}").expect("write manifest");

        let npm = script(
            bin.path(),
            "npm",
            r#"echo '{"eslint": {"current": "8.0.0", "wanted": "8.57.0", "latest": "9.1.0"}}'
exit 1"#,
        );
        let config = ToolsConfig::default()
            .with_working_dir(project.path())
            .with_programs("pip", npm.to_string_lossy());
        let registry = ToolRegistry::from_config(&config);

        let value = call(&registry, "check_typescript_dependencies", json!({})).await;

        assert_eq!(value["outdated"], json!(["eslint"]));
        assert_eq!(value["upgrades"], json!(["npm install eslint@9.1.0"]));
        assert_eq!(value["dependencies"][0]["wanted"], "8.57.0");
        assert_eq!(value["source"], "package.json");
    }

    #[tokio::test]
    async fn pip_report_is_idempotent() {
        let bin = tempfile::tempdir().expect("tempdir");
        let project = tempfile::tempdir().expect("tempdir");
        std::fs::write(project.path().join("requirements.txt"), "requests\n")
            .expect("write manifest");

        let pip = script(
            bin.path(),
            "pip",
            r#"echo '[{"name": "requests", "version": "2.28.0", "latest_version": "2.31.0"}]'"#,
        );
        let config = ToolsConfig::default()
            .with_working_dir(project.path())
            .with_programs(pip.to_string_lossy(), "npm");
        let registry = ToolRegistry::from_config(&config);

        let first = call(&registry, "check_python_dependencies", json!({})).await;
        let second = call(&registry, "check_python_dependencies", json!({})).await;

        assert_eq!(first, second);
        assert_eq!(first["upgrades"], json!(["pip install requests==2.31.0"]));
        assert_eq!(first["source"], "requirements.txt");
    }
}
