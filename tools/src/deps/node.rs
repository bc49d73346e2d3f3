//! Node/TypeScript dependency checker (`npm outdated`)
//!
//! `npm outdated` exits with status 1 whenever it finds outdated packages, so
//! the exit status alone says nothing about failure here. Stdout decides:
//! JSON means a result, silence plus a non-zero exit means npm failed.

use super::runner::{CommandRunner, SystemCommandRunner};
use super::{DependencyEntry, DependencyReport, resolve};
use crate::error::{CommandError, ErrorReport, ToolkitError};
use agent_toolkit_core::{Tool, ToolError, ToolExecutor, ToolExecutorFn, ToolResult, executor_fn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Timeout for `npm outdated`
pub const NPM_TIMEOUT: Duration = Duration::from_secs(60);

const UNKNOWN_VERSION: &str = "N/A";

fn default_package_json_path() -> String {
    "package.json".to_string()
}

/// Arguments of the `check_typescript_dependencies` tool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeDependencyRequest {
    /// Path to package.json
    #[serde(default = "default_package_json_path")]
    pub package_json_path: String,
}

impl Default for NodeDependencyRequest {
    fn default() -> Self {
        Self {
            package_json_path: default_package_json_path(),
        }
    }
}

/// Versions npm reports for one package location
#[derive(Debug, Default, Deserialize)]
struct NpmPackage {
    current: Option<String>,
    wanted: Option<String>,
    latest: Option<String>,
}

/// Workspaces report a package once per location
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NpmOutdated {
    Many(Vec<NpmPackage>),
    One(NpmPackage),
}

impl NpmOutdated {
    fn into_first(self) -> NpmPackage {
        match self {
            Self::One(package) => package,
            Self::Many(packages) => packages.into_iter().next().unwrap_or_default(),
        }
    }
}

/// Checks a Node project for outdated packages
#[derive(Clone)]
pub struct NodeDependencyChecker {
    runner: Arc<dyn CommandRunner>,
    program: String,
    working_dir: PathBuf,
}

impl Default for NodeDependencyChecker {
    fn default() -> Self {
        Self::new(Arc::new(SystemCommandRunner))
    }
}

impl NodeDependencyChecker {
    /// Checker running `npm` with paths relative to the current directory
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            program: "npm".to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    /// Builder: Set the npm program
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Builder: Set base directory for manifest paths
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Report outdated packages of the project owning `package_json_path`
    ///
    /// # Errors
    ///
    /// Returns an `ErrorReport` when the manifest is missing, npm is missing
    /// or times out, or its output cannot be used
    pub async fn check(
        &self,
        request: &NodeDependencyRequest,
    ) -> Result<DependencyReport, ErrorReport> {
        tracing::debug!(package_json_path = %request.package_json_path, "Checking npm dependencies");

        self.try_check(request).await.map_err(|err| {
            tracing::warn!(error = %err, "npm dependency check failed");
            ErrorReport::new(self.describe_failure(&err)).with_path(&request.package_json_path)
        })
    }

    async fn try_check(
        &self,
        request: &NodeDependencyRequest,
    ) -> Result<DependencyReport, ToolkitError> {
        let manifest = resolve(&self.working_dir, &request.package_json_path);
        if !tokio::fs::try_exists(&manifest).await.unwrap_or(false) {
            return Err(ToolkitError::PackageJsonNotFound(
                request.package_json_path.clone(),
            ));
        }

        let project_dir = manifest
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let output = self
            .runner
            .run(&self.program, &["outdated", "--json"], Some(project_dir), NPM_TIMEOUT)
            .await?;

        let mut report = DependencyReport::new(request.package_json_path.clone());

        if output.stdout.trim().is_empty() {
            if output.success() {
                return Ok(report.finish());
            }
            return Err(ToolkitError::NoOutput {
                program: format!("{} outdated", self.program),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let packages: BTreeMap<String, NpmOutdated> = serde_json::from_str(&output.stdout)
            .map_err(|e| ToolkitError::MalformedOutput {
                program: format!("{} outdated", self.program),
                message: e.to_string(),
            })?;

        for (name, outdated) in packages {
            let package = outdated.into_first();
            let upgrade = format!(
                "npm install {name}@{}",
                package.latest.as_deref().unwrap_or("latest")
            );
            let version = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN_VERSION.to_string());
            report.push(
                DependencyEntry {
                    name,
                    current: version(package.current),
                    wanted: Some(version(package.wanted)),
                    latest: version(package.latest),
                },
                upgrade,
            );
        }

        Ok(report.finish())
    }

    fn describe_failure(&self, err: &ToolkitError) -> String {
        match err {
            ToolkitError::PackageJsonNotFound(_)
            | ToolkitError::NoOutput { .. }
            | ToolkitError::Command(CommandError::NotFound { .. }) => err.to_string(),
            ToolkitError::MalformedOutput { program, .. } => {
                format!("Failed to parse {program} output")
            }
            ToolkitError::Command(CommandError::Timeout { timeout, .. }) => format!(
                "{} command timed out after {} seconds",
                self.program,
                timeout.as_secs()
            ),
            other => format!("Error checking TypeScript dependencies: {other}"),
        }
    }
}

impl ToolExecutor for NodeDependencyChecker {
    async fn execute(&self, input: &str) -> ToolResult {
        let request: NodeDependencyRequest =
            serde_json::from_str(input).map_err(|e| ToolError::invalid_input(&e))?;

        match self.check(&request).await {
            Ok(report) => crate::to_json(&report),
            Err(report) => crate::to_json(&report),
        }
    }
}

/// Create the `check_typescript_dependencies` tool
#[must_use]
pub fn check_typescript_dependencies_tool(checker: NodeDependencyChecker) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "check_typescript_dependencies".to_string(),
        description: "Check TypeScript/Node.js dependencies from package.json for available \
                      upgrades using npm."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "package_json_path": {
                    "type": "string",
                    "description": "Path to package.json",
                    "default": "package.json"
                }
            }
        }),
    };

    (tool, executor_fn(checker))
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::*;
    use crate::deps::UP_TO_DATE_MESSAGE;
    use crate::deps::testing::{Script, ScriptedRunner};

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("package.json"), r#"{"name": "demo"}"#)
            .expect("write manifest");
        dir
    }

    fn checker(runner: &Arc<ScriptedRunner>, dir: &tempfile::TempDir) -> NodeDependencyChecker {
        NodeDependencyChecker::new(runner.clone()).with_working_dir(dir.path())
    }

    #[test]
    fn test_check_typescript_dependencies_tool_schema() {
        let (tool, _executor) = check_typescript_dependencies_tool(NodeDependencyChecker::default());
        assert_eq!(tool.name, "check_typescript_dependencies");
        assert!(tool.input_schema.is_object());
    }

    #[tokio::test]
    async fn test_missing_manifest_skips_subprocess() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = Arc::new(ScriptedRunner::output(0, "{}", ""));

        let report = checker(&runner, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect_err("should fail");

        assert_eq!(report.error, "No package.json found at: package.json");
        assert_eq!(runner.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_zero_exit_with_json_is_a_result() {
        let dir = project();
        let stdout = r#"{"typescript": {"current": "4.9.0", "wanted": "4.9.5", "latest": "5.3.0", "location": "node_modules/typescript"}}"#;
        let runner = Arc::new(ScriptedRunner::output(1, stdout, ""));

        let report = checker(&runner, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect("should succeed");

        assert_eq!(report.outdated, vec!["typescript"]);
        assert_eq!(report.upgrades, vec!["npm install typescript@5.3.0"]);
        assert_eq!(
            report.dependencies,
            vec![DependencyEntry {
                name: "typescript".to_string(),
                current: "4.9.0".to_string(),
                wanted: Some("4.9.5".to_string()),
                latest: "5.3.0".to_string(),
            }]
        );
        assert_eq!(report.source, "package.json");
        assert!(report.message.is_none());

        let (program, args, cwd, timeout) = runner.last_call().expect("called");
        assert_eq!(program, "npm");
        assert_eq!(args, vec!["outdated", "--json"]);
        assert_eq!(cwd.as_deref(), Some(dir.path()));
        assert_eq!(timeout, NPM_TIMEOUT);
    }

    #[tokio::test]
    async fn test_missing_versions_and_workspace_arrays() {
        let dir = project();
        let stdout = r#"{
            "left-pad": {"wanted": "1.3.0"},
            "react": [
                {"current": "17.0.2", "wanted": "17.0.2", "latest": "18.2.0", "location": "a"},
                {"current": "16.0.0", "wanted": "16.14.0", "latest": "18.2.0", "location": "b"}
            ]
        }"#;
        let runner = Arc::new(ScriptedRunner::output(1, stdout, ""));

        let report = checker(&runner, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect("should succeed");

        assert_eq!(report.outdated, vec!["left-pad", "react"]);
        assert_eq!(report.dependencies[0].current, "N/A");
        assert_eq!(report.dependencies[0].latest, "N/A");
        assert_eq!(report.dependencies[1].current, "17.0.2");
        assert_eq!(
            report.upgrades,
            vec!["npm install left-pad@latest", "npm install react@18.2.0"]
        );
    }

    #[tokio::test]
    async fn test_empty_object_is_up_to_date() {
        let dir = project();
        let runner = Arc::new(ScriptedRunner::output(0, "{}\n", ""));

        let report = checker(&runner, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect("should succeed");

        assert!(report.outdated.is_empty());
        assert_eq!(report.message.as_deref(), Some(UP_TO_DATE_MESSAGE));
    }

    #[tokio::test]
    async fn test_silent_failure_is_an_error() {
        let dir = project();
        let runner = Arc::new(ScriptedRunner::output(1, "", "npm ERR! code ENOLOCK\n"));

        let report = checker(&runner, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect_err("should fail");

        assert_eq!(
            report.error,
            "npm outdated produced no output: npm ERR! code ENOLOCK"
        );
    }

    #[tokio::test]
    async fn test_malformed_output_is_an_error() {
        let dir = project();
        let runner = Arc::new(ScriptedRunner::output(1, "npm WARN something", ""));

        let report = checker(&runner, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect_err("should fail");

        assert_eq!(report.error, "Failed to parse npm outdated output");
        assert_eq!(report.path.as_deref(), Some("package.json"));
    }

    #[tokio::test]
    async fn test_missing_npm_and_timeout_are_reported() {
        let dir = project();

        let missing = Arc::new(ScriptedRunner::new(Script::NotFound));
        let report = checker(&missing, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect_err("should fail");
        assert_eq!(report.error, "npm is not installed or not in PATH");

        let slow = Arc::new(ScriptedRunner::new(Script::Timeout));
        let report = checker(&slow, &dir)
            .check(&NodeDependencyRequest::default())
            .await
            .expect_err("should fail");
        assert_eq!(report.error, "npm command timed out after 60 seconds");
    }

    #[tokio::test]
    async fn test_manifest_in_subdirectory_runs_there() {
        let dir = tempfile::tempdir().expect("tempdir");
        let web = dir.path().join("web");
        std::fs::create_dir(&web).expect("mkdir");
        std::fs::write(web.join("package.json"), "{}").expect("write manifest");
        let runner = Arc::new(ScriptedRunner::output(0, "{}", ""));

        let request = NodeDependencyRequest {
            package_json_path: "web/package.json".to_string(),
        };
        let report = checker(&runner, &dir).check(&request).await.expect("should succeed");

        assert_eq!(report.source, "web/package.json");
        let (_, _, cwd, _) = runner.last_call().expect("called");
        assert_eq!(cwd, Some(web));
    }
}
