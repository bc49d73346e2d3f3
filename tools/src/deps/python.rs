//! Python dependency checker (`pip list --outdated`)

use super::runner::{CommandRunner, SystemCommandRunner};
use super::{DependencyEntry, DependencyReport, resolve};
use crate::error::{CommandError, ErrorReport, ToolkitError};
use agent_toolkit_core::{Tool, ToolError, ToolExecutor, ToolExecutorFn, ToolResult, executor_fn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Timeout for `pip list --outdated`
pub const PIP_TIMEOUT: Duration = Duration::from_secs(30);

/// Alternate manifest, preferred when present
pub const PYPROJECT_FILE: &str = "pyproject.toml";

fn default_requirements_path() -> String {
    "requirements.txt".to_string()
}

const fn default_check_pyproject() -> bool {
    true
}

/// Arguments of the `check_python_dependencies` tool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PythonDependencyRequest {
    /// Path to the requirements file
    #[serde(default = "default_requirements_path")]
    pub requirements_path: String,
    /// Prefer `pyproject.toml` when it exists
    #[serde(default = "default_check_pyproject")]
    pub check_pyproject: bool,
}

impl Default for PythonDependencyRequest {
    fn default() -> Self {
        Self {
            requirements_path: default_requirements_path(),
            check_pyproject: default_check_pyproject(),
        }
    }
}

/// One row of `pip list --outdated --format=json`
#[derive(Debug, Deserialize)]
struct PipOutdated {
    name: String,
    version: String,
    latest_version: String,
}

/// Checks installed Python packages against the index
#[derive(Clone)]
pub struct PythonDependencyChecker {
    runner: Arc<dyn CommandRunner>,
    program: String,
    working_dir: PathBuf,
}

impl Default for PythonDependencyChecker {
    fn default() -> Self {
        Self::new(Arc::new(SystemCommandRunner))
    }
}

impl PythonDependencyChecker {
    /// Checker running `pip` in the current directory
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            program: "pip".to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    /// Builder: Set the pip program
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

    /// Report outdated Python packages
    ///
    /// The manifest only determines the reported `source`; the package list
    /// always comes from pip's view of the installed environment.
    ///
    /// # Errors
    ///
    /// Returns an `ErrorReport` when no manifest exists, pip fails or times
    /// out, or its output cannot be parsed
    pub async fn check(
        &self,
        request: &PythonDependencyRequest,
    ) -> Result<DependencyReport, ErrorReport> {
        tracing::debug!(
            requirements_path = %request.requirements_path,
            check_pyproject = request.check_pyproject,
            "Checking Python dependencies"
        );

        self.try_check(request).await.map_err(|err| {
            tracing::warn!(error = %err, "Python dependency check failed");
            ErrorReport::new(describe_failure(&err)).with_path(&request.requirements_path)
        })
    }

    async fn try_check(
        &self,
        request: &PythonDependencyRequest,
    ) -> Result<DependencyReport, ToolkitError> {
        let source = self.select_source(request).await?;

        let output = self
            .runner
            .run(
                &self.program,
                &["list", "--outdated", "--format=json"],
                Some(self.working_dir.as_path()),
                PIP_TIMEOUT,
            )
            .await?;

        if !output.success() {
            return Err(ToolkitError::CommandFailed {
                program: self.program.clone(),
                code: output.code,
                stderr: output.stderr,
            });
        }

        let packages: Vec<PipOutdated> =
            serde_json::from_str(&output.stdout).map_err(|e| ToolkitError::MalformedOutput {
                program: format!("{} list", self.program),
                message: e.to_string(),
            })?;

        let mut report = DependencyReport::new(source);
        for package in packages {
            let upgrade = format!("pip install {}=={}", package.name, package.latest_version);
            report.push(
                DependencyEntry {
                    name: package.name,
                    current: package.version,
                    wanted: None,
                    latest: package.latest_version,
                },
                upgrade,
            );
        }

        Ok(report.finish())
    }

    async fn select_source(&self, request: &PythonDependencyRequest) -> Result<String, ToolkitError> {
        let pyproject = resolve(&self.working_dir, PYPROJECT_FILE);
        if request.check_pyproject && exists(&pyproject).await {
            return Ok(PYPROJECT_FILE.to_string());
        }

        let requirements = resolve(&self.working_dir, &request.requirements_path);
        if exists(&requirements).await {
            return Ok(request.requirements_path.clone());
        }

        Err(ToolkitError::NoDependencyFile {
            checked: vec![request.requirements_path.clone(), PYPROJECT_FILE.to_string()],
        })
    }
}

async fn exists(path: &std::path::Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn describe_failure(err: &ToolkitError) -> String {
    match err {
        ToolkitError::NoDependencyFile { .. } => err.to_string(),
        ToolkitError::CommandFailed { stderr, .. } => {
            format!("Failed to check dependencies: {stderr}")
        }
        ToolkitError::Command(CommandError::Timeout { timeout, .. }) => {
            format!("Command timed out after {} seconds", timeout.as_secs())
        }
        other => format!("Error checking Python dependencies: {other}"),
    }
}

impl ToolExecutor for PythonDependencyChecker {
    async fn execute(&self, input: &str) -> ToolResult {
        let request: PythonDependencyRequest =
            serde_json::from_str(input).map_err(|e| ToolError::invalid_input(&e))?;

        match self.check(&request).await {
            Ok(report) => crate::to_json(&report),
            Err(report) => crate::to_json(&report),
        }
    }
}

/// Create the `check_python_dependencies` tool
#[must_use]
pub fn check_python_dependencies_tool(checker: PythonDependencyChecker) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "check_python_dependencies".to_string(),
        description: "Check Python dependencies for available upgrades using pip. Reports \
                      outdated packages and suggested upgrade commands."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "requirements_path": {
                    "type": "string",
                    "description": "Path to requirements.txt",
                    "default": "requirements.txt"
                },
                "check_pyproject": {
                    "type": "boolean",
                    "description": "Use pyproject.toml as the source when it exists",
                    "default": true
                }
            }
        }),
    };

    (tool, executor_fn(checker))
}
