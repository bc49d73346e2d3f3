//! Dependency staleness tools
//!
//! Two checkers share the same report shape:
//! - `check_python_dependencies`: asks `pip` which installed packages are outdated
//! - `check_typescript_dependencies`: asks `npm` which packages in a project are outdated
//!
//! Manifests are only checked for existence; staleness data comes entirely
//! from the package manager.
//!
//! ```json
//! {
//!   "dependencies": [{"name": "requests", "current": "2.28.0", "latest": "2.31.0"}],
//!   "outdated": ["requests"],
//!   "upgrades": ["pip install requests==2.31.0"],
//!   "source": "requirements.txt"
//! }
//! ```

pub mod node;
pub mod python;
pub mod runner;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use node::{NodeDependencyChecker, NodeDependencyRequest};
pub use python::{PythonDependencyChecker, PythonDependencyRequest};
pub use runner::{CommandOutput, CommandRunner, SystemCommandRunner};

/// Message included when nothing is outdated
pub const UP_TO_DATE_MESSAGE: &str = "All dependencies are up to date!";

/// One outdated package
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyEntry {
    /// Package name
    pub name: String,
    /// Installed version
    pub current: String,
    /// Highest version allowed by the manifest (npm only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wanted: Option<String>,
    /// Latest published version
    pub latest: String,
}

/// Output of a dependency check
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyReport {
    /// Outdated packages with their versions
    pub dependencies: Vec<DependencyEntry>,
    /// Names of outdated packages
    pub outdated: Vec<String>,
    /// Suggested upgrade commands, one per outdated package
    pub upgrades: Vec<String>,
    /// Manifest the check was run for
    pub source: String,
    /// Set when nothing is outdated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DependencyReport {
    fn new(source: impl Into<String>) -> Self {
        Self {
            dependencies: Vec::new(),
            outdated: Vec::new(),
            upgrades: Vec::new(),
            source: source.into(),
            message: None,
        }
    }

    fn push(&mut self, entry: DependencyEntry, upgrade: String) {
        self.outdated.push(entry.name.clone());
        self.upgrades.push(upgrade);
        self.dependencies.push(entry);
    }

    fn finish(mut self) -> Self {
        if self.outdated.is_empty() {
            self.message = Some(UP_TO_DATE_MESSAGE.to_string());
        }
        self
    }
}

/// Resolve a manifest path against the checker's working directory
fn resolve(working_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::runner::{CommandOutput, CommandRunner};
    use crate::error::CommandError;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Canned outcome for every invocation
    pub(crate) enum Script {
        Output(CommandOutput),
        NotFound,
        Timeout,
    }

    /// Runner that replays a script and records invocations
    pub(crate) struct ScriptedRunner {
        script: Script,
        calls: AtomicU32,
        last: Mutex<Option<(String, Vec<String>, Option<PathBuf>, Duration)>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicU32::new(0),
                last: Mutex::new(None),
            }
        }

        pub(crate) fn output(code: i32, stdout: &str, stderr: &str) -> Self {
            Self::new(Script::Output(CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }))
        }

        pub(crate) fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        #[allow(clippy::expect_used)]
        pub(crate) fn last_call(&self) -> Option<(String, Vec<String>, Option<PathBuf>, Duration)> {
            self.last.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        #[allow(clippy::expect_used)]
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            cwd: Option<&Path>,
            timeout: Duration,
        ) -> Result<CommandOutput, CommandError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("lock") = Some((
                program.to_string(),
                args.iter().map(|a| (*a).to_string()).collect(),
                cwd.map(Path::to_path_buf),
                timeout,
            ));

            match &self.script {
                Script::Output(output) => Ok(output.clone()),
                Script::NotFound => Err(CommandError::NotFound {
                    program: program.to_string(),
                }),
                Script::Timeout => Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout,
                }),
            }
        }
    }
}
