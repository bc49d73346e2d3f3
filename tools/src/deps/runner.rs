//! Subprocess execution for package manager commands

use crate::error::CommandError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished process
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with code 0
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Runs external programs with captured output and a wall-clock timeout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, optionally inside `cwd`
    ///
    /// A non-zero exit is not an error here; callers decide what it means.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the program cannot be found or spawned, or
    /// does not finish within `timeout`
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

/// Runs programs as real child processes
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!(program, ?args, ?cwd, "Spawning command");

        let child = command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => CommandError::NotFound {
                program: program.to_string(),
            },
            _ => CommandError::Io {
                program: program.to_string(),
                message: e.to_string(),
            },
        })?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| CommandError::Timeout {
                program: program.to_string(),
                timeout,
            })?
            .map_err(|e| CommandError::Io {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
