//! External tool execution
//!
//! Every heavyweight computation (clustering, alignment, profile building,
//! search) is delegated to an external binary. Stages build a [`ToolCommand`]
//! and hand it to a [`CommandRunner`]; [`execute`] logs the outcome and turns
//! any failure into `None` so the stage can move on to the next unit of work.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

/// One external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: impl AsRef<Path>) -> Self {
        let arg = path.as_ref().display().to_string();
        self.arg(arg)
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Why an invocation produced no output
#[derive(Error, Debug)]
pub enum CommandFailure {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exited with {status}")]
    Exit { status: String, stderr: String },
}

impl CommandFailure {
    /// Captured standard error, if the process ran at all
    pub fn stderr(&self) -> &str {
        match self {
            CommandFailure::Spawn { .. } => "",
            CommandFailure::Exit { stderr, .. } => stderr,
        }
    }
}

/// Runs external commands synchronously from the caller's point of view
///
/// The production implementation is [`ProcessRunner`]; tests substitute a
/// recording fake to assert on argument construction.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion and return its standard output
    async fn run(&self, command: &ToolCommand) -> Result<String, CommandFailure>;
}

/// Runs commands as child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<String, CommandFailure> {
        let output = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|source| CommandFailure::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(CommandFailure::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

/// Run a command, log the outcome, and return its stdout or `None`
///
/// Never fails: a non-zero exit is logged with the command line and captured
/// stderr. Callers check for `None` and skip anything that depends on the
/// command's output. There is no retry.
pub async fn execute(runner: &dyn CommandRunner, command: &ToolCommand) -> Option<String> {
    match runner.run(command).await {
        Ok(stdout) => {
            info!(command = %command, "✅ Command succeeded");
            Some(stdout)
        },
        Err(failure) => {
            error!(
                command = %command,
                error = %failure,
                stderr = %failure.stderr().trim_end(),
                "❌ Command failed"
            );
            None
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_joins_args() {
        let cmd = ToolCommand::new("hmmsearch")
            .args(["--cpu", "4", "--noali"])
            .path_arg("/tmp/nuoa.hmm");
        assert_eq!(cmd.to_string(), "hmmsearch --cpu 4 --noali /tmp/nuoa.hmm");
    }

    #[tokio::test]
    async fn test_missing_binary_yields_none() {
        let cmd = ToolCommand::new("complexscan-definitely-not-a-binary").arg("--version");
        assert!(execute(&ProcessRunner, &cmd).await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_returns_stdout() {
        let cmd = ToolCommand::new("sh").args(["-c", "printf hello"]);
        assert_eq!(execute(&ProcessRunner, &cmd).await.as_deref(), Some("hello"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let cmd = ToolCommand::new("sh").args(["-c", "echo boom >&2; exit 3"]);
        let failure = ProcessRunner.run(&cmd).await.unwrap_err();
        assert_eq!(failure.stderr().trim(), "boom");
        assert!(execute(&ProcessRunner, &cmd).await.is_none());
    }
}
