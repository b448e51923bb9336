// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers for running external commands with a deadline.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Post-processing of raw fuzz output
pub const POSTPROCESS_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Container teardown after a run
pub const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2 * 60);
/// Tool availability checks (`docker version` and friends)
pub const TOOL_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from running an external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{description} could not be started: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{description} timed out after {}s", timeout.as_secs())]
    Timeout { description: String, timeout: Duration },

    #[error("{description} failed (exit {code}): {stderr}")]
    Failed { description: String, code: i32, stderr: String },
}

impl CommandError {
    /// True when the program itself could not be found
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Run a command to completion, killing it if it outlives `timeout`.
///
/// Stdin is closed; stdout and stderr are captured. A non-zero exit is not an
/// error here; callers decide via [`require_success`].
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, CommandError> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    let child = cmd
        .spawn()
        .map_err(|source| CommandError::Spawn { description: description.to_string(), source })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(CommandError::Spawn { description: description.to_string(), source }),
        // Dropping the wait future drops the child, which kills it (kill_on_drop)
        Err(_) => Err(CommandError::Timeout { description: description.to_string(), timeout }),
    }
}

/// Turn a non-zero exit status into [`CommandError::Failed`]
pub fn require_success(output: Output, description: &str) -> Result<Output, CommandError> {
    if output.status.success() {
        return Ok(output);
    }
    Err(CommandError::Failed {
        description: description.to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// A program plus fixed leading arguments, configured as one string
/// (e.g. `"python3 fuzz_plugin.py"`).
///
/// Split on whitespace; no shell quoting is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Parse a command line. Returns `None` for an empty or blank string.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build a tokio command in `cwd` with any `extra` arguments appended
    pub fn command(&self, cwd: &Path, extra: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(extra).current_dir(cwd);
        cmd
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
