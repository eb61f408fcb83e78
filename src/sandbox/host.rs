use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, RunletError};
use crate::sandbox::CapturedOutput;

/// Runs shell commands directly on the host machine.
#[derive(Debug, Clone, Default)]
pub struct HostExecutor;

impl HostExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run `command` through the platform shell and wait for it to exit.
    ///
    /// The exit status is recorded but never treated as a failure; only a
    /// failure to spawn the shell is an error.
    pub async fn run(&self, command: &str) -> Result<CapturedOutput> {
        debug!(command = %command, "Executing command on host");

        let mut cmd = shell_command(command);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| RunletError::Spawn {
            command: command.to_string(),
            source: e,
        })?;

        let exit_code = output.status.code();

        debug!(
            exit_code = ?exit_code,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "Command completed (host)"
        );

        Ok(CapturedOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code,
        })
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_streams_captured_separately() {
        let output = HostExecutor::new()
            .run("printf out; printf err >&2")
            .await
            .unwrap();
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let output = HostExecutor::new().run("exit 3").await.unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }
}
