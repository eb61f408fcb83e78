use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, RunletError};

/// Fixed path the user data directory is mounted at inside the container.
pub const CONTAINER_MOUNT_POINT: &str = "/data";

/// Exit status `docker run` uses for failures of the daemon or the run itself.
const DOCKER_RUN_FAILURE: i32 = 125;

/// Bind mount of a host directory into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMapping {
    pub host_path: PathBuf,
    pub bind: String,
    pub read_write: bool,
}

impl VolumeMapping {
    /// The single read-write mapping of the user data directory.
    pub fn user_data(host_path: PathBuf) -> Self {
        Self {
            host_path,
            bind: CONTAINER_MOUNT_POINT.to_string(),
            read_write: true,
        }
    }

    /// `host:bind:mode` as accepted by `docker run -v`.
    pub fn to_spec(&self) -> String {
        let mode = if self.read_write { "rw" } else { "ro" };
        format!("{}:{}:{}", self.host_path.display(), self.bind, mode)
    }
}

/// One short-lived container invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRun {
    pub image: String,
    /// Entry command as argv
    pub command: Vec<String>,
    pub volume: VolumeMapping,
    pub working_dir: String,
}

/// Client able to run a container to completion.
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Returns the backend name (e.g., "docker")
    fn name(&self) -> &str;

    /// Run the container, wait for it to exit and return its combined
    /// stdout and stderr. The buffer holds all of stdout followed by all of
    /// stderr; the two streams are not interleaved. A non-zero exit of the
    /// command is an error.
    async fn run(&self, spec: &ContainerRun) -> Result<Vec<u8>>;
}

/// Container client driving the `docker` command line.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_binary("docker")
    }

    /// Use a specific docker-compatible binary (e.g. `podman`).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments passed to the binary for `spec`.
    pub fn run_args(spec: &ContainerRun) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            // keep image pull progress out of the captured stderr
            "--quiet".to_string(),
            "-v".to_string(),
            spec.volume.to_spec(),
            "-w".to_string(),
            spec.working_dir.clone(),
            spec.image.clone(),
        ];
        args.extend(spec.command.iter().cloned());
        args
    }
}

#[async_trait]
impl ContainerClient for DockerCli {
    fn name(&self) -> &str {
        "docker"
    }

    async fn run(&self, spec: &ContainerRun) -> Result<Vec<u8>> {
        debug!(image = %spec.image, command = ?spec.command, "Starting container");

        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::run_args(spec));

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| {
            RunletError::ContainerRuntime(format!("Failed to execute {} run: {}", self.binary, e))
        })?;

        let exit_code = output.status.code().unwrap_or(1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            exit_code = exit_code,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "Container exited"
        );

        if exit_code == DOCKER_RUN_FAILURE {
            return Err(RunletError::ContainerRuntime(stderr.trim().to_string()));
        }
        if exit_code != 0 {
            return Err(RunletError::ContainerFailed { exit_code, stderr });
        }

        info!(image = %spec.image, "Container finished");

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run() -> ContainerRun {
        ContainerRun {
            image: "python:3.12-slim".to_string(),
            command: vec!["python3".to_string(), "_interpreter.current.py".to_string()],
            volume: VolumeMapping::user_data(PathBuf::from("/home/me/data")),
            working_dir: CONTAINER_MOUNT_POINT.to_string(),
        }
    }

    #[test]
    fn test_volume_spec() {
        let volume = VolumeMapping::user_data(PathBuf::from("/home/me/data"));
        assert_eq!(volume.to_spec(), "/home/me/data:/data:rw");
    }

    #[test]
    fn test_run_args() {
        assert_eq!(
            DockerCli::run_args(&sample_run()),
            vec![
                "run",
                "--rm",
                "--quiet",
                "-v",
                "/home/me/data:/data:rw",
                "-w",
                "/data",
                "python:3.12-slim",
                "python3",
                "_interpreter.current.py",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_passes_quiet_to_binary() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in binary that echoes its arguments back on stdout
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-docker");
        std::fs::write(&script, "#!/bin/sh\necho \"$@\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let client = DockerCli::with_binary(script.display().to_string());
        let output = client.run(&sample_run()).await.unwrap();
        let echoed = String::from_utf8(output).unwrap();

        assert!(echoed.starts_with("run --rm --quiet -v /home/me/data:/data:rw"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_runtime_error() {
        let client = DockerCli::with_binary("/nonexistent/docker-binary");
        let err = client.run(&sample_run()).await.unwrap_err();
        assert!(matches!(err, RunletError::ContainerRuntime(_)));
    }
}
