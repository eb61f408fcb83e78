//! Code and command execution on the host or in a Docker sandbox.

mod request;
mod template;
mod workspace;

pub use request::{CommandRequest, ExecutionResult, Target, FILE_NOT_FOUND, NO_RESULT};
pub use template::CommandTemplate;
pub use workspace::{Workspace, CURRENT_FILE, INPUT_FILE};

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::types::RunletConfig;
use crate::config::ConfigHandle;
use crate::error::{Result, RunletError};
use crate::events::{RunnerEvents, StreamKind};
use crate::sandbox::{
    CapturedOutput, ContainerClient, ContainerRun, DockerCli, HostExecutor, VolumeMapping,
    CONTAINER_MOUNT_POINT,
};

/// Prefix for log notifications emitted while running in the sandbox.
const SANDBOX_LOG_PREFIX: &str = "[DOCKER]";

/// Executes code files, snippets and shell commands.
///
/// Configuration is read from the [`ConfigHandle`] at the start of every
/// call. Progress goes to the injected [`RunnerEvents`] listener; the
/// returned [`ExecutionResult`] is only produced once the process or
/// container has exited.
pub struct Runner {
    config: ConfigHandle,
    events: Arc<dyn RunnerEvents>,
    host: HostExecutor,
    containers: Arc<dyn ContainerClient>,
}

impl Runner {
    /// Create a runner that uses the `docker` CLI for sandboxed runs.
    pub fn new(config: ConfigHandle, events: Arc<dyn RunnerEvents>) -> Self {
        Self {
            config,
            events,
            host: HostExecutor::new(),
            containers: Arc::new(DockerCli::new()),
        }
    }

    /// Replace the container client.
    pub fn with_container_client(mut self, client: Arc<dyn ContainerClient>) -> Self {
        self.containers = client;
        self
    }

    /// Run a request on the target selected by the sandbox flag.
    ///
    /// Faults are forwarded to the error listener before being returned.
    pub async fn execute(&self, request: CommandRequest) -> Result<ExecutionResult> {
        let config = self.config.snapshot();
        let target = Target::from_sandbox_flag(config.sandbox.enabled);

        info!(kind = request.kind(), target = ?target, "Dispatching request");
        self.events
            .status(&format!("Executing {} ({:?})", request.kind(), target));

        let outcome = match &request {
            CommandRequest::RunCode { code, path, all } => {
                self.code(&config, code, target, path.as_deref(), *all).await
            }
            CommandRequest::RunFile { path } => self.code_file(&config, path, target).await,
            CommandRequest::RunShell { command } => {
                self.shell(&config, command, target).await
            }
        };

        match &outcome {
            Ok(_) => self.events.status("Finished"),
            Err(e) => self.events.error(e),
        }
        outcome
    }

    /// Run an existing code file through the command template.
    ///
    /// On the host a missing file yields a `File not found` result rather
    /// than an error. The sandbox performs no such check.
    pub async fn execute_code_file(&self, path: &str, target: Target) -> Result<ExecutionResult> {
        let config = self.config.snapshot();
        self.code_file(&config, path, target).await
    }

    /// Run `source`, either as a fresh snippet or as part of the whole
    /// transcript when `run_all` is set.
    pub async fn execute_code(
        &self,
        source: &str,
        target: Target,
        explicit_path: Option<&str>,
        run_all: bool,
    ) -> Result<ExecutionResult> {
        let config = self.config.snapshot();
        self.code(&config, source, target, explicit_path, run_all)
            .await
    }

    /// Run `command` verbatim, without the template or any file writes.
    pub async fn execute_shell_command(
        &self,
        command: &str,
        target: Target,
    ) -> Result<ExecutionResult> {
        let config = self.config.snapshot();
        self.shell(&config, command, target).await
    }

    async fn code_file(
        &self,
        config: &RunletConfig,
        path: &str,
        target: Target,
    ) -> Result<ExecutionResult> {
        let request = CommandRequest::RunFile {
            path: path.to_string(),
        };
        let workspace = Workspace::new(config.data_dir(), target);

        self.log(target, &format!("Executing file: {}", path));
        let resolved = workspace.resolve(path);

        let code = match target {
            Target::Host => {
                let is_file = tokio::fs::metadata(&resolved)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false);
                if !is_file {
                    debug!(path = %resolved, "Code file not found");
                    return Ok(ExecutionResult::file_not_found(request));
                }
                Some(tokio::fs::read_to_string(&resolved).await?)
            }
            Target::Sandbox => {
                let host_path = workspace.host_path(path);
                match tokio::fs::read_to_string(&host_path).await {
                    Ok(code) => Some(code),
                    Err(e) => {
                        debug!(path = %host_path.display(), error = %e, "Host copy not readable");
                        None
                    }
                }
            }
        };

        if let Some(code) = code {
            workspace.append_input(&code).await?;
            self.events.input(&code);
        }

        let command = CommandTemplate::new(config.runner.command_template.as_str()).format(&resolved);
        let result = self.run(config, target, &command).await?;
        Ok(ExecutionResult::new(request, result))
    }

    async fn code(
        &self,
        config: &RunletConfig,
        source: &str,
        target: Target,
        explicit_path: Option<&str>,
        run_all: bool,
    ) -> Result<ExecutionResult> {
        let request = CommandRequest::RunCode {
            code: source.to_string(),
            path: explicit_path.map(str::to_string),
            all: run_all,
        };
        let workspace = Workspace::new(config.data_dir(), target);

        let path = if run_all {
            workspace.resolve(INPUT_FILE)
        } else {
            let name = explicit_path.unwrap_or(CURRENT_FILE);
            self.log(target, &format!("Saving file: {}", name));
            workspace.write_snippet(Some(name), source).await?;
            workspace.resolve(name)
        };

        workspace.append_input(source).await?;
        self.events.input(source);

        self.log(target, &format!("Executing code: {}", source));
        let command = CommandTemplate::new(config.runner.command_template.as_str()).format(&path);
        let result = self.run(config, target, &command).await?;
        Ok(ExecutionResult::new(request, result))
    }

    async fn shell(
        &self,
        config: &RunletConfig,
        command: &str,
        target: Target,
    ) -> Result<ExecutionResult> {
        let request = CommandRequest::RunShell {
            command: command.to_string(),
        };

        self.log(target, &format!("Executing system command: {}", command));
        let result = self.run(config, target, command).await?;
        Ok(ExecutionResult::new(request, result))
    }

    async fn run(&self, config: &RunletConfig, target: Target, command: &str) -> Result<String> {
        self.log(target, &format!("Running command: {}", command));

        match target {
            Target::Host => {
                let output = self.host.run(command).await?;
                self.handle_host_output(output)
            }
            Target::Sandbox => {
                let argv = shlex::split(command)
                    .filter(|argv| !argv.is_empty())
                    .ok_or_else(|| {
                        RunletError::InvalidRequest(format!(
                            "cannot split command for container: '{}'",
                            command
                        ))
                    })?;
                // A relative host path would be taken as a named volume
                let data_dir = std::path::absolute(config.data_dir())?;
                let spec = ContainerRun {
                    image: config.sandbox.image.clone(),
                    command: argv,
                    volume: VolumeMapping::user_data(data_dir),
                    working_dir: CONTAINER_MOUNT_POINT.to_string(),
                };
                debug!(client = self.containers.name(), image = %spec.image, "Running in container");
                let output = self.containers.run(&spec).await?;
                self.handle_container_output(output)
            }
        }
    }

    /// The last non-empty stream wins; stderr is reported after stdout.
    fn handle_host_output(&self, output: CapturedOutput) -> Result<String> {
        let mut result = None;

        if !output.stdout.is_empty() {
            let text = decode(output.stdout, StreamKind::Stdout)?;
            self.events.output(&text, StreamKind::Stdout);
            self.events.log(&format!("STDOUT: {}", text));
            result = Some(text);
        }
        if !output.stderr.is_empty() {
            let text = decode(output.stderr, StreamKind::Stderr)?;
            self.events.output(&text, StreamKind::Stderr);
            self.events.log(&format!("STDERR: {}", text));
            result = Some(text);
        }

        Ok(result.unwrap_or_else(|| {
            self.events.log(NO_RESULT);
            NO_RESULT.to_string()
        }))
    }

    /// Container output is a single buffer and is always tagged stdout.
    fn handle_container_output(&self, output: Vec<u8>) -> Result<String> {
        let text = decode(output, StreamKind::Stdout)?;
        self.events.output(&text, StreamKind::Stdout);
        self.log(Target::Sandbox, &format!("Result: {}", text));
        Ok(text)
    }

    fn log(&self, target: Target, message: &str) {
        if target.is_sandbox() {
            self.events
                .log(&format!("{} {}", SANDBOX_LOG_PREFIX, message));
        } else {
            self.events.log(message);
        }
    }
}

fn decode(bytes: Vec<u8>, stream: StreamKind) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| RunletError::Decode {
        stream: stream.to_string(),
    })
}
