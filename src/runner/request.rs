use serde::{Deserialize, Serialize};

/// Where a command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Child process on the local machine
    Host,
    /// Short-lived Docker container
    Sandbox,
}

impl Target {
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Self::Sandbox
        } else {
            Self::Host
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

/// A unit of work for the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum CommandRequest {
    /// Run a code snippet, or the whole transcript when `all` is set.
    RunCode {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default)]
        all: bool,
    },
    /// Run an existing code file.
    RunFile { path: String },
    /// Run a shell command verbatim.
    RunShell { command: String },
}

impl CommandRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunCode { .. } => "run_code",
            Self::RunFile { .. } => "run_file",
            Self::RunShell { .. } => "run_shell",
        }
    }
}

/// Normalized outcome of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub request: CommandRequest,
    pub result: String,
    /// Copy of `result` for downstream consumers; absent for soft failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ExecutionResult {
    pub fn new(request: CommandRequest, result: String) -> Self {
        Self {
            request,
            context: Some(result.clone()),
            result,
        }
    }

    /// Soft failure for a host file that does not exist.
    pub fn file_not_found(request: CommandRequest) -> Self {
        Self {
            request,
            result: FILE_NOT_FOUND.to_string(),
            context: None,
        }
    }
}

/// Result text when a host-mode file does not exist.
pub const FILE_NOT_FOUND: &str = "File not found";

/// Result text when a host process produced no output at all.
pub const NO_RESULT: &str = "No result (stdout/stderr empty)";
