use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, RunletError};

/// Placeholder substituted with the target file path in the command template.
pub const FILENAME_SLOT: &str = "{filename}";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunletConfig {
    pub runner: RunnerConfig,
    pub sandbox: SandboxConfig,
}

impl RunletConfig {
    /// Reject configurations the runner cannot execute with.
    pub fn validate(&self) -> Result<()> {
        if !self.runner.command_template.contains(FILENAME_SLOT) {
            return Err(RunletError::Config(format!(
                "command_template must contain {}: '{}'",
                FILENAME_SLOT, self.runner.command_template
            )));
        }
        if self.sandbox.image.trim().is_empty() {
            return Err(RunletError::Config(
                "sandbox.image must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Command used to run code files, e.g. `python3 {filename}`
    pub command_template: String,
    /// User data directory (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command_template: "python3 {filename}".to_string(),
            data_dir: None,
        }
    }
}

/// Docker sandbox configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Run everything inside a container instead of on the host
    pub enabled: bool,
    /// Image used for each short-lived container
    pub image: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            image: "python:3.12-slim".to_string(),
        }
    }
}
