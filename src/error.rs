use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunletError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Execution errors
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Container runtime error: {0}")]
    ContainerRuntime(String),

    #[error("Container exited with status {exit_code}: {stderr}")]
    ContainerFailed { exit_code: i32, stderr: String },

    #[error("Output on {stream} is not valid UTF-8")]
    Decode { stream: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RunletError>;
