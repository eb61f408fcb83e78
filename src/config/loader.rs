use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::RunletConfig;
use crate::error::{Result, RunletError};

/// Get the default configuration file path
pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "runlet", "runlet") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        // Fallback to home directory
        dirs_fallback().join(".runlet").join("config.toml")
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(config_path: Option<&Path>) -> Result<RunletConfig> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(RunletConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_config(&content)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<RunletConfig> {
    let config: RunletConfig =
        toml::from_str(content).map_err(|e| RunletError::TomlParse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Get the default user data directory (mounted into the sandbox)
pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "runlet", "runlet") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs_fallback().join(".local").join("share").join("runlet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, RunletConfig::default());
        assert_eq!(config.runner.command_template, "python3 {filename}");
        assert!(!config.sandbox.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [sandbox]
            enabled = true
            "#,
        )
        .unwrap();
        assert!(config.sandbox.enabled);
        assert_eq!(config.sandbox.image, "python:3.12-slim");
        assert_eq!(config.runner.command_template, "python3 {filename}");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[runner]\ncommand_template = \"node {filename}\"\ndata_dir = \"/srv/data\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.runner.command_template, "node {filename}");
        assert_eq!(config.runner.data_dir, Some(PathBuf::from("/srv/data")));
    }

    #[test]
    fn test_template_without_slot_is_rejected() {
        let err = parse_config("[runner]\ncommand_template = \"python3 main.py\"\n").unwrap_err();
        assert!(matches!(err, RunletError::Config(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_config("[runner\n").unwrap_err();
        assert!(matches!(err, RunletError::TomlParse(_)));
    }
}
