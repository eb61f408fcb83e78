pub mod loader;
pub mod types;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::config::loader::get_data_dir;
use crate::config::types::RunletConfig;
use crate::error::Result;

/// Shared, re-readable runner configuration.
///
/// The runner takes a fresh snapshot on every call, so an update made
/// through any clone of the handle applies to the next execution.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<RunletConfig>>,
}

impl ConfigHandle {
    pub fn new(config: RunletConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> RunletConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply a change; the new configuration is validated before it is stored.
    pub fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut RunletConfig),
    {
        let mut next = self.snapshot();
        change(&mut next);
        next.validate()?;

        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = next;
        Ok(())
    }
}

impl RunletConfig {
    /// User data directory, falling back to the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.runner.data_dir.clone().unwrap_or_else(get_data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_visible_through_clones() {
        let handle = ConfigHandle::default();
        let other = handle.clone();

        other.update(|c| c.sandbox.enabled = true).unwrap();
        assert!(handle.snapshot().sandbox.enabled);
    }

    #[test]
    fn test_invalid_update_is_discarded() {
        let handle = ConfigHandle::default();
        let result = handle.update(|c| c.runner.command_template = "python3".to_string());

        assert!(result.is_err());
        assert_eq!(handle.snapshot().runner.command_template, "python3 {filename}");
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let mut config = RunletConfig::default();
        config.runner.data_dir = Some(PathBuf::from("/srv/data"));
        assert_eq!(config.data_dir(), PathBuf::from("/srv/data"));
    }
}
