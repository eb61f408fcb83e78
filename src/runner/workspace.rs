use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;
use crate::runner::request::Target;

/// File holding the most recent single snippet.
pub const CURRENT_FILE: &str = "_interpreter.current.py";

/// Append-only transcript of everything submitted in the session.
pub const INPUT_FILE: &str = "_interpreter.input.py";

/// The user data directory as seen from one execution target.
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: PathBuf,
    target: Target,
}

impl Workspace {
    pub fn new(data_dir: PathBuf, target: Target) -> Self {
        Self { data_dir, target }
    }

    /// Path as it should appear in the command line.
    ///
    /// Absolute paths are kept verbatim. Relative paths are joined onto the
    /// data directory on the host and left alone in the sandbox, whose
    /// working directory is the mounted data directory.
    pub fn resolve(&self, path: &str) -> String {
        if Path::new(path).is_absolute() || self.target.is_sandbox() {
            path.to_string()
        } else {
            self.data_dir.join(path).display().to_string()
        }
    }

    /// Location of `path` on the host filesystem, whatever the target.
    pub fn host_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.data_dir.join(INPUT_FILE)
    }

    /// Overwrite `path` (or the current-snippet file) with `code`.
    pub async fn write_snippet(&self, path: Option<&str>, code: &str) -> Result<PathBuf> {
        let host_path = self.host_path(path.unwrap_or(CURRENT_FILE));
        if let Some(parent) = host_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&host_path, code).await?;
        debug!(path = %host_path.display(), bytes = code.len(), "Saved snippet");
        Ok(host_path)
    }

    /// Append `data` to the transcript, newline-separated from prior content.
    pub async fn append_input(&self, data: &str) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let path = self.transcript_path();
        let previous = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        fs::create_dir_all(&self.data_dir).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if !previous.is_empty() {
            file.write_all(b"\n").await?;
        }
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %path.display(), bytes = data.len(), "Appended to transcript");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_on_host() {
        let ws = Workspace::new(PathBuf::from("/srv/data"), Target::Host);
        assert_eq!(ws.resolve("a.py"), "/srv/data/a.py");
    }

    #[test]
    fn test_resolve_relative_in_sandbox() {
        let ws = Workspace::new(PathBuf::from("/srv/data"), Target::Sandbox);
        assert_eq!(ws.resolve("a.py"), "a.py");
        assert_eq!(ws.host_path("a.py"), PathBuf::from("/srv/data/a.py"));
    }

    #[test]
    fn test_resolve_absolute_verbatim() {
        for target in [Target::Host, Target::Sandbox] {
            let ws = Workspace::new(PathBuf::from("/srv/data"), target);
            assert_eq!(ws.resolve("/tmp/b.py"), "/tmp/b.py");
        }
    }

    #[tokio::test]
    async fn test_transcript_newline_join() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().to_path_buf(), Target::Host);

        ws.append_input("a = 1").await.unwrap();
        assert_eq!(fs::read_to_string(ws.transcript_path()).await.unwrap(), "a = 1");

        ws.append_input("print(a)").await.unwrap();
        assert_eq!(
            fs::read_to_string(ws.transcript_path()).await.unwrap(),
            "a = 1\nprint(a)"
        );
    }

    #[tokio::test]
    async fn test_transcript_skips_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().to_path_buf(), Target::Host);

        ws.append_input("").await.unwrap();
        assert!(!ws.transcript_path().exists());

        ws.append_input("x").await.unwrap();
        ws.append_input("").await.unwrap();
        assert_eq!(fs::read_to_string(ws.transcript_path()).await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_snippet_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().to_path_buf(), Target::Sandbox);

        ws.write_snippet(None, "first = True").await.unwrap();
        let path = ws.write_snippet(None, "second").await.unwrap();

        assert_eq!(path, dir.path().join(CURRENT_FILE));
        assert_eq!(fs::read_to_string(path).await.unwrap(), "second");
    }
}
