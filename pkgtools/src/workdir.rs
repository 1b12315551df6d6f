//! Scratch directories for multi-step package operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "portupgrade";

/// Used when neither `PKG_TMPDIR` nor `TMPDIR` is set.
pub const DEFAULT_TMP_DIR: &str = "/var/tmp";

/// Errors creating a workspace.
#[derive(Debug, Error)]
pub enum WorkdirError {
    #[error("temporary directory does not exist: {0}")]
    BaseMissing(PathBuf),

    #[error("failed to create workspace in {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parent directory for workspaces: `PKG_TMPDIR`, then `TMPDIR`, then
/// `/var/tmp`. Empty variables are skipped.
pub fn base_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    ["PKG_TMPDIR", "TMPDIR"]
        .into_iter()
        .filter_map(|name| lookup(name).filter(|value| !value.is_empty()))
        .map(PathBuf::from)
        .next()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TMP_DIR))
}

/// A private directory named `portupgradeXXXXXXXX`, removed with its
/// contents when dropped.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: Option<tempfile::TempDir>,
    path: PathBuf,
}

impl TempWorkspace {
    /// Create a workspace under the directory picked by [`base_dir_from`]
    /// from the process environment.
    pub fn create() -> Result<Self, WorkdirError> {
        Self::create_in(&base_dir_from(|name| std::env::var(name).ok()))
    }

    /// Create a workspace under `base`, which must already exist.
    pub fn create_in(base: &Path) -> Result<Self, WorkdirError> {
        if !base.is_dir() {
            return Err(WorkdirError::BaseMissing(base.to_path_buf()));
        }

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .rand_bytes(8)
            .tempdir_in(base)
            .map_err(|source| WorkdirError::Create {
                path: base.to_path_buf(),
                source,
            })?;
        let path = dir.path().to_path_buf();

        tracing::debug!(path = %path.display(), "Created workspace");

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Directory of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the workspace.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Leave the directory on disk and return its path.
    pub fn keep(mut self) -> PathBuf {
        match self.dir.take() {
            Some(dir) => dir.into_path(),
            None => std::mem::take(&mut self.path),
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove workspace"
                );
            }
        }
    }
}
