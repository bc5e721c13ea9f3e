//! Filesystem helpers used while preparing the runtime layout

use crate::error::{Result, SettingsError};
use std::fs;
use std::path::Path;

/// Create `path` (and any missing parents) unless it is already a directory
///
/// Fails with [`SettingsError::Io`] when the directory cannot be created,
/// including when a regular file already occupies the path.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        tracing::debug!(path = %path.display(), "Directory already present");
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Created directory");
    Ok(())
}
