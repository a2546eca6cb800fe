//! Filesystem helpers for the working tree.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::error::MediaResult;

/// Create each directory (and parents) if missing.
pub async fn ensure_dirs<P: AsRef<Path>>(dirs: impl IntoIterator<Item = P>) -> MediaResult<()> {
    for dir in dirs {
        fs::create_dir_all(dir.as_ref()).await?;
    }
    Ok(())
}

/// Remove files, logging and ignoring failures. Returns how many were removed.
pub async fn remove_files<P: AsRef<Path>>(files: impl IntoIterator<Item = P>) -> usize {
    let mut removed = 0;
    for file in files {
        let file = file.as_ref();
        match fs::remove_file(file).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", file.display(), e),
        }
    }
    removed
}

/// Absolute form of `path`, resolved against the current directory.
///
/// Resolves symlinks when the path exists.
pub fn absolute_path(path: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let path = path.as_ref();
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return Ok(canonical);
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
