//! File-system resource helpers.
use std::path::{Path, PathBuf};

use crate::error::InstallError;

/// Create `path` and any missing ancestors.
///
/// An already-existing directory is not an error.
///
/// # Errors
///
/// Returns [`InstallError::Directory`] if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), InstallError> {
    std::fs::create_dir_all(path).map_err(|source| InstallError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns [`InstallError::Directory`] if the parent cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), InstallError> {
    path.parent().map_or(Ok(()), ensure_dir)
}

/// Remove the directory tree at `path`. Does nothing if it does not exist.
///
/// # Errors
///
/// Returns [`InstallError::Directory`] if the tree exists but cannot be removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<(), InstallError> {
    if path.symlink_metadata().is_err() {
        return Ok(());
    }
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|source| InstallError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

/// Hidden sibling of `path` named `.<name>.<tag>`.
#[must_use]
pub fn sibling(path: &Path, tag: &str) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "checkout".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{name}.{tag}"))
}

/// Replace `dir` with the finished tree at `staging`.
///
/// The previous `dir` is moved aside first and only deleted once `staging`
/// is in place; if the final rename fails it is moved back.
///
/// # Errors
///
/// Returns [`InstallError::Directory`] if either rename fails or the old tree
/// cannot be removed afterwards.
pub fn swap_into_place(staging: &Path, dir: &Path) -> Result<(), InstallError> {
    let backup = sibling(dir, "old");
    remove_dir_if_exists(&backup)?;

    let had_previous = dir.symlink_metadata().is_ok();
    if had_previous {
        std::fs::rename(dir, &backup).map_err(|source| InstallError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    if let Err(source) = std::fs::rename(staging, dir) {
        if had_previous {
            std::fs::rename(&backup, dir).ok();
        }
        return Err(InstallError::Directory {
            path: dir.to_path_buf(),
            source,
        });
    }
    remove_dir_if_exists(&backup)
}
