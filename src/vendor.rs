//! The vendor root: `_vendor/src` under the invocation directory.
use std::path::{Path, PathBuf};

use crate::error::VendorError;
use crate::manifest::is_contained;

/// Vendor directory relative to the invocation directory.
pub const VENDOR_SRC: &str = "_vendor/src";

/// Absolute directory that parents every dependency checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRoot {
    path: PathBuf,
}

impl VendorRoot {
    /// Create `<base>/_vendor/src` if needed and resolve it to an absolute path.
    ///
    /// Creating an already-existing root is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::VendorCreate`] if the directory cannot be
    /// created or canonicalized.
    pub fn create(base: &Path) -> Result<Self, VendorError> {
        let dir = base.join(VENDOR_SRC);
        std::fs::create_dir_all(&dir).map_err(|source| VendorError::VendorCreate {
            path: dir.clone(),
            source,
        })?;
        let path = dunce::canonicalize(&dir)
            .map_err(|source| VendorError::VendorCreate { path: dir, source })?;
        Ok(Self { path })
    }

    /// Wrap an existing absolute directory without touching the filesystem.
    #[must_use]
    pub fn from_existing(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Absolute path of the root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a dependency's `local_path` to its checkout directory.
    ///
    /// Returns `None` for absolute paths and paths containing `..`.
    #[must_use]
    pub fn resolve(&self, local_path: &str) -> Option<PathBuf> {
        let relative = Path::new(local_path);
        is_contained(relative).then(|| self.path.join(relative))
    }
}
