//! Domain-specific error types for the vendoring engine.
//!
//! Library code returns typed errors; the binary converts them to
//! [`anyhow::Error`] at the boundary via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! VendorError
//! ├── ManifestRead / ManifestParse   manifest file I/O and JSON decoding
//! ├── ManifestInvalid(ManifestError) entries rejected before any install
//! ├── VendorCreate                   vendor root could not be created
//! ├── EnvHint                        `.env` could not be written
//! ├── MissingTool                    VCS executable not on PATH
//! ├── Output                         stdout rejected the `.env` tips
//! └── Install(InstallError)          a single dependency failed to reconcile
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for a vendoring run.
#[derive(Error, Debug)]
pub enum VendorError {
    /// The manifest file is missing or unreadable.
    #[error("Invalid dependency file {}: {source}", path.display())]
    ManifestRead {
        /// Manifest path as given on the command line.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not a JSON array of dependency objects.
    #[error("Invalid dependency file {}: {source}", path.display())]
    ManifestParse {
        /// Manifest path as given on the command line.
        path: PathBuf,
        /// Underlying decoding error.
        source: serde_json::Error,
    },

    /// The manifest decoded but one of its entries is unusable.
    #[error("Invalid dependency file: {0}")]
    ManifestInvalid(#[from] ManifestError),

    /// The vendor root could not be created or resolved.
    #[error("Failed to create _vendor directory {}: {source}", path.display())]
    VendorCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The `.env` hint file could not be written.
    #[error("Failed to write .env file: {source}")]
    EnvHint {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A version-control executable required by the manifest is not installed.
    #[error("'{program}' is required by the manifest but was not found on PATH")]
    MissingTool {
        /// Executable name (e.g. `git`).
        program: String,
    },

    /// User-facing output could not be written.
    #[error("Failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A dependency could not be brought to its pinned revision.
    #[error("Failed to install {remote}: {source}")]
    Install {
        /// Remote location of the failing dependency.
        remote: String,
        /// What went wrong.
        source: InstallError,
    },
}

/// Problems with individual manifest entries, detected before installation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    /// A required key is absent or empty.
    #[error("entry {index}: missing required key '{field}'")]
    MissingField {
        /// Zero-based position in the manifest array.
        index: usize,
        /// JSON key name.
        field: &'static str,
    },

    /// The `vcs` value names a version-control system that is not supported.
    #[error("entry {index}: unsupported vcs '{kind}' (expected git or hg)")]
    UnsupportedVcsKind {
        /// Zero-based position in the manifest array.
        index: usize,
        /// The value as written in the manifest.
        kind: String,
    },

    /// The `path` value is absolute or climbs out of the vendor root.
    #[error("entry {index}: path '{path}' escapes the vendor root")]
    UnsafePath {
        /// Zero-based position in the manifest array.
        index: usize,
        /// The value as written in the manifest.
        path: String,
    },

    /// Two entries share the same `path`.
    #[error("path '{path}' is used by more than one dependency")]
    DuplicatePath {
        /// The shared path.
        path: String,
    },
}

/// Failure to reconcile one dependency checkout.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The checkout directory (or its parent) could not be created or cleared.
    #[error("Failed to mkdir {}: {source}", path.display())]
    Directory {
        /// Directory that could not be prepared.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The initial clone failed.
    #[error("Failed to clone git {remote}: {reason}")]
    Bootstrap {
        /// Remote that was being cloned.
        remote: String,
        /// Cause reported by git.
        reason: String,
    },

    /// The checked-out revision could not be read, even after re-cloning.
    #[error("Failed to read current revision in {}: {reason}", path.display())]
    RevisionRead {
        /// Checkout directory.
        path: PathBuf,
        /// Cause reported by git.
        reason: String,
    },

    /// Fetching new history from the remote failed.
    #[error("Failed to fetch latest revisions from {remote}: {reason}")]
    Fetch {
        /// Remote being fetched.
        remote: String,
        /// Cause reported by git.
        reason: String,
    },

    /// The hard reset to the pinned revision failed after fetching.
    #[error("Failed to change to git rev {revision}: {reason}")]
    Reset {
        /// The pinned revision.
        revision: String,
        /// Cause reported by git.
        reason: String,
    },

    /// The mercurial clone-at-revision failed.
    #[error("Failed to clone hg {remote} at {revision}: {reason}")]
    Clone {
        /// Remote being cloned.
        remote: String,
        /// The pinned revision.
        revision: String,
        /// Cause reported by hg.
        reason: String,
    },
}
