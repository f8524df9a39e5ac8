//! Idempotent checkout primitives (check + apply pattern).
//!
//! Each supported VCS kind has a resource that knows how to bring
//! `vendor_root/local_path` to a pinned revision. [`reconcile`] picks the
//! right one for a [`DependencySpec`].
pub mod git;
pub mod helpers;
pub mod hg;

use crate::error::InstallError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::manifest::{DependencySpec, VcsKind};
use crate::vendor::VendorRoot;

/// Minimal interface for resources that can be described and applied.
///
/// Resources that cannot inspect their own state cheaply (mercurial
/// checkouts are always re-cloned) implement only this trait.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an [`InstallError`] describing the first step that failed.
    fn apply(&self) -> Result<ResourceChange, InstallError>;
}

/// State of a checkout on disk.
///
/// # Examples
///
/// ```
/// use vendorpin::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "cafebabe".into() };
/// assert_ne!(stale, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// No version-control metadata at the checkout path.
    Missing,
    /// Checked out at the pinned revision.
    Correct,
    /// Checked out at some other revision.
    Incorrect {
        /// The revision currently checked out.
        current: String,
    },
    /// Metadata is present but the current revision cannot be read.
    Unreadable {
        /// Why reading failed.
        reason: String,
    },
}

/// Result of applying a resource.
///
/// # Examples
///
/// ```
/// use vendorpin::resources::ResourceChange;
///
/// assert_ne!(ResourceChange::Applied, ResourceChange::AlreadyCorrect);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// The checkout was cloned, reset, or replaced.
    Applied,
    /// The checkout already matched; nothing was mutated.
    AlreadyCorrect,
}

/// Resources that can determine their own state before applying.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined at all.
    fn current_state(&self) -> Result<ResourceState, InstallError>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool, InstallError> {
        Ok(self.current_state()? != ResourceState::Correct)
    }
}

/// Bring the checkout for `spec` under `root` to `spec.revision`.
///
/// # Errors
///
/// Returns an [`InstallError`] if the checkout path escapes `root` or any
/// step of the VCS-specific procedure fails.
pub fn reconcile(
    spec: &DependencySpec,
    root: &VendorRoot,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<ResourceChange, InstallError> {
    let dir = root
        .resolve(&spec.local_path)
        .ok_or_else(|| InstallError::Directory {
            path: root.path().join(&spec.local_path),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path escapes the vendor root",
            ),
        })?;

    match spec.vcs_kind {
        VcsKind::Git => git::GitCheckout::new(spec, dir, executor, log).apply(),
        VcsKind::Mercurial => hg::HgCheckout::new(spec, dir, executor, log).apply(),
    }
}
