//! Mercurial checkout resource.
//!
//! Mercurial dependencies are not inspected: every run clones at the pinned
//! revision. The clone goes to a staging directory next to the checkout and
//! replaces the old copy only once it has succeeded.
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, remove_dir_if_exists, sibling, swap_into_place};
use super::{Applicable, ResourceChange};
use crate::error::InstallError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::manifest::DependencySpec;

/// A mercurial working copy cloned at a revision.
#[derive(Debug)]
pub struct HgCheckout<'a> {
    remote: &'a str,
    revision: &'a str,
    dir: PathBuf,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl<'a> HgCheckout<'a> {
    /// Create a checkout resource for `spec` rooted at `dir`.
    #[must_use]
    pub fn new(
        spec: &'a DependencySpec,
        dir: PathBuf,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            remote: &spec.remote,
            revision: &spec.revision,
            dir,
            executor,
            log,
        }
    }

    /// Sibling directory the clone is written to before the swap.
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        sibling(&self.dir, "partial")
    }

    fn clone_error(&self, reason: String) -> InstallError {
        InstallError::Clone {
            remote: self.remote.to_string(),
            revision: self.revision.to_string(),
            reason,
        }
    }
}

impl Applicable for HgCheckout<'_> {
    fn description(&self) -> String {
        format!("{} @ {}", self.remote, self.revision)
    }

    fn apply(&self) -> Result<ResourceChange, InstallError> {
        ensure_parent_dir(&self.dir)?;
        let staging = self.staging_dir();
        remove_dir_if_exists(&staging)?;

        let parent = self.dir.parent().unwrap_or_else(|| Path::new("."));
        let target = staging.to_string_lossy();
        self.log
            .info(&format!("cloning {} at {}", self.remote, self.revision));
        let args = [
            "clone",
            "--quiet",
            "--updaterev",
            self.revision,
            self.remote,
            &*target,
        ];
        self.log.debug(&format!("hg {}", args.join(" ")));
        if let Err(e) = self.executor.run_in(parent, "hg", &args) {
            // Leave the previous checkout in place; drop any half-written clone.
            remove_dir_if_exists(&staging)?;
            return Err(self.clone_error(format!("{e:#}")));
        }

        if !staging.exists() {
            return Err(self.clone_error("clone produced no working copy".to_string()));
        }
        swap_into_place(&staging, &self.dir).inspect_err(|_| {
            remove_dir_if_exists(&staging).ok();
        })?;
        Ok(ResourceChange::Applied)
    }
}
