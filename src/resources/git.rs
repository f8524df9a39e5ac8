//! Git checkout resource.
//!
//! State progression for one dependency:
//!
//! ```text
//! Missing ──clone──▶ cloned ──rev-parse──▶ Correct     (done)
//!                                      └─▶ Incorrect ──reset──▶ Correct
//!                                             └─fetch+reset─▶ Correct | Reset error
//! ```
//!
//! A checkout already at the pinned revision costs one `git rev-parse HEAD`
//! (two when the pin is abbreviated) and never touches the network.
//!
//! Every command that runs inside a checkout names its `.git` and work tree
//! explicitly, so a broken checkout never falls through to a repository that
//! encloses the vendor tree.
use std::path::{Path, PathBuf};

use super::helpers::fs::{
    ensure_dir, ensure_parent_dir, remove_dir_if_exists, sibling, swap_into_place,
};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::InstallError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::manifest::DependencySpec;

/// A git working copy pinned to a commit.
#[derive(Debug)]
pub struct GitCheckout<'a> {
    remote: &'a str,
    revision: &'a str,
    dir: PathBuf,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl<'a> GitCheckout<'a> {
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

    /// Checkout directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn git_in(&self, dir: &Path, args: &[&str]) -> Result<String, String> {
        self.log.debug(&format!("git {}", args.join(" ")));
        self.executor
            .run_in(dir, "git", args)
            .map(|r| r.stdout)
            .map_err(|e| format!("{e:#}"))
    }

    /// Run git inside the checkout with repository discovery disabled.
    fn git_checkout(&self, args: &[&str]) -> Result<String, String> {
        let git_dir = format!("--git-dir={}", self.dir.join(".git").display());
        let work_tree = format!("--work-tree={}", self.dir.display());
        let mut full = vec![git_dir.as_str(), work_tree.as_str()];
        full.extend_from_slice(args);
        self.git_in(&self.dir, &full)
    }

    /// Clone the remote into `target`, running from the checkout's parent.
    fn clone_into(&self, target: &Path) -> Result<(), String> {
        let parent = self.dir.parent().unwrap_or(&self.dir);
        let target = target.to_string_lossy();
        self.git_in(parent, &["clone", "--quiet", self.remote, &*target])
            .map(|_| ())
    }

    /// Clone the remote into the checkout directory.
    fn bootstrap(&self) -> Result<(), InstallError> {
        self.log.info(&format!("bootstrapping {}", self.dir.display()));
        ensure_parent_dir(&self.dir)?;
        self.clone_into(&self.dir).map_err(|reason| InstallError::Bootstrap {
            remote: self.remote.to_string(),
            reason,
        })
    }

    fn read_revision(&self) -> Result<String, String> {
        self.git_checkout(&["rev-parse", "HEAD"])
            .map(|out| out.trim().to_string())
    }

    /// Full commit id of the pinned revision, if it is known locally.
    fn resolve_revision(&self) -> Option<String> {
        let commit = format!("{}^{{commit}}", self.revision);
        self.git_checkout(&["rev-parse", "--verify", "--quiet", &commit])
            .ok()
            .map(|out| out.trim().to_string())
    }

    fn reset_hard(&self) -> Result<(), String> {
        self.git_checkout(&["reset", "--quiet", "--hard", self.revision])
            .map(|_| ())
    }

    fn fetch(&self) -> Result<(), InstallError> {
        self.git_checkout(&["fetch", "--quiet"])
            .map(|_| ())
            .map_err(|reason| InstallError::Fetch {
                remote: self.remote.to_string(),
                reason,
            })
    }

    /// Re-clone after a failed revision read and read again.
    ///
    /// The fresh clone is staged next to the checkout and swapped in only
    /// once it succeeded; a failed clone leaves the old directory alone.
    fn recover_unreadable(&self, first: &str) -> Result<ResourceState, InstallError> {
        self.log.warn(&format!(
            "cannot read revision in {}: {first}",
            self.dir.display()
        ));
        let read_error = |reason: String| InstallError::RevisionRead {
            path: self.dir.clone(),
            reason,
        };

        let staging = sibling(&self.dir, "partial");
        remove_dir_if_exists(&staging)?;
        self.log.info(&format!("re-cloning {}", self.remote));
        if let Err(e) = self.clone_into(&staging) {
            remove_dir_if_exists(&staging)?;
            return Err(read_error(format!("{first}; re-clone failed: {e}")));
        }
        swap_into_place(&staging, &self.dir).inspect_err(|_| {
            remove_dir_if_exists(&staging).ok();
        })?;

        match self.current_state()? {
            ResourceState::Unreadable { reason } => Err(read_error(reason)),
            ResourceState::Missing => Err(read_error("no .git after clone".to_string())),
            state => Ok(state),
        }
    }
}

impl Applicable for GitCheckout<'_> {
    fn description(&self) -> String {
        format!("{} @ {}", self.remote, self.revision)
    }

    fn apply(&self) -> Result<ResourceChange, InstallError> {
        ensure_dir(&self.dir)?;

        let mut cloned = false;
        let mut state = self.current_state()?;
        if state == ResourceState::Missing {
            self.bootstrap()?;
            cloned = true;
            state = self.current_state()?;
        }
        if let ResourceState::Unreadable { reason } = state {
            state = self.recover_unreadable(&reason)?;
            cloned = true;
        }

        let current = match state {
            ResourceState::Correct => {
                if cloned {
                    return Ok(ResourceChange::Applied);
                }
                self.log.info(&format!("{} already installed", self.remote));
                return Ok(ResourceChange::AlreadyCorrect);
            }
            ResourceState::Incorrect { current } => current,
            ResourceState::Missing | ResourceState::Unreadable { .. } => {
                return Err(InstallError::RevisionRead {
                    path: self.dir.clone(),
                    reason: "no .git after clone".to_string(),
                });
            }
        };

        self.log
            .debug(&format!("at {current}, resetting to {}", self.revision));
        if let Err(first) = self.reset_hard() {
            self.log.debug(&format!(
                "{} not available locally ({first}), fetching",
                self.revision
            ));
            self.fetch()?;
            self.reset_hard().map_err(|reason| InstallError::Reset {
                revision: self.revision.to_string(),
                reason,
            })?;
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GitCheckout<'_> {
    fn current_state(&self) -> Result<ResourceState, InstallError> {
        if !self.dir.join(".git").exists() {
            return Ok(ResourceState::Missing);
        }
        Ok(match self.read_revision() {
            Err(reason) => ResourceState::Unreadable { reason },
            Ok(current) if current == self.revision => ResourceState::Correct,
            Ok(current) => {
                if self.resolve_revision().as_deref() == Some(current.as_str()) {
                    ResourceState::Correct
                } else {
                    ResourceState::Incorrect { current }
                }
            }
        })
    }
}
