// Shared helpers for integration tests.
//
// Provides throwaway upstream repositories built with git2 and an executor
// that records every command it runs, so tests can check both the resulting
// checkout and the commands that produced it.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use git2::{IndexAddOption, Repository, Signature};

use vendorpin::exec::{ExecResult, Executor, SystemExecutor};

/// Whether the `git` executable is available; tests that shell out skip
/// themselves when it is not.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Whether the `hg` executable is available.
pub fn hg_available() -> bool {
    which::which("hg").is_ok()
}

/// A local git repository that plays the part of a remote.
pub struct UpstreamRepo {
    dir: tempfile::TempDir,
    repo: Repository,
}

impl UpstreamRepo {
    /// Create an empty repository in a fresh temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create upstream dir");
        let repo = Repository::init(dir.path()).expect("init upstream repo");
        Self { dir, repo }
    }

    /// Location to pass as the dependency's `repo`.
    pub fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Write `file` with `content` and commit everything; returns the commit id.
    pub fn commit(&self, file: &str, content: &str) -> String {
        std::fs::write(self.dir.path().join(file), content).expect("write upstream file");

        let mut index = self.repo.index().expect("open index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("stage files");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let sig = Signature::now("vendorpin tests", "tests@example.invalid").expect("signature");
        let parents: Vec<git2::Commit<'_>> = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| self.repo.find_commit(oid).expect("find parent"))
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, file, &tree, &parent_refs)
            .expect("commit");
        oid.to_string()
    }
}

/// Write a `deps.json` into `dir` and return its path.
pub fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("deps.json");
    std::fs::write(&path, content).expect("write manifest");
    path
}

/// Manifest entry for a git dependency.
pub fn git_entry(remote: &str, revision: &str, path: &str) -> String {
    format!(r#"{{"vcs": "git", "repo": "{remote}", "rev": "{revision}", "path": "{path}"}}"#)
}

/// Read `HEAD` of the git checkout at `dir`.
///
/// The repository is opened without searching parent directories.
pub fn head_of(dir: &Path) -> String {
    let repo = Repository::open_ext(
        dir,
        git2::RepositoryOpenFlags::NO_SEARCH,
        std::iter::empty::<&std::ffi::OsStr>(),
    )
    .expect("open checkout");
    let head = repo.head().expect("read HEAD");
    head.target().expect("HEAD target").to_string()
}

/// [`SystemExecutor`] wrapper that remembers each `program sub` it ran.
///
/// The subcommand is the first argument that is not an option, so
/// `git --git-dir=… rev-parse HEAD` is recorded as `git rev-parse`.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    inner: SystemExecutor,
    calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    /// Commands run so far, e.g. `git clone`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// How many times `program sub` ran.
    pub fn count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| *c == command).count()
    }
}

impl Executor for RecordingExecutor {
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let sub = args
            .iter()
            .copied()
            .find(|a| !a.starts_with('-'))
            .unwrap_or_default();
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{program} {sub}"));
        self.inner.run_in(dir, program, args)
    }

    fn which(&self, program: &str) -> bool {
        self.inner.which(program)
    }
}
