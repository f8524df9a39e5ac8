#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Git reconciliation against real repositories.
//!
//! Each test builds a local upstream with git2 and points a dependency at it,
//! so the checkout is driven by the real `git` executable. Tests return early
//! when `git` is not installed.

mod common;

use std::path::Path;

use common::{RecordingExecutor, UpstreamRepo, git_available, head_of};
use vendorpin::error::InstallError;
use vendorpin::logging::Logger;
use vendorpin::manifest::{DependencySpec, VcsKind};
use vendorpin::resources::{self, ResourceChange};
use vendorpin::vendor::VendorRoot;

fn spec(upstream: &UpstreamRepo, revision: &str) -> DependencySpec {
    DependencySpec {
        vcs_kind: VcsKind::Git,
        remote: upstream.url(),
        revision: revision.to_string(),
        local_path: "example.org/lib".to_string(),
    }
}

#[test]
fn fresh_clone_lands_on_pinned_revision() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    let first = upstream.commit("a.txt", "one");
    upstream.commit("b.txt", "two");

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let executor = RecordingExecutor::default();

    let change = resources::reconcile(
        &spec(&upstream, &first),
        &root,
        &executor,
        &Logger::default(),
    )
    .unwrap();

    let checkout = root.path().join("example.org/lib");
    assert_eq!(change, ResourceChange::Applied);
    assert!(checkout.join(".git").is_dir());
    assert_eq!(head_of(&checkout), first);
    assert!(!checkout.join("b.txt").exists());
    assert_eq!(executor.count("git clone"), 1);
    assert_eq!(executor.count("git fetch"), 0);
}

#[test]
fn second_run_changes_nothing() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    let rev = upstream.commit("a.txt", "one");

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let dep = spec(&upstream, &rev);
    resources::reconcile(&dep, &root, &RecordingExecutor::default(), &Logger::default()).unwrap();

    let executor = RecordingExecutor::default();
    let change = resources::reconcile(&dep, &root, &executor, &Logger::default()).unwrap();

    assert_eq!(change, ResourceChange::AlreadyCorrect);
    assert_eq!(executor.calls(), vec!["git rev-parse".to_string()]);
}

#[test]
fn known_revision_resets_without_fetching() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    let first = upstream.commit("a.txt", "one");
    let second = upstream.commit("b.txt", "two");

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    resources::reconcile(
        &spec(&upstream, &second),
        &root,
        &RecordingExecutor::default(),
        &Logger::default(),
    )
    .unwrap();

    let executor = RecordingExecutor::default();
    let change = resources::reconcile(
        &spec(&upstream, &first),
        &root,
        &executor,
        &Logger::default(),
    )
    .unwrap();

    assert_eq!(change, ResourceChange::Applied);
    assert_eq!(head_of(&root.path().join("example.org/lib")), first);
    assert_eq!(executor.count("git fetch"), 0);
    assert_eq!(executor.count("git reset"), 1);
}

#[test]
fn new_upstream_revision_is_fetched() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    let first = upstream.commit("a.txt", "one");

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    resources::reconcile(
        &spec(&upstream, &first),
        &root,
        &RecordingExecutor::default(),
        &Logger::default(),
    )
    .unwrap();

    let second = upstream.commit("b.txt", "two");
    let executor = RecordingExecutor::default();
    let change = resources::reconcile(
        &spec(&upstream, &second),
        &root,
        &executor,
        &Logger::default(),
    )
    .unwrap();

    let checkout = root.path().join("example.org/lib");
    assert_eq!(change, ResourceChange::Applied);
    assert_eq!(head_of(&checkout), second);
    assert!(checkout.join("b.txt").exists());
    assert_eq!(executor.count("git fetch"), 1);
    assert_eq!(executor.count("git reset"), 2);
}

#[test]
fn unknown_revision_is_a_reset_error() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    upstream.commit("a.txt", "one");
    let missing = "0123456789abcdef0123456789abcdef01234567";

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let err = resources::reconcile(
        &spec(&upstream, missing),
        &root,
        &RecordingExecutor::default(),
        &Logger::default(),
    )
    .unwrap_err();

    assert!(
        matches!(&err, InstallError::Reset { revision, .. } if revision == missing),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains(missing));
}

#[test]
fn unreachable_remote_is_a_bootstrap_error() {
    if !git_available() {
        return;
    }
    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let dep = DependencySpec {
        vcs_kind: VcsKind::Git,
        remote: base.path().join("no-such-repo").to_string_lossy().into_owned(),
        revision: "deadbeef".to_string(),
        local_path: "gone".to_string(),
    };

    let err = resources::reconcile(&dep, &root, &RecordingExecutor::default(), &Logger::default())
        .unwrap_err();

    assert!(matches!(err, InstallError::Bootstrap { .. }), "unexpected error: {err}");
    assert!(!root.path().join("gone/.git").exists());
}

#[test]
fn abbreviated_revision_is_reconciled_once() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    let first = upstream.commit("a.txt", "one");
    upstream.commit("b.txt", "two");
    let dep = spec(&upstream, &first[..8]);

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let change =
        resources::reconcile(&dep, &root, &RecordingExecutor::default(), &Logger::default())
            .unwrap();
    assert_eq!(change, ResourceChange::Applied);
    assert_eq!(head_of(&root.path().join("example.org/lib")), first);

    let executor = RecordingExecutor::default();
    let change = resources::reconcile(&dep, &root, &executor, &Logger::default()).unwrap();

    assert_eq!(change, ResourceChange::AlreadyCorrect);
    assert_eq!(
        executor.calls(),
        vec!["git rev-parse".to_string(), "git rev-parse".to_string()]
    );
}

/// Turn `dir` into a checkout whose `.git` is an empty directory.
fn break_checkout(dir: &Path) {
    std::fs::create_dir_all(dir.join(".git")).unwrap();
    std::fs::write(dir.join("stale.txt"), "left over").unwrap();
}

#[test]
fn broken_checkout_inside_a_project_leaves_the_project_alone() {
    if !git_available() {
        return;
    }
    let project = UpstreamRepo::new();
    let first = project.commit("main.go", "package main\n");
    let second = project.commit("main.go", "package main\n\nfunc main() {}\n");
    let project_dir = Path::new(&project.url()).to_path_buf();
    std::fs::write(project_dir.join("main.go"), "uncommitted work\n").unwrap();

    let root = VendorRoot::create(&project_dir).unwrap();
    let checkout = root.path().join("example.org/lib");
    break_checkout(&checkout);

    let change = resources::reconcile(
        &spec(&project, &first),
        &root,
        &RecordingExecutor::default(),
        &Logger::default(),
    )
    .unwrap();

    assert_eq!(change, ResourceChange::Applied);
    assert_eq!(
        std::fs::read_to_string(project_dir.join("main.go")).unwrap(),
        "uncommitted work\n"
    );
    assert_eq!(head_of(&project_dir), second);
    assert_eq!(head_of(&checkout), first);
    assert!(!checkout.join("stale.txt").exists());
}

#[test]
fn broken_checkout_is_replaced_by_a_fresh_clone() {
    if !git_available() {
        return;
    }
    let upstream = UpstreamRepo::new();
    let rev = upstream.commit("a.txt", "one");

    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let checkout = root.path().join("example.org/lib");
    break_checkout(&checkout);

    let change = resources::reconcile(
        &spec(&upstream, &rev),
        &root,
        &RecordingExecutor::default(),
        &Logger::default(),
    )
    .unwrap();

    assert_eq!(change, ResourceChange::Applied);
    assert_eq!(head_of(&checkout), rev);
    assert!(checkout.join("a.txt").is_file());
    assert!(!checkout.join("stale.txt").exists());
    let leftovers: Vec<_> = std::fs::read_dir(root.path().join("example.org"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("lib")]);
}

#[test]
fn broken_checkout_is_kept_when_the_re_clone_fails() {
    if !git_available() {
        return;
    }
    let base = tempfile::tempdir().unwrap();
    let root = VendorRoot::create(base.path()).unwrap();
    let checkout = root.path().join("example.org/lib");
    break_checkout(&checkout);
    let dep = DependencySpec {
        vcs_kind: VcsKind::Git,
        remote: base.path().join("no-such-repo").to_string_lossy().into_owned(),
        revision: "deadbeef".to_string(),
        local_path: "example.org/lib".to_string(),
    };

    let err = resources::reconcile(&dep, &root, &RecordingExecutor::default(), &Logger::default())
        .unwrap_err();

    assert!(matches!(err, InstallError::RevisionRead { .. }), "unexpected error: {err}");
    assert!(err.to_string().contains("re-clone failed"));
    assert_eq!(
        std::fs::read_to_string(checkout.join("stale.txt")).unwrap(),
        "left over"
    );
    assert!(!root.path().join("example.org/.lib.partial").exists());
}
