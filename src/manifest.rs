//! Dependency manifest: a JSON array of `{vcs, repo, rev, path}` records.
//!
//! Records are decoded leniently (unknown keys ignored, missing keys become
//! `None`) and then validated as a whole, so a bad entry anywhere in the file
//! stops the run before any checkout is touched.
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};

use crate::error::{ManifestError, VendorError};

/// Manifest path used when none is given on the command line.
pub const DEFAULT_MANIFEST: &str = "deps.json";

/// Version-control system backing a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    /// Git: clone once, then reset (fetching only when needed).
    Git,
    /// Mercurial: clone at the pinned revision on every run.
    Mercurial,
}

impl VcsKind {
    /// Parse the manifest spelling of a VCS kind.
    #[must_use]
    pub fn from_manifest(value: &str) -> Option<Self> {
        match value {
            "git" => Some(Self::Git),
            "hg" | "mercurial" => Some(Self::Mercurial),
            _ => None,
        }
    }

    /// Name of the executable that implements this kind.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Mercurial => "hg",
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// One manifest entry exactly as decoded, before validation.
///
/// Absent and `null` keys both decode to `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDependency {
    vcs: Option<String>,
    repo: Option<String>,
    rev: Option<String>,
    path: Option<String>,
}

/// Return the trimmed value of a required key, or report it missing.
fn required(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<String, ManifestError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ManifestError::MissingField { index, field })
}

/// A validated dependency pinned to an exact revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Which VCS strategy reconciles this dependency.
    pub vcs_kind: VcsKind,
    /// Upstream repository location.
    pub remote: String,
    /// Commit hash (git) or revision id (hg).
    pub revision: String,
    /// Relative path under the vendor root.
    pub local_path: String,
}

/// Read and validate the manifest at `path`.
///
/// # Errors
///
/// Returns [`VendorError::ManifestRead`] if the file cannot be read,
/// [`VendorError::ManifestParse`] if it is not a JSON array of objects, and
/// [`VendorError::ManifestInvalid`] if any entry fails validation.
pub fn load(path: &Path) -> Result<Vec<DependencySpec>, VendorError> {
    let content = std::fs::read_to_string(path).map_err(|source| VendorError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content).map_err(|e| match e {
        ParseFailure::Json(source) => VendorError::ManifestParse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(e) => VendorError::ManifestInvalid(e),
    })
}

/// Why [`parse`] rejected a manifest.
#[derive(Debug)]
pub enum ParseFailure {
    /// Malformed JSON or wrong top-level shape.
    Json(serde_json::Error),
    /// Well-formed JSON with an unusable entry.
    Invalid(ManifestError),
}

/// Decode and validate manifest content.
///
/// # Errors
///
/// Returns [`ParseFailure::Json`] for malformed input and
/// [`ParseFailure::Invalid`] for the first entry that fails validation.
pub fn parse(content: &str) -> Result<Vec<DependencySpec>, ParseFailure> {
    let raw: Vec<RawDependency> = serde_json::from_str(content).map_err(ParseFailure::Json)?;
    validate(raw).map_err(ParseFailure::Invalid)
}

fn validate(raw: Vec<RawDependency>) -> Result<Vec<DependencySpec>, ManifestError> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(raw.len());

    for (index, entry) in raw.into_iter().enumerate() {
        let vcs = required(entry.vcs, index, "vcs")?;
        let remote = required(entry.repo, index, "repo")?;
        let revision = required(entry.rev, index, "rev")?;
        let local_path = required(entry.path, index, "path")?;

        let vcs_kind = VcsKind::from_manifest(&vcs)
            .ok_or(ManifestError::UnsupportedVcsKind { index, kind: vcs })?;

        if !is_contained(Path::new(&local_path)) {
            return Err(ManifestError::UnsafePath {
                index,
                path: local_path,
            });
        }

        if !seen.insert(normalize(&local_path)) {
            return Err(ManifestError::DuplicatePath { path: local_path });
        }

        specs.push(DependencySpec {
            vcs_kind,
            remote,
            revision,
            local_path,
        });
    }

    Ok(specs)
}

/// Returns true when `path` is relative and never climbs above its base.
pub(crate) fn is_contained(path: &Path) -> bool {
    let mut has_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    has_normal
}

/// Collapse `./` segments and trailing slashes for duplicate detection.
fn normalize(path: &str) -> String {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn invalid(content: &str) -> ManifestError {
        match parse(content) {
            Err(ParseFailure::Invalid(e)) => e,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn parses_git_and_hg_entries_in_order() {
        let specs = parse(
            r#"[
                {"vcs": "git", "repo": "https://example/a", "rev": "deadbeef", "path": "a"},
                {"vcs": "hg", "repo": "https://example/h", "rev": "abc123", "path": "x/h"}
            ]"#,
        )
        .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].vcs_kind, VcsKind::Git);
        assert_eq!(specs[0].remote, "https://example/a");
        assert_eq!(specs[0].revision, "deadbeef");
        assert_eq!(specs[0].local_path, "a");
        assert_eq!(specs[1].vcs_kind, VcsKind::Mercurial);
        assert_eq!(specs[1].local_path, "x/h");
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse("[]").unwrap().is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let specs = parse(
            r#"[{"vcs": "git", "repo": "r", "rev": "1", "path": "p", "comment": "pinned"}]"#,
        )
        .unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn mercurial_alias_is_accepted() {
        let specs = parse(r#"[{"vcs": "mercurial", "repo": "r", "rev": "1", "path": "p"}]"#)
            .unwrap();
        assert_eq!(specs[0].vcs_kind, VcsKind::Mercurial);
    }

    #[test]
    fn top_level_object_is_a_json_error() {
        assert!(matches!(
            parse(r#"{"vcs": "git"}"#),
            Err(ParseFailure::Json(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(parse("[{"), Err(ParseFailure::Json(_))));
    }

    #[test]
    fn missing_key_names_field_and_index() {
        let e = invalid(
            r#"[
                {"vcs": "git", "repo": "r", "rev": "1", "path": "a"},
                {"vcs": "git", "repo": "r", "path": "b"}
            ]"#,
        );
        assert_eq!(
            e,
            ManifestError::MissingField {
                index: 1,
                field: "rev"
            }
        );
    }

    #[test]
    fn null_value_counts_as_missing() {
        let e = invalid(r#"[{"vcs": null, "repo": "r", "rev": "1", "path": "a"}]"#);
        assert_eq!(
            e,
            ManifestError::MissingField {
                index: 0,
                field: "vcs"
            }
        );
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let e = invalid(r#"[{"vcs": "git", "repo": "  ", "rev": "1", "path": "a"}]"#);
        assert_eq!(
            e,
            ManifestError::MissingField {
                index: 0,
                field: "repo"
            }
        );
    }

    #[test]
    fn unsupported_vcs_is_rejected() {
        let e = invalid(r#"[{"vcs": "svn", "repo": "r", "rev": "1", "path": "a"}]"#);
        assert_eq!(
            e,
            ManifestError::UnsupportedVcsKind {
                index: 0,
                kind: "svn".to_string()
            }
        );
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let e = invalid(r#"[{"vcs": "git", "repo": "r", "rev": "1", "path": "a/../../etc"}]"#);
        assert!(matches!(e, ManifestError::UnsafePath { index: 0, .. }));
    }

    #[test]
    fn absolute_path_is_rejected() {
        let e = invalid(r#"[{"vcs": "git", "repo": "r", "rev": "1", "path": "/tmp/a"}]"#);
        assert!(matches!(e, ManifestError::UnsafePath { .. }));
    }

    #[test]
    fn current_dir_only_path_is_rejected() {
        let e = invalid(r#"[{"vcs": "git", "repo": "r", "rev": "1", "path": "./"}]"#);
        assert!(matches!(e, ManifestError::UnsafePath { .. }));
    }

    #[test]
    fn duplicate_paths_are_rejected_after_normalization() {
        let e = invalid(
            r#"[
                {"vcs": "git", "repo": "r1", "rev": "1", "path": "github.com/a/b"},
                {"vcs": "git", "repo": "r2", "rev": "2", "path": "./github.com/a/b/"}
            ]"#,
        );
        assert!(matches!(e, ManifestError::DuplicatePath { .. }));
    }

    #[test]
    fn revision_whitespace_is_trimmed() {
        let specs =
            parse(r#"[{"vcs": "git", "repo": "r", "rev": " deadbeef\n", "path": "a"}]"#).unwrap();
        assert_eq!(specs[0].revision, "deadbeef");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("deps.json")).unwrap_err();
        assert!(matches!(err, VendorError::ManifestRead { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deps.json");
        std::fs::write(
            &path,
            r#"[{"vcs":"git","repo":"https://example/a","rev":"deadbeef","path":"a"}]"#,
        )
        .unwrap();
        let specs = load(&path).unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn load_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deps.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load(&path).unwrap_err(),
            VendorError::ManifestParse { .. }
        ));
    }

    #[test]
    fn vcs_kind_programs() {
        assert_eq!(VcsKind::Git.program(), "git");
        assert_eq!(VcsKind::Mercurial.program(), "hg");
        assert_eq!(VcsKind::Mercurial.to_string(), "hg");
    }
}
