//! The install run: manifest to vendored checkouts.
//!
//! Log output goes through [`Log`]. The `.env` tips are user-facing text and
//! are written to the caller's output stream instead.
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use crate::env_hint::{self, ENV_TIPS, EnvHint};
use crate::error::VendorError;
use crate::exec::Executor;
use crate::logging::{InstallStatus, Log};
use crate::manifest::{self, DependencySpec};
use crate::resources::{self, ResourceChange};
use crate::vendor::VendorRoot;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Whether `.env` was written or already present.
    pub env_hint: EnvHint,
    /// Dependencies that were cloned, reset, or re-cloned.
    pub installed: usize,
    /// Dependencies already at their pinned revision.
    pub up_to_date: usize,
}

/// Vendor every dependency in `manifest_path` under `<base>/_vendor/src`.
///
/// Dependencies are reconciled one at a time in manifest order. The first
/// failure stops the run; dependencies reconciled before it stay on disk.
/// When `.env` is created, the tips explaining it are written to `out`.
///
/// # Errors
///
/// Returns a [`VendorError`] if the manifest cannot be read or validated, a
/// required VCS executable is missing, `.env` or the vendor root cannot be
/// written, `out` rejects the tips, or any dependency fails to install.
pub fn run(
    manifest_path: &Path,
    base: &Path,
    executor: &dyn Executor,
    log: &dyn Log,
    out: &mut dyn Write,
) -> Result<InstallReport, VendorError> {
    log.stage("Reading manifest");
    let specs = manifest::load(manifest_path)?;
    log.info(&format!(
        "{} dependencies in {}",
        specs.len(),
        manifest_path.display()
    ));

    preflight(&specs, executor)?;

    let env_hint = env_hint::write_env(base)?;
    match env_hint {
        EnvHint::Written => {
            writeln!(out, "{ENV_TIPS}").map_err(|source| VendorError::Output { source })?;
        }
        EnvHint::Existing => log.info(".env exists. Skipping..."),
    }

    let root = VendorRoot::create(base)?;
    log.debug(&format!("vendor root: {}", root.path().display()));

    log.stage("Installing dependencies");
    let mut report = InstallReport {
        env_hint,
        installed: 0,
        up_to_date: 0,
    };
    for spec in &specs {
        log.info(&format!("Installing {}", spec.remote));
        match resources::reconcile(spec, &root, executor, log) {
            Ok(ResourceChange::Applied) => {
                report.installed += 1;
                log.record(
                    &spec.remote,
                    InstallStatus::Installed,
                    Some(spec.revision.as_str()),
                );
            }
            Ok(ResourceChange::AlreadyCorrect) => {
                report.up_to_date += 1;
                log.record(
                    &spec.remote,
                    InstallStatus::UpToDate,
                    Some(spec.revision.as_str()),
                );
            }
            Err(source) => {
                let message = source.to_string();
                log.record(&spec.remote, InstallStatus::Failed, Some(message.as_str()));
                return Err(VendorError::Install {
                    remote: spec.remote.clone(),
                    source,
                });
            }
        }
    }

    Ok(report)
}

/// Fail before touching the filesystem if a required VCS tool is missing.
fn preflight(specs: &[DependencySpec], executor: &dyn Executor) -> Result<(), VendorError> {
    let programs: BTreeSet<&str> = specs.iter().map(|s| s.vcs_kind.program()).collect();
    match programs.into_iter().find(|p| !executor.which(p)) {
        Some(program) => Err(VendorError::MissingTool {
            program: program.to_string(),
        }),
        None => Ok(()),
    }
}
