//! Core logging types: per-dependency entries, status, and the [`Log`] trait.

/// Outcome of one dependency for summary reporting.
#[derive(Debug, Clone)]
pub struct DependencyEntry {
    /// Remote location of the dependency.
    pub remote: String,
    /// Final status.
    pub status: InstallStatus,
    /// Optional detail (revision, or error description).
    pub message: Option<String>,
}

/// Status of a reconciled dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    /// The checkout was cloned, reset, or re-cloned.
    Installed,
    /// The checkout already sat at the pinned revision.
    UpToDate,
    /// Reconciling failed; the run stopped here.
    Failed,
}

/// Abstraction over logging backends.
///
/// Reconcile code logs through this trait so tests can pass a logger that
/// never touches the terminal or the log file.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a dependency result for the summary.
    fn record(&self, remote: &str, status: InstallStatus, message: Option<&str>);
}
