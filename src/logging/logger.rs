//! Structured logger with per-dependency summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{DependencyEntry, InstallStatus, Log};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger facade over [`tracing`] that also collects dependency results.
///
/// The log file itself is opened by
/// [`init_subscriber`](super::subscriber::init_subscriber); the logger only
/// remembers its path for the summary.
#[derive(Debug, Default)]
pub struct Logger {
    entries: Mutex<Vec<DependencyEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a dependency result for the summary.
    pub fn record(&self, remote: &str, status: InstallStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(DependencyEntry {
                remote: remote.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<DependencyEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log the summary of all recorded dependencies.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut installed = 0u32;
        let mut up_to_date = 0u32;
        let mut failed = 0u32;

        for entry in &entries {
            let (icon, color) = match entry.status {
                InstallStatus::Installed => {
                    installed += 1;
                    ("✓", "\x1b[32m")
                }
                InstallStatus::UpToDate => {
                    up_to_date += 1;
                    ("·", "\x1b[2m")
                }
                InstallStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.remote));
        }

        self.info(&format!(
            "{} dependencies: \x1b[32m{installed} installed\x1b[0m, \x1b[2m{up_to_date} up to date\x1b[0m, \x1b[31m{failed} failed\x1b[0m",
            entries.len()
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record(&self, remote: &str, status: InstallStatus, message: Option<&str>) {
        self.record(remote, status, message);
    }
}
