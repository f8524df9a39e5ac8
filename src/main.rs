//! `vendorpin` binary: vendor pinned dependencies listed in a JSON manifest.
use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;

use vendorpin::cli::Cli;
use vendorpin::commands;
use vendorpin::exec::SystemExecutor;
use vendorpin::logging::{self, Logger};

/// Confirmation printed once every dependency is in place.
const DONE: &str = "Dependencies written into _vendor/src";

fn run(args: &Cli, log: &Logger, out: &mut dyn Write) -> Result<()> {
    let base = std::env::current_dir().context("resolving current directory")?;
    let report = commands::install::run(&args.manifest, &base, &SystemExecutor, log, out)?;
    log.debug(&format!(
        "{} installed, {} up to date",
        report.installed, report.up_to_date
    ));
    Ok(())
}

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let log_file = logging::log_file_path();
    logging::init_subscriber(args.verbose, log_file.as_deref());
    let log = Logger::new(log_file);

    let mut stdout = std::io::stdout().lock();
    let result = run(&args, &log, &mut stdout);
    log.print_summary();
    match result.and_then(|()| writeln!(stdout, "{DONE}").context("writing to stdout")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
