//! Command-line interface definition.
use std::path::PathBuf;

use clap::Parser;

use crate::manifest::DEFAULT_MANIFEST;

/// Version reported by `--version`: the build-time tag when available.
const VERSION: &str = match option_env!("VENDORPIN_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "vendorpin",
    about = "Vendor pinned git and mercurial dependencies into _vendor/src",
    version = VERSION
)]
pub struct Cli {
    /// Dependency manifest to read
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
