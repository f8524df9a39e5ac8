//! The `.env` shell hint that puts the vendor tree on `GOPATH`.
use std::path::Path;

use crate::error::VendorError;

/// Name of the hint file, relative to the invocation directory.
pub const ENV_FILE: &str = ".env";

/// Exact content written to [`ENV_FILE`].
pub const ENV_EXPORT: &str = "export GOPATH=$(pwd)/_vendor:$GOPATH";

/// Printed after a fresh `.env` has been written.
pub const ENV_TIPS: &str = "Written \"export GOPATH=$(pwd)/_vendor:$GOPATH\" into .env\n\
You can autoload .env file with \"https://github.com/kennethreitz/autoenv\"\n";

/// Outcome of [`write_env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvHint {
    /// The file was created.
    Written,
    /// A file already existed and was left untouched.
    Existing,
}

/// Write `<base>/.env` unless it already exists.
///
/// # Errors
///
/// Returns [`VendorError::EnvHint`] if the existence check or the write fails.
pub fn write_env(base: &Path) -> Result<EnvHint, VendorError> {
    let path = base.join(ENV_FILE);
    if path
        .try_exists()
        .map_err(|source| VendorError::EnvHint { source })?
    {
        return Ok(EnvHint::Existing);
    }
    std::fs::write(&path, ENV_EXPORT).map_err(|source| VendorError::EnvHint { source })?;
    Ok(EnvHint::Written)
}
