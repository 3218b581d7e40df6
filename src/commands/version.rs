//! Command: print version information.
use std::io::Write;

use anyhow::Result;

/// Version string baked in by `build.rs`, falling back to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("LOCAL_OVERRIDES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to `out`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn run(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "local-overrides {}", version())?;
    Ok(())
}
