//! Command: validate the config file.
use anyhow::{Context as _, Result};

use super::{Session, is_configured, resolve_root};
use crate::cli::GlobalOpts;
use crate::config::CONFIG_FILE_NAME;
use crate::logging::Log;

/// Run the check command.
///
/// A repository without a config file passes.  Warnings are reported but
/// do not fail the check; only fatal config errors do.
///
/// # Errors
///
/// Returns an error if the repository root cannot be found or the config
/// fails validation.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let root = resolve_root(global)?;
    if !is_configured(&root) {
        log.info(&format!("no {CONFIG_FILE_NAME}; nothing to check"));
        return Ok(());
    }

    log.stage(&format!("Checking {CONFIG_FILE_NAME}"));
    let session = Session::open(root).with_context(|| format!("{CONFIG_FILE_NAME} is invalid"))?;
    session.report_warnings(log, false);
    log.info(&format!(
        "config OK: {} group(s), {} target(s)",
        session.config.groups.len(),
        session.config.target_count()
    ));
    Ok(())
}
