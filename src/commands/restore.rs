//! Command: put the committed content back.
use anyhow::Result;

use super::run_transition;
use crate::cli::{GlobalOpts, TargetOpts};
use crate::engine::{Engine, TransitionStats};

/// Run the restore command.
///
/// Restores every active target, or only `opts.targets` when given.
///
/// # Errors
///
/// Returns an error if the repository root cannot be found, the config is
/// invalid, or a file or git operation fails.
pub fn run(global: &GlobalOpts, verbose: bool, opts: &TargetOpts) -> Result<()> {
    run_transition(global, verbose, "restore", "Restoring committed files", |engine| {
        restore_targets(engine, &opts.targets)
    })
}

/// Restore `targets`, or every active target when the list is empty.
///
/// Named targets are restored even when their override file is gone.
///
/// # Errors
///
/// Returns the first transition error, or an error if a named target is
/// not in the config.
pub fn restore_targets(engine: &Engine, targets: &[String]) -> Result<TransitionStats> {
    if targets.is_empty() {
        return engine.restore_all();
    }
    let mut stats = TransitionStats::new();
    for target in targets {
        stats.record(&engine.restore(target)?);
    }
    Ok(stats)
}
