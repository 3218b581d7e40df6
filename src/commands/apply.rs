//! Command: swap overrides into their targets.
use anyhow::Result;

use super::run_transition;
use crate::cli::{GlobalOpts, TargetOpts};
use crate::engine::{Engine, TransitionStats};

/// Run the apply command.
///
/// Applies every active target, or only `opts.targets` when given.
///
/// # Errors
///
/// Returns an error if the repository root cannot be found, the config is
/// invalid, or a file or git operation fails.
pub fn run(global: &GlobalOpts, verbose: bool, opts: &TargetOpts) -> Result<()> {
    run_transition(global, verbose, "apply", "Applying overrides", |engine| {
        apply_targets(engine, &opts.targets)
    })
}

/// Apply `targets`, or every active target when the list is empty.
///
/// # Errors
///
/// Returns the first transition error, or an error if a named target is
/// not in the config.
pub fn apply_targets(engine: &Engine, targets: &[String]) -> Result<TransitionStats> {
    if targets.is_empty() {
        return engine.apply_all();
    }
    let mut stats = TransitionStats::new();
    for target in targets {
        stats.record(&engine.apply(target)?);
    }
    Ok(stats)
}
