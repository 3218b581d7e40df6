//! Command: git hook adapters.
//!
//! | Hook            | Runs when           | Action                          |
//! |-----------------|---------------------|---------------------------------|
//! | `post-checkout` | branch checkout     | apply every active target       |
//! | `pre-commit`    | always              | restore groups with staged members |
//! | `post-commit`   | always              | apply every active target       |
//!
//! `pre-commit` fails closed: any error aborts the commit.  The `post-*`
//! hooks cannot undo what git already did, so they log failures and exit 0.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{Session, init_hook_logging, is_configured};
use crate::cli::{GlobalOpts, HookCommand};
use crate::engine::Engine;
use crate::logging::Log;

/// Run a hook adapter.
///
/// Returns immediately, before logging is initialised or git is touched,
/// when the hook has nothing to do: a file checkout, or a repository
/// without a config file.
///
/// # Errors
///
/// Only `pre-commit` returns errors; the other hooks log them instead.
pub fn run(global: &GlobalOpts, verbose: bool, hook: &HookCommand) -> Result<()> {
    if !wants_run(hook) {
        return Ok(());
    }
    let root = hook_root(global)?;
    if !is_configured(&root) {
        return Ok(());
    }

    let logger = init_hook_logging(verbose, hook.name());
    let log = Arc::clone(&logger) as Arc<dyn Log>;
    let result = Session::open(root)
        .map_err(anyhow::Error::from)
        .and_then(|session| {
            session.report_warnings(log.as_ref(), true);
            let engine = session.into_engine(Arc::clone(&log), global.dry_run);
            execute(hook, &prepare(hook, engine), log.as_ref())
        });
    settle(hook, result, log.as_ref(), logger.log_path())
}

/// Whether `hook` has any work to do given its arguments.
///
/// `post-checkout` only acts on branch checkouts (flag `1`); file
/// checkouts (flag `0`) are ignored.
#[must_use]
pub fn wants_run(hook: &HookCommand) -> bool {
    match hook {
        HookCommand::PostCheckout(args) => args.flag == "1",
        HookCommand::PreCommit | HookCommand::PostCommit => true,
    }
}

/// Git runs hooks from the top of the working tree, so the current
/// directory is the root unless `--root` says otherwise.
fn hook_root(global: &GlobalOpts) -> Result<PathBuf> {
    global.root.clone().map_or_else(
        || std::env::current_dir().context("reading current directory"),
        Ok,
    )
}

/// Apply the per-hook error policy to the engine.
fn prepare(hook: &HookCommand, engine: Engine) -> Engine {
    match hook {
        HookCommand::PreCommit => engine,
        HookCommand::PostCheckout(_) | HookCommand::PostCommit => engine.no_bail(),
    }
}

/// Perform the hook's transition.
///
/// # Errors
///
/// Returns any transition error.
pub fn execute(hook: &HookCommand, engine: &Engine, log: &dyn Log) -> Result<()> {
    let stats = match hook {
        HookCommand::PostCheckout(_) | HookCommand::PostCommit => engine.apply_all()?,
        HookCommand::PreCommit => engine.restore_staged_groups()?,
    };
    if stats.total() > 0 {
        log.debug(&format!(
            "{}: {}",
            hook.name(),
            stats.summary(engine.is_dry_run())
        ));
    }
    Ok(())
}

/// Turn the hook result into the process outcome.
///
/// A `pre-commit` failure names `log_file` so the user can find the full
/// run after git has printed the error.
fn settle(
    hook: &HookCommand,
    result: Result<()>,
    log: &dyn Log,
    log_file: Option<&Path>,
) -> Result<()> {
    const ABORTED: &str = "local-overrides pre-commit hook failed; commit aborted";
    match (hook, result) {
        (_, Ok(())) => Ok(()),
        (HookCommand::PreCommit, Err(e)) => Err(e.context(log_file.map_or_else(
            || ABORTED.to_string(),
            |path| format!("{ABORTED} (log: {})", path.display()),
        ))),
        (_, Err(e)) => {
            log.warn(&format!("{} hook failed: {e:#}", hook.name()));
            Ok(())
        }
    }
}
