//! Subcommand orchestration.
//!
//! Each submodule exposes a `run` entry point called from [`dispatch`].
//! Commands that change the working tree (`apply`, `restore`, and the hook
//! adapters) return before logging is initialised when the repository has
//! no `.local-overrides.yaml`.
pub mod apply;
pub mod check;
pub mod hook;
pub mod list;
pub mod restore;
pub mod status;
pub mod suggest;
pub mod version;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::validation::ValidationWarning;
use crate::config::{Config, LoadedConfig, config_path};
use crate::engine::{Engine, TransitionStats};
use crate::error::{GitError, OverrideError};
use crate::git::{RepoGit, discover_root};
use crate::logging::{ConsoleStyle, Log, Logger, init_subscriber};
use crate::operations::SystemFileSystemOps;

/// Run the parsed command line.
///
/// # Errors
///
/// Returns any error from the selected command; `main` turns it into exit
/// code 1.
pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        verbose,
        global,
    } = cli;
    let mut stdout = std::io::stdout().lock();

    match command {
        Command::Version => version::run(&mut stdout),
        Command::Hook(hook) => hook::run(&global, verbose, &hook),
        Command::Apply(opts) => apply::run(&global, verbose, &opts),
        Command::Restore(opts) => restore::run(&global, verbose, &opts),
        Command::Suggest(opts) => suggest::run(&global, &opts, &mut stdout),
        Command::List(opts) => {
            let log = init_logging(verbose, "list");
            list::run(&global, &opts, log.as_ref(), &mut stdout)
        }
        Command::Status(opts) => {
            let log = init_logging(verbose, "status");
            status::run(&global, &opts, &log, &mut stdout)
        }
        Command::Check => {
            let log = init_logging(verbose, "check");
            check::run(&global, log.as_ref())
        }
    }
}

/// Install the tracing subscriber and return a logger for `command`.
#[must_use]
pub fn init_logging(verbose: bool, command: &str) -> Arc<dyn Log> {
    init_subscriber(verbose, command, ConsoleStyle::Interactive);
    Arc::new(Logger::new(command))
}

/// Like [`init_logging`], with console lines marked as coming from a hook.
///
/// Returns the concrete [`Logger`] so a failing hook can point at its log
/// file.
#[must_use]
pub fn init_hook_logging(verbose: bool, hook: &str) -> Arc<Logger> {
    init_subscriber(verbose, hook, ConsoleStyle::Hook);
    Arc::new(Logger::new(hook))
}

/// Determine the repository root.
///
/// An explicit `--root` wins; otherwise the working tree enclosing the
/// current directory is discovered.
///
/// # Errors
///
/// Returns [`GitError::NotARepository`] when no working tree encloses the
/// current directory.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf, GitError> {
    if let Some(root) = &global.root {
        return Ok(dunce::canonicalize(root).unwrap_or_else(|_| root.clone()));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| GitError::NotARepository(format!("current directory: {e}")))?;
    discover_root(&cwd)
}

/// Whether `root` has a config file.
#[must_use]
pub fn is_configured(root: &Path) -> bool {
    config_path(root).is_file()
}

/// Root, config, and load warnings for one invocation.
#[derive(Debug)]
pub struct Session {
    /// Repository root.
    pub root: PathBuf,
    /// Validated configuration.
    pub config: Config,
    /// Non-fatal problems found while loading the config.
    pub warnings: Vec<ValidationWarning>,
}

impl Session {
    /// Load the config of the repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::Config`] if the config file is unreadable or
    /// fails validation.
    pub fn open(root: PathBuf) -> Result<Self, OverrideError> {
        let LoadedConfig { config, warnings } = Config::load(&config_path(&root))?;
        Ok(Self {
            root,
            config,
            warnings,
        })
    }

    /// Log the load warnings.
    ///
    /// User-facing commands surface them as warnings; hooks pass
    /// `quiet = true` and log them at debug level so every commit does not
    /// repeat them on the terminal.
    pub fn report_warnings(&self, log: &dyn Log, quiet: bool) {
        if self.warnings.is_empty() {
            return;
        }
        let emit = |msg: &str| {
            if quiet {
                log.debug(msg);
            } else {
                log.warn(msg);
            }
        };
        emit(&format!(
            "found {} configuration warning(s):",
            self.warnings.len()
        ));
        for warning in &self.warnings {
            emit(&format!("  {warning}"));
        }
    }

    /// Build an [`Engine`] over the real filesystem and repository.
    #[must_use]
    pub fn into_engine(self, log: Arc<dyn Log>, dry_run: bool) -> Engine {
        let git = Arc::new(RepoGit::new(&self.root));
        Engine::new(
            self.config,
            self.root,
            Arc::new(SystemFileSystemOps),
            git,
            log,
        )
        .with_dry_run(dry_run)
    }
}

/// Shared body of `apply` and `restore`: load, report, run, summarise.
///
/// Returns `Ok(())` without initialising logging when the repository has
/// no config file.
fn run_transition(
    global: &GlobalOpts,
    verbose: bool,
    command: &str,
    stage: &str,
    run: impl FnOnce(&Engine) -> Result<TransitionStats>,
) -> Result<()> {
    let root = resolve_root(global)?;
    if !is_configured(&root) {
        return Ok(());
    }

    let log = init_logging(verbose, command);
    let session = Session::open(root)?;
    session.report_warnings(log.as_ref(), false);

    log.stage(stage);
    let engine = session.into_engine(Arc::clone(&log), global.dry_run);
    let stats = run(&engine)?;
    log.info(&stats.summary(global.dry_run));
    Ok(())
}

/// Write `value` as pretty JSON followed by a newline.
fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("serializing JSON")?;
    writeln!(out)?;
    Ok(())
}
