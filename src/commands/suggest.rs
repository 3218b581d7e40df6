//! Command: print the conventional override path for a tracked file.
use std::io::Write;
use std::path::Path;

use anyhow::Result;

use super::resolve_root;
use crate::cli::{GlobalOpts, SuggestOpts};
use crate::config::derive::derive_override_path;
use crate::config::{Config, DEFAULT_PATTERN, config_path};

/// Run the suggest command.
///
/// Works outside a repository too, falling back to the default pattern.
///
/// # Errors
///
/// Returns an error if the config exists but is invalid, or writing fails.
pub fn run(global: &GlobalOpts, opts: &SuggestOpts, out: &mut dyn Write) -> Result<()> {
    let pattern = resolve_root(global).map_or_else(
        |_| Ok(DEFAULT_PATTERN.to_string()),
        |root| pattern_for(&root),
    )?;
    writeln!(out, "{}", derive_override_path(&opts.path, &pattern))?;
    Ok(())
}

/// Naming pattern of the repository at `root`, or the default when it has
/// no config file.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or invalid.
pub fn pattern_for(root: &Path) -> Result<String> {
    let loaded = Config::load(&config_path(root))?;
    if loaded.config.pattern.is_empty() {
        return Ok(DEFAULT_PATTERN.to_string());
    }
    Ok(loaded.config.pattern)
}
