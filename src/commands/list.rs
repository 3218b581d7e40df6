//! Command: list configured override groups.
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::{Session, resolve_root, write_json};
use crate::cli::{GlobalOpts, ListOpts};
use crate::config::{Config, OverrideGroup};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resolve;

/// One row of `list --json`.
#[derive(Debug, Serialize)]
struct GroupEntry<'a> {
    #[serde(flatten)]
    group: &'a OverrideGroup,
    active: bool,
}

/// Run the list command.
///
/// # Errors
///
/// Returns an error if the repository root cannot be found or the config is
/// invalid.
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &dyn Log, out: &mut dyn Write) -> Result<()> {
    let root = resolve_root(global)?;
    let session = Session::open(root)?;
    session.report_warnings(log, false);
    if session.config.groups.is_empty() {
        log.info("no override groups configured");
    }
    render(
        &session.config,
        &session.root,
        &SystemFileSystemOps,
        opts.json,
        out,
    )
}

/// Write every group with its activity, as text or JSON.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render(
    config: &Config,
    root: &Path,
    fs: &dyn FileSystemOps,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let entries: Vec<GroupEntry<'_>> = config
        .groups
        .iter()
        .map(|group| GroupEntry {
            group,
            active: resolve::is_active(group, root, fs),
        })
        .collect();

    if json {
        return write_json(out, &entries);
    }
    for entry in &entries {
        let activity = if entry.active { "active" } else { "inactive" };
        writeln!(out, "{} ({activity})", entry.group.override_path)?;
        for target in &entry.group.targets {
            writeln!(out, "  {target}")?;
        }
    }
    Ok(())
}
