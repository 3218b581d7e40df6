//! Command: show the observed state of every configured target.
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::{Session, resolve_root, write_json};
use crate::cli::{GlobalOpts, StatusOpts};
use crate::engine::Engine;
use crate::logging::Log;
use crate::resources::target::TargetState;

/// One target's observed state.
#[derive(Debug, Serialize)]
pub struct StatusRow {
    /// Repo-relative target path.
    pub target: String,
    /// Override file that replaces it.
    #[serde(rename = "override")]
    pub override_path: String,
    /// Observed state; `None` when it could not be determined.
    pub state: Option<TargetState>,
    /// Why the state could not be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the repository root cannot be found, the config is
/// invalid, or writing the output fails.
pub fn run(
    global: &GlobalOpts,
    opts: &StatusOpts,
    log: &Arc<dyn Log>,
    out: &mut dyn Write,
) -> Result<()> {
    let root = resolve_root(global)?;
    let session = Session::open(root)?;
    session.report_warnings(log.as_ref(), false);
    let engine = session.into_engine(Arc::clone(log), global.dry_run);

    let rows = collect(&engine);
    if rows.is_empty() {
        log.info("no override groups configured");
    }
    render(&rows, opts.json, out)
}

/// Observe every target of every group, in config order.
#[must_use]
pub fn collect(engine: &Engine) -> Vec<StatusRow> {
    let config = engine.config();
    let mut rows = Vec::with_capacity(config.target_count());
    for group in &config.groups {
        for target in &group.targets {
            let (state, error) = engine.resource(group, target).observe().map_or_else(
                |e| (None, Some(format!("{e:#}"))),
                |state| (Some(state), None),
            );
            rows.push(StatusRow {
                target: target.clone(),
                override_path: group.override_path.clone(),
                state,
                error,
            });
        }
    }
    rows
}

/// Write `rows` as aligned text or JSON.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render(rows: &[StatusRow], json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        return write_json(out, &rows);
    }
    for row in rows {
        let state = row
            .state
            .map_or_else(|| "error".to_string(), |s| s.to_string());
        write!(out, "{state:<10} {} <- {}", row.target, row.override_path)?;
        if let Some(error) = &row.error {
            write!(out, " ({error})")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
