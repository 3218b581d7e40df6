//! Which targets currently have a live override.
//!
//! A group is *active* when its override file exists in the working tree;
//! only the targets of active groups take part in transitions.
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{Config, OverrideGroup};
use crate::operations::FileSystemOps;

/// Whether `group`'s override file exists under `root`.
#[must_use]
pub fn is_active(group: &OverrideGroup, root: &Path, fs: &dyn FileSystemOps) -> bool {
    fs.exists(&root.join(&group.override_path))
}

/// Groups whose override file exists, in config order.
#[must_use]
pub fn active_groups<'c>(
    config: &'c Config,
    root: &Path,
    fs: &dyn FileSystemOps,
) -> Vec<&'c OverrideGroup> {
    config
        .groups
        .iter()
        .filter(|g| is_active(g, root, fs))
        .collect()
}

/// Every target of every active group.
#[must_use]
pub fn active_overrides(config: &Config, root: &Path, fs: &dyn FileSystemOps) -> BTreeSet<String> {
    active_groups(config, root, fs)
        .into_iter()
        .flat_map(|g| g.targets.iter().cloned())
        .collect()
}

/// The distinct override paths declared in the config.
#[must_use]
pub fn override_files(config: &Config) -> BTreeSet<String> {
    config
        .groups
        .iter()
        .map(|g| g.override_path.clone())
        .collect()
}

/// Targets replaced by `override_path`; empty when no group declares it.
#[must_use]
pub fn targets_for(config: &Config, override_path: &str) -> BTreeSet<String> {
    config
        .group_by_override(override_path)
        .map(|g| g.targets.iter().cloned().collect())
        .unwrap_or_default()
}
