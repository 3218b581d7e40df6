//! Structural validation of a parsed config.
//!
//! [`validate`] turns a [`RawDocument`] into a [`Config`], failing on the
//! two fatal conditions (missing pattern, a target replaced by two override
//! files) and collecting everything else as [`ValidationWarning`]s.
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path};

use super::parser::RawDocument;
use super::{Config, LoadedConfig, OverrideGroup};
use crate::error::ConfigError;

/// A non-fatal problem detected while loading the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// 1-based line number in the config file, when known.
    pub line: Option<usize>,
    /// The specific value that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning not tied to a specific line.
    #[must_use]
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: None,
            item: item.into(),
            message: message.into(),
        }
    }

    /// Create a warning for a specific config line.
    #[must_use]
    pub fn at_line(line: usize, item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            ..Self::new(item, message)
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line} [{}]: {}", self.item, self.message),
            None => write!(f, "[{}]: {}", self.item, self.message),
        }
    }
}

/// Validate a parsed document and build the normalized [`Config`].
///
/// Paths are normalized to the form git prints them in (`./A.md` becomes
/// `A.md`) before any comparison.  Entries sharing an override path are
/// merged into the first one, and a target repeated within one group is
/// kept once.  Both are reported as warnings.
///
/// # Errors
///
/// - [`ConfigError::MissingPattern`] if `pattern:` is absent or empty.
/// - [`ConfigError::DuplicateTarget`] if a target is listed under two
///   different override paths, whichever group lists it first.
pub fn validate(document: RawDocument) -> Result<LoadedConfig, ConfigError> {
    let RawDocument {
        pattern,
        entries,
        mut warnings,
    } = document;

    let pattern = pattern
        .filter(|p| !p.is_empty())
        .ok_or(ConfigError::MissingPattern)?;

    let mut groups: Vec<OverrideGroup> = Vec::new();
    // target -> override path of the group that owns it
    let mut owners: HashMap<String, String> = HashMap::new();

    for entry in entries {
        let override_path = normalize_path(&entry.override_path);
        let index = match groups.iter().position(|g| g.override_path == override_path) {
            Some(index) => {
                warnings.push(ValidationWarning::at_line(
                    entry.line,
                    &override_path,
                    "override file declared more than once; entries merged",
                ));
                index
            }
            None => {
                groups.push(OverrideGroup {
                    override_path: override_path.clone(),
                    targets: Vec::new(),
                });
                groups.len() - 1
            }
        };

        for target in entry.targets.iter().map(|t| normalize_path(t)) {
            match owners.get(&target) {
                Some(owner) if *owner == override_path => {
                    warnings.push(ValidationWarning::at_line(
                        entry.line,
                        &target,
                        "target listed more than once for the same override",
                    ));
                }
                Some(owner) => {
                    return Err(ConfigError::DuplicateTarget {
                        path: target,
                        first: owner.clone(),
                        second: override_path,
                    });
                }
                None => {
                    owners.insert(target.clone(), override_path.clone());
                    if let Some(group) = groups.get_mut(index) {
                        group.targets.push(target);
                    }
                }
            }
        }
    }

    let config = Config { pattern, groups };
    warnings.extend(lint(&config));
    Ok(LoadedConfig { config, warnings })
}

/// Collect non-fatal warnings for an already-valid config.
#[must_use]
pub fn lint(config: &Config) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for group in &config.groups {
        if group.targets.is_empty() {
            warnings.push(ValidationWarning::new(
                &group.override_path,
                "no targets listed under `replaces:`; override is inert",
            ));
        }

        if !is_repo_relative(&group.override_path) {
            warnings.push(ValidationWarning::new(
                &group.override_path,
                "override path should be relative to the repository root",
            ));
        }

        for target in &group.targets {
            if !is_repo_relative(target) {
                warnings.push(ValidationWarning::new(
                    target,
                    "target path should be relative to the repository root",
                ));
            }
            if config.group_by_override(target).is_some() {
                warnings.push(ValidationWarning::new(
                    target,
                    "target is also declared as an override file",
                ));
            }
        }
    }

    warnings
}

/// A path that stays inside the repository: relative, no `..` components.
fn is_repo_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.has_root()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Rewrite a repo-relative path the way git reports it: `.` components
/// dropped, `/` separators.  Paths escaping the repository are returned
/// unchanged for [`lint`] to flag.
fn normalize_path(path: &str) -> String {
    if !is_repo_relative(path) {
        return path.to_string();
    }
    let parts: Vec<_> = Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return path.to_string();
    }
    parts.join("/")
}
