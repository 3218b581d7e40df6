//! The `.local-overrides.yaml` config model.
//!
//! A [`Config`] maps override files to the tracked targets they replace.  It
//! is read fresh from disk on every hook or CLI invocation; nothing is
//! cached between runs.
pub mod derive;
pub mod parser;
pub mod validation;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigError;
use validation::ValidationWarning;

/// File name of the per-repository config, relative to the repository root.
pub const CONFIG_FILE_NAME: &str = ".local-overrides.yaml";

/// Naming pattern used by `suggest` when no config exists yet.
pub const DEFAULT_PATTERN: &str = ".local";

/// One override file plus the tracked files it replaces.
///
/// # Examples
///
/// ```
/// use local_overrides::config::OverrideGroup;
///
/// let group = OverrideGroup {
///     override_path: "AGENTS.local.md".to_string(),
///     targets: vec!["AGENTS.md".to_string(), "CLAUDE.md".to_string()],
/// };
/// assert!(group.contains("CLAUDE.md"));
/// assert!(!group.contains("README.md"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideGroup {
    /// Repo-relative path of the untracked override file.
    #[serde(rename = "override")]
    pub override_path: String,
    /// Repo-relative tracked paths replaced by the override, in config order.
    pub targets: Vec<String>,
}

impl OverrideGroup {
    /// Whether `target` is one of this group's targets.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.targets.iter().any(|t| t == target)
    }
}

/// Parsed and validated configuration.
///
/// Targets are partitioned disjointly across groups: a target never appears
/// in two groups of a successfully parsed config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Naming pattern used to suggest override file names.
    pub pattern: String,
    /// Override groups in the order they appear in the file.
    pub groups: Vec<OverrideGroup>,
}

/// A config together with the non-fatal warnings produced while loading it.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    /// The validated configuration.
    pub config: Config,
    /// Recoverable problems (skipped lines, inert groups, suspicious paths).
    pub warnings: Vec<ValidationWarning>,
}

impl Config {
    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPattern`] when `pattern:` is absent or
    /// empty, and [`ConfigError::DuplicateTarget`] when a target is listed
    /// under two different override files.
    ///
    /// # Examples
    ///
    /// ```
    /// use local_overrides::config::Config;
    ///
    /// let text = "pattern: .local\nfiles:\n  - override: AGENTS.local.md\n    replaces:\n      - AGENTS.md\n";
    /// let loaded = Config::parse(text).unwrap();
    /// assert_eq!(loaded.config.pattern, ".local");
    /// assert_eq!(loaded.config.groups[0].targets, ["AGENTS.md"]);
    /// ```
    pub fn parse(content: &str) -> Result<LoadedConfig, ConfigError> {
        let document = parser::parse(content);
        validation::validate(document)
    }

    /// Load the config file at `path`.
    ///
    /// An absent file yields an empty config with no warnings; it is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or if its
    /// contents fail validation (see [`Config::parse`]).
    pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
        if !path.exists() {
            return Ok(LoadedConfig::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// The group that lists `target`, if any.
    #[must_use]
    pub fn group_for(&self, target: &str) -> Option<&OverrideGroup> {
        self.groups.iter().find(|g| g.contains(target))
    }

    /// The group keyed by `override_path`, if any.
    #[must_use]
    pub fn group_by_override(&self, override_path: &str) -> Option<&OverrideGroup> {
        self.groups.iter().find(|g| g.override_path == override_path)
    }

    /// Total number of targets across all groups.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.groups.iter().map(|g| g.targets.len()).sum()
    }
}

/// Location of the config file for the repository rooted at `root`.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}
