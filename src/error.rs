//! Domain-specific error types for the override engine.
//!
//! Internal modules return typed errors ([`ConfigError`], [`GitError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! OverrideError
//! ├── Config(ConfigError) — missing pattern, duplicate target, unreadable file
//! └── Git(GitError)       — plumbing command failures, untracked paths
//! ```
//!
//! An absent config file and an absent override file are *not* errors: the
//! first is a no-op, the second simply makes a group inactive.

use thiserror::Error;

/// Top-level error type for the override engine.
#[derive(Error, Debug)]
pub enum OverrideError {
    /// The config file is structurally invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A git plumbing call failed.
    #[error("Git error: {0}")]
    Git(#[from] GitError),
}

/// Fatal errors raised while loading `.local-overrides.yaml`.
///
/// Recoverable problems (an unparseable list entry, an empty `replaces:`
/// list) are reported as
/// [`ValidationWarning`](crate::config::validation::ValidationWarning)s
/// instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The top-level `pattern:` key is absent or empty.
    #[error("missing required pattern field")]
    MissingPattern,

    /// The same target path is listed under two different override files.
    #[error("duplicate target `{path}`: replaced by both `{first}` and `{second}`")]
    DuplicateTarget {
        /// The target listed twice.
        path: String,
        /// Override path of the group that declared the target first.
        first: String,
        /// Override path of the group that declared it again.
        second: String,
    },

    /// The config file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by the git plumbing layer.
#[derive(Error, Debug)]
pub enum GitError {
    /// A `git` subprocess exited non-zero.
    #[error("{command} failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        /// The command line that was run (e.g. `git update-index`).
        command: String,
        /// Exit code returned by the process (`-1` when killed by a signal).
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// The `git` binary could not be started.
    #[error("failed to execute {command}: {reason}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// Why the process could not be started.
        reason: String,
    },

    /// The path exists neither in `HEAD` nor in the index.
    #[error("path is not tracked by git: {0}")]
    NotTracked(String),

    /// No repository with a working tree encloses the given directory.
    #[error("not inside a git working tree: {0}")]
    NotARepository(String),

    /// An error reported by libgit2.
    #[error(transparent)]
    Libgit(#[from] git2::Error),
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn missing_pattern_display() {
        assert_eq!(
            ConfigError::MissingPattern.to_string(),
            "missing required pattern field"
        );
    }

    #[test]
    fn duplicate_target_display_names_both_groups() {
        let e = ConfigError::DuplicateTarget {
            path: "AGENTS.md".to_string(),
            first: "AGENTS.local.md".to_string(),
            second: "shared.local.md".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("duplicate target `AGENTS.md`"), "{msg}");
        assert!(msg.contains("AGENTS.local.md"));
        assert!(msg.contains("shared.local.md"));
    }

    #[test]
    fn config_io_error_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/repo/.local-overrides.yaml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/repo/.local-overrides.yaml"));
        assert!(e.source().is_some());
    }

    #[test]
    fn command_failed_display() {
        let e = GitError::CommandFailed {
            command: "git update-index".to_string(),
            exit_code: 128,
            stderr: "fatal: Unable to mark file".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "git update-index failed (exit 128): fatal: Unable to mark file"
        );
    }

    #[test]
    fn not_tracked_display() {
        let e = GitError::NotTracked("docs/new.md".to_string());
        assert_eq!(e.to_string(), "path is not tracked by git: docs/new.md");
    }

    #[test]
    fn override_error_from_config_error() {
        let e: OverrideError = ConfigError::MissingPattern.into();
        assert!(e.to_string().contains("Configuration error"));
        assert!(e.to_string().contains("pattern"));
    }

    #[test]
    fn override_error_from_git_error() {
        let e: OverrideError = GitError::NotTracked("a".to_string()).into();
        assert!(e.to_string().contains("Git error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<OverrideError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<GitError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _config: anyhow::Error = ConfigError::MissingPattern.into();
        let _git: anyhow::Error = GitError::NotTracked("x".to_string()).into();
    }
}
