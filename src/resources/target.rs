//! A tracked file that can be swapped to its local override and back.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::git::GitIndex;
use crate::operations::FileSystemOps;

/// Observed state of one target, derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    /// Working tree holds the override bytes and the skip-worktree bit is set.
    Overridden,
    /// Working tree holds the committed bytes and the bit is clear.
    Original,
    /// The bytes/bit combination matches neither state.
    Drifted,
    /// The group's override file does not exist.
    Inactive,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overridden => "overridden",
            Self::Original => "original",
            Self::Drifted => "drifted",
            Self::Inactive => "inactive",
        })
    }
}

/// Where [`remove`](Applicable::remove) takes the original bytes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// `HEAD:target`, or the index entry for a path not committed yet.
    #[default]
    Committed,
    /// The index entry, so a staged edit survives a restore mid-commit.
    /// A staged copy of the override bytes counts as a leak and falls back
    /// to [`Baseline::Committed`].
    Staged,
}

/// One target file bound to the override that replaces it.
///
/// [`apply`](Applicable::apply) moves the target to
/// [`TargetState::Overridden`]; [`remove`](Applicable::remove) moves it back
/// to [`TargetState::Original`].  Both are idempotent and only touch the
/// working tree or the index when something actually differs.
#[derive(Debug, Clone, Copy)]
pub struct TargetResource<'a> {
    target: &'a str,
    override_path: &'a str,
    root: &'a Path,
    fs: &'a dyn FileSystemOps,
    git: &'a dyn GitIndex,
    baseline: Baseline,
}

impl<'a> TargetResource<'a> {
    /// Bind `target` (replaced by `override_path`) inside the working tree at
    /// `root`.
    #[must_use]
    pub const fn new(
        target: &'a str,
        override_path: &'a str,
        root: &'a Path,
        fs: &'a dyn FileSystemOps,
        git: &'a dyn GitIndex,
    ) -> Self {
        Self {
            target,
            override_path,
            root,
            fs,
            git,
            baseline: Baseline::Committed,
        }
    }

    /// Restore from `baseline` instead of the committed blob.
    #[must_use]
    pub const fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Repo-relative target path.
    #[must_use]
    pub const fn target(&self) -> &'a str {
        self.target
    }

    fn target_abs(&self) -> PathBuf {
        self.root.join(self.target)
    }

    fn override_abs(&self) -> PathBuf {
        self.root.join(self.override_path)
    }

    /// Working-tree bytes of the target, `None` when the file is absent.
    fn working_bytes(&self) -> Result<Option<Vec<u8>>> {
        read_optional(self.fs, &self.target_abs())
    }

    /// Bytes [`remove`](Applicable::remove) writes back, per the
    /// [`Baseline`].
    fn original_bytes(&self) -> Result<Vec<u8>> {
        let committed = || {
            self.git
                .read_committed(self.target)
                .with_context(|| format!("reading committed {}", self.target))
        };
        if self.baseline == Baseline::Committed {
            return committed();
        }
        let staged = self
            .git
            .read_staged(self.target)
            .with_context(|| format!("reading staged {}", self.target))?;
        let leaked = read_optional(self.fs, &self.override_abs())?
            .is_some_and(|override_bytes| override_bytes == staged);
        if leaked { committed() } else { Ok(staged) }
    }

    /// Whether the target is in its original state: working tree equal to
    /// the baseline bytes and the skip-worktree bit clear.
    ///
    /// Independent of the override file, so it also answers for inactive
    /// targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the path is not
    /// tracked, or git cannot be queried.
    pub fn is_original(&self) -> Result<bool> {
        if self.git.is_hidden(self.target)? {
            return Ok(false);
        }
        let original = self.original_bytes()?;
        Ok(self.working_bytes()?.as_deref() == Some(original.as_slice()))
    }

    /// Derive the current [`TargetState`].
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or git cannot be queried.
    pub fn observe(&self) -> Result<TargetState> {
        let Some(override_bytes) = read_optional(self.fs, &self.override_abs())? else {
            return Ok(TargetState::Inactive);
        };
        if self.git.is_hidden(self.target)? {
            if self.working_bytes()?.as_deref() == Some(override_bytes.as_slice()) {
                return Ok(TargetState::Overridden);
            }
            return Ok(TargetState::Drifted);
        }
        if self.is_original()? {
            return Ok(TargetState::Original);
        }
        Ok(TargetState::Drifted)
    }
}

/// Read `path`, mapping "not found" to `None`.
fn read_optional(fs: &dyn FileSystemOps, path: &Path) -> Result<Option<Vec<u8>>> {
    match fs.read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

impl Applicable for TargetResource<'_> {
    fn description(&self) -> String {
        format!("{} <- {}", self.target, self.override_path)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let Some(override_bytes) = read_optional(self.fs, &self.override_abs())? else {
            return Ok(ResourceChange::Skipped {
                reason: format!("override file {} missing", self.override_path),
            });
        };

        let mut changed = false;

        // Hide before writing so a failed write never leaves override
        // content visible to `git status`.
        if !self.git.is_hidden(self.target)? {
            self.git.set_hidden(self.target)?;
            changed = true;
        }

        if self.working_bytes()?.as_deref() != Some(override_bytes.as_slice()) {
            self.fs
                .write(&self.target_abs(), &override_bytes)
                .with_context(|| format!("writing override into {}", self.target))?;
            changed = true;
        }

        Ok(if changed {
            ResourceChange::Applied
        } else {
            ResourceChange::AlreadyCorrect
        })
    }

    fn remove(&self) -> Result<ResourceChange> {
        let original = self.original_bytes()?;

        let mut changed = false;

        // Restore content first; the bit is only cleared once the working
        // tree matches the index again.
        if self.working_bytes()?.as_deref() != Some(original.as_slice()) {
            self.fs
                .write(&self.target_abs(), &original)
                .with_context(|| format!("restoring {}", self.target))?;
            changed = true;
        }

        if self.git.is_hidden(self.target)? {
            self.git.clear_hidden(self.target)?;
            changed = true;
        }

        Ok(if changed {
            ResourceChange::Applied
        } else {
            ResourceChange::AlreadyCorrect
        })
    }
}

impl Resource for TargetResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(match self.observe()? {
            TargetState::Overridden => ResourceState::Correct,
            TargetState::Original => ResourceState::Missing,
            TargetState::Drifted => ResourceState::Incorrect {
                current: "working tree matches neither override nor committed content"
                    .to_string(),
            },
            TargetState::Inactive => ResourceState::Invalid {
                reason: format!("override file {} missing", self.override_path),
            },
        })
    }
}
