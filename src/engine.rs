//! Transition engine: apply and restore overrides across the working tree.
//!
//! [`Engine`] bundles everything a transition needs (config, repository
//! root, filesystem, git index, logger) and drives
//! [`TargetResource`]s through the two idempotent transitions:
//!
//! - **apply**: override bytes into the target, skip-worktree set
//! - **restore**: committed bytes into the target, skip-worktree cleared
//!
//! The composite operations walk the active groups in config order.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::config::{CONFIG_FILE_NAME, Config, OverrideGroup};
use crate::git::GitIndex;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::resolve;
use crate::resources::target::{Baseline, TargetResource};
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};

/// Counters accumulated over a batch of transitions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStats {
    /// Targets whose content or skip-worktree bit changed.
    pub changed: u32,
    /// Targets already in the requested state.
    pub already_ok: u32,
    /// Targets skipped (inactive, or failed under the lenient policy).
    pub skipped: u32,
}

impl TransitionStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    ///
    /// # Examples
    ///
    /// ```
    /// use local_overrides::engine::TransitionStats;
    ///
    /// let stats = TransitionStats { changed: 2, already_ok: 1, skipped: 0 };
    /// assert_eq!(stats.summary(false), "2 changed, 1 already ok");
    /// assert_eq!(stats.summary(true), "2 would change, 1 already ok");
    /// ```
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Total number of targets visited.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.changed + self.already_ok + self.skipped
    }

    /// Count one transition outcome.
    pub fn record(&mut self, change: &ResourceChange) {
        match change {
            ResourceChange::Applied => self.changed += 1,
            ResourceChange::AlreadyCorrect => self.already_ok += 1,
            ResourceChange::Skipped { .. } => self.skipped += 1,
        }
    }
}

impl std::ops::AddAssign for TransitionStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Direction of a single-target transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Apply,
    Restore,
}

impl Transition {
    const fn verb(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Restore => "restore",
        }
    }

    const fn past(self) -> &'static str {
        match self {
            Self::Apply => "applied",
            Self::Restore => "restored",
        }
    }
}

/// Shared state for one invocation's transitions.
pub struct Engine {
    config: Config,
    root: PathBuf,
    fs_ops: Arc<dyn FileSystemOps>,
    git: Arc<dyn GitIndex>,
    log: Arc<dyn Log>,
    dry_run: bool,
    bail_on_error: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("root", &self.root)
            .field("fs_ops", &self.fs_ops)
            .field("git", &self.git)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("bail_on_error", &self.bail_on_error)
            .finish()
    }
}

impl Engine {
    /// Create an engine that applies changes and propagates every error.
    #[must_use]
    pub fn new(
        config: Config,
        root: impl Into<PathBuf>,
        fs_ops: Arc<dyn FileSystemOps>,
        git: Arc<dyn GitIndex>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            config,
            root: root.into(),
            fs_ops,
            git,
            log,
            dry_run: false,
            bail_on_error: true,
        }
    }

    /// Preview transitions instead of performing them.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Warn and continue with the next target when a transition fails,
    /// counting the failure as skipped.
    #[must_use]
    pub const fn no_bail(mut self) -> Self {
        self.bail_on_error = false;
        self
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether transitions are only previewed.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Groups whose override file exists.
    #[must_use]
    pub fn active_groups(&self) -> Vec<&OverrideGroup> {
        resolve::active_groups(&self.config, &self.root, self.fs_ops.as_ref())
    }

    /// Bind `target` of `group` to this engine's filesystem and index.
    #[must_use]
    pub fn resource<'s>(&'s self, group: &'s OverrideGroup, target: &'s str) -> TargetResource<'s> {
        TargetResource::new(
            target,
            &group.override_path,
            &self.root,
            self.fs_ops.as_ref(),
            self.git.as_ref(),
        )
    }

    fn group_of(&self, target: &str) -> Result<&OverrideGroup> {
        self.config
            .group_for(target)
            .with_context(|| format!("{target} is not listed in {CONFIG_FILE_NAME}"))
    }

    /// Swap the override into `target`.
    ///
    /// Returns [`ResourceChange::Skipped`] when the target's override file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not configured, or if a file or git
    /// operation fails.
    pub fn apply(&self, target: &str) -> Result<ResourceChange> {
        let group = self.group_of(target)?;
        self.transition(&self.resource(group, target), Transition::Apply)
    }

    /// Put the committed content back into `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not configured or not tracked, or if
    /// a file or git operation fails.
    pub fn restore(&self, target: &str) -> Result<ResourceChange> {
        let group = self.group_of(target)?;
        self.transition(&self.resource(group, target), Transition::Restore)
    }

    /// Apply every active target.
    ///
    /// # Errors
    ///
    /// Returns the first transition error unless [`no_bail`](Self::no_bail)
    /// was set.
    pub fn apply_all(&self) -> Result<TransitionStats> {
        self.run_active(Transition::Apply)
    }

    /// Restore every active target.
    ///
    /// # Errors
    ///
    /// Returns the first transition error unless [`no_bail`](Self::no_bail)
    /// was set.
    pub fn restore_all(&self) -> Result<TransitionStats> {
        self.run_active(Transition::Restore)
    }

    /// Prepare the index for a commit.
    ///
    /// Every active group with at least one member in `staged` is restored
    /// as a whole and each of its members is re-staged, so the commit
    /// captures a consistent snapshot of the entire group.  Members in
    /// `staged` keep their staged content; the others get `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns the first restore or restage error.
    pub fn grouped_restore_for_commit(&self, staged: &BTreeSet<String>) -> Result<TransitionStats> {
        let mut stats = TransitionStats::new();
        for group in self.active_groups() {
            if !group.targets.iter().any(|t| staged.contains(t)) {
                continue;
            }
            self.log.debug(&format!(
                "group {} has staged members; restoring {} target(s)",
                group.override_path,
                group.targets.len()
            ));
            for target in &group.targets {
                let baseline = if staged.contains(target) {
                    Baseline::Staged
                } else {
                    Baseline::Committed
                };
                let resource = self.resource(group, target).with_baseline(baseline);
                self.run_one(&resource, Transition::Restore, &mut stats)?;
                if self.dry_run {
                    self.log.dry_run(&format!("would restage: {target}"));
                } else {
                    self.git
                        .restage(target)
                        .with_context(|| format!("restaging {target}"))?;
                }
            }
        }
        Ok(stats)
    }

    /// [`grouped_restore_for_commit`](Self::grouped_restore_for_commit) for
    /// whatever is currently staged.
    ///
    /// # Errors
    ///
    /// Returns an error if the staged paths cannot be listed, or any error
    /// from the grouped restore.
    pub fn restore_staged_groups(&self) -> Result<TransitionStats> {
        let staged = self.git.staged_paths().context("listing staged paths")?;
        self.log.debug(&format!("{} path(s) staged", staged.len()));
        self.grouped_restore_for_commit(&staged)
    }

    fn run_active(&self, transition: Transition) -> Result<TransitionStats> {
        let mut stats = TransitionStats::new();
        for group in self.active_groups() {
            for target in &group.targets {
                self.run_one(&self.resource(group, target), transition, &mut stats)?;
            }
        }
        Ok(stats)
    }

    /// Run one transition, applying the error policy.
    fn run_one(
        &self,
        resource: &TargetResource<'_>,
        transition: Transition,
        stats: &mut TransitionStats,
    ) -> Result<()> {
        match self.transition(resource, transition) {
            Ok(change) => stats.record(&change),
            Err(e) if !self.bail_on_error => {
                self.log.warn(&format!(
                    "failed to {} {}: {e:#}",
                    transition.verb(),
                    resource.target()
                ));
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn transition(
        &self,
        resource: &TargetResource<'_>,
        transition: Transition,
    ) -> Result<ResourceChange> {
        if self.dry_run {
            return self.preview(resource, transition);
        }

        let desc = resource.description();
        let change = match transition {
            Transition::Apply => resource.apply()?,
            Transition::Restore => resource.remove()?,
        };
        match &change {
            ResourceChange::Applied => self.log.debug(&format!("{}: {desc}", transition.past())),
            ResourceChange::AlreadyCorrect => self.log.debug(&format!("ok: {desc}")),
            ResourceChange::Skipped { reason } => {
                self.log.debug(&format!("skipping {desc}: {reason}"));
            }
        }
        Ok(change)
    }

    fn preview(
        &self,
        resource: &TargetResource<'_>,
        transition: Transition,
    ) -> Result<ResourceChange> {
        let desc = resource.description();
        let pending = match transition {
            Transition::Apply => match resource.current_state()? {
                ResourceState::Correct => false,
                ResourceState::Invalid { reason } => {
                    self.log.debug(&format!("skipping {desc}: {reason}"));
                    return Ok(ResourceChange::Skipped { reason });
                }
                ResourceState::Missing | ResourceState::Incorrect { .. } => true,
            },
            Transition::Restore => !resource.is_original()?,
        };
        if pending {
            self.log.dry_run(&format!("would {}: {desc}", transition.verb()));
            Ok(ResourceChange::Applied)
        } else {
            self.log.debug(&format!("ok: {desc}"));
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}
