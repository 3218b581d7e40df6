//! Idempotent resource primitives (check + apply pattern).
//!
//! The only resource kind is [`target::TargetResource`]: a tracked file
//! whose working-tree content and skip-worktree bit are swapped between the
//! committed version and a local override.
pub mod target;

use anyhow::Result;

/// Minimal interface for resources that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Move the resource into its desired state.
    ///
    /// Must be idempotent: applying an already-applied resource returns
    /// [`ResourceChange::AlreadyCorrect`] without side effects.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O or git
    /// failures.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo a previous [`apply`](Self::apply), with the same idempotency.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be removed due to I/O or git
    /// failures.
    fn remove(&self) -> Result<ResourceChange>;
}

/// State of a resource relative to its desired (applied) state.
///
/// # Examples
///
/// ```
/// use local_overrides::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let drifted = ResourceState::Incorrect { current: "content differs".into() };
///
/// assert_ne!(missing, correct);
/// assert_ne!(drifted, correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// The desired state is not in place.
    Missing,
    /// The resource matches the desired state.
    Correct,
    /// The resource is neither applied nor pristine.
    Incorrect {
        /// Description of what differs.
        current: String,
    },
    /// The resource cannot be applied (e.g. its source file is absent).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying or removing a resource.
///
/// # Examples
///
/// ```
/// use local_overrides::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "override file missing".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// assert_ne!(noop, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Content or index state was changed.
    Applied,
    /// Nothing needed to change.
    AlreadyCorrect,
    /// The change was not attempted.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Resources that can inspect their own state.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined due to I/O or git
    /// failures.
    fn current_state(&self) -> Result<ResourceState>;
}
