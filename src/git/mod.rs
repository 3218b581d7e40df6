//! Git plumbing used by the transition engine.
//!
//! Everything the engine needs from git is behind [`GitIndex`]:
//! reading committed or staged content, listing staged paths, toggling the
//! skip-worktree bit, and re-staging a path.  [`RepoGit`] is the production
//! implementation; tests use the in-memory `MemoryGit`.
mod repo;

pub use repo::{RepoGit, discover_root};

use std::collections::BTreeSet;

use crate::error::GitError;

/// The git operations the override engine depends on.
///
/// Paths are repo-relative with `/` separators, exactly as they appear in
/// the config file and in `git diff --name-only` output.
pub trait GitIndex: std::fmt::Debug {
    /// Committed content of `path`: the `HEAD` blob, or the staged blob when
    /// the path is not in `HEAD` yet.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotTracked`] when the path is in neither, or any
    /// underlying repository error.
    fn read_committed(&self, path: &str) -> Result<Vec<u8>, GitError>;

    /// Content of `path` in the index (stage 0): what the next commit
    /// would record for it.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotTracked`] when the path is not in the index,
    /// or any underlying repository error.
    fn read_staged(&self, path: &str) -> Result<Vec<u8>, GitError>;

    /// Paths staged for the next commit (`git diff --cached --name-only`).
    ///
    /// # Errors
    ///
    /// Returns an error if the git command fails.
    fn staged_paths(&self) -> Result<BTreeSet<String>, GitError>;

    /// Whether the skip-worktree bit is set for `path`.
    ///
    /// Returns `false` for paths absent from the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read.
    fn is_hidden(&self, path: &str) -> Result<bool, GitError>;

    /// Set the skip-worktree bit for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the git command fails (e.g. the path is untracked).
    fn set_hidden(&self, path: &str) -> Result<(), GitError>;

    /// Clear the skip-worktree bit for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the git command fails.
    fn clear_hidden(&self, path: &str) -> Result<(), GitError>;

    /// Stage the current working-tree content of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the git command fails.
    fn restage(&self, path: &str) -> Result<(), GitError>;
}

/// In-memory [`GitIndex`] for unit tests.
///
/// Holds committed blobs, the staged set, and the skip-worktree set.
/// [`restage`](GitIndex::restage) copies the working-tree bytes from the
/// attached [`MockFileSystemOps`](crate::operations::MockFileSystemOps)
/// into the staged-content map so tests can check what a commit would
/// capture.
#[cfg(test)]
#[derive(Debug)]
pub struct MemoryGit {
    root: std::path::PathBuf,
    fs: std::sync::Arc<crate::operations::MockFileSystemOps>,
    committed: std::collections::HashMap<String, Vec<u8>>,
    staged: std::sync::Mutex<std::collections::BTreeMap<String, Vec<u8>>>,
    hidden: std::sync::Mutex<BTreeSet<String>>,
    fail_set_hidden: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MemoryGit {
    /// Create a fake repository rooted at `root` over `fs`.
    #[must_use]
    pub fn new(
        root: impl Into<std::path::PathBuf>,
        fs: std::sync::Arc<crate::operations::MockFileSystemOps>,
    ) -> Self {
        Self {
            root: root.into(),
            fs,
            committed: std::collections::HashMap::new(),
            staged: std::sync::Mutex::new(std::collections::BTreeMap::new()),
            hidden: std::sync::Mutex::new(BTreeSet::new()),
            fail_set_hidden: false,
        }
    }

    /// Record `contents` as the committed blob for `path`.
    #[must_use]
    pub fn with_committed(mut self, path: &str, contents: &str) -> Self {
        self.committed
            .insert(path.to_string(), contents.as_bytes().to_vec());
        self
    }

    /// Mark `path` as staged with `contents`.
    #[must_use]
    pub fn with_staged(self, path: &str, contents: &str) -> Self {
        self.staged
            .lock()
            .expect("staged poisoned")
            .insert(path.to_string(), contents.as_bytes().to_vec());
        self
    }

    /// Mark `path` as having the skip-worktree bit set.
    #[must_use]
    pub fn with_hidden(self, path: &str) -> Self {
        self.hidden
            .lock()
            .expect("hidden poisoned")
            .insert(path.to_string());
        self
    }

    /// Make every [`GitIndex::set_hidden`] call fail.
    #[must_use]
    pub const fn failing_set_hidden(mut self) -> Self {
        self.fail_set_hidden = true;
        self
    }

    /// Staged content of `path` as UTF-8, if staged.
    #[must_use]
    pub fn staged_content(&self, path: &str) -> Option<String> {
        self.staged
            .lock()
            .expect("staged poisoned")
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
    }

    /// Whether `path` currently has the skip-worktree bit.
    #[must_use]
    pub fn hidden_now(&self, path: &str) -> bool {
        self.hidden.lock().expect("hidden poisoned").contains(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl GitIndex for MemoryGit {
    fn read_committed(&self, path: &str) -> Result<Vec<u8>, GitError> {
        if let Some(blob) = self.committed.get(path) {
            return Ok(blob.clone());
        }
        self.staged
            .lock()
            .expect("staged poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::NotTracked(path.to_string()))
    }

    fn read_staged(&self, path: &str) -> Result<Vec<u8>, GitError> {
        if let Some(blob) = self.staged.lock().expect("staged poisoned").get(path) {
            return Ok(blob.clone());
        }
        self.committed
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::NotTracked(path.to_string()))
    }

    fn staged_paths(&self) -> Result<BTreeSet<String>, GitError> {
        Ok(self
            .staged
            .lock()
            .expect("staged poisoned")
            .keys()
            .cloned()
            .collect())
    }

    fn is_hidden(&self, path: &str) -> Result<bool, GitError> {
        Ok(self.hidden_now(path))
    }

    fn set_hidden(&self, path: &str) -> Result<(), GitError> {
        if self.fail_set_hidden {
            return Err(GitError::CommandFailed {
                command: "git update-index --skip-worktree".to_string(),
                exit_code: 128,
                stderr: format!("fatal: Unable to mark file {path}"),
            });
        }
        self.hidden
            .lock()
            .expect("hidden poisoned")
            .insert(path.to_string());
        Ok(())
    }

    fn clear_hidden(&self, path: &str) -> Result<(), GitError> {
        self.hidden.lock().expect("hidden poisoned").remove(path);
        Ok(())
    }

    fn restage(&self, path: &str) -> Result<(), GitError> {
        use crate::operations::FileSystemOps as _;
        let bytes = self
            .fs
            .read(&self.root.join(path))
            .map_err(|_| GitError::NotTracked(path.to_string()))?;
        self.staged
            .lock()
            .expect("staged poisoned")
            .insert(path.to_string(), bytes);
        Ok(())
    }
}
