//! [`GitIndex`] backed by a real repository.
//!
//! Blob reads go through libgit2 so binary content survives untouched.
//! Index mutations shell out to the `git` binary, which keeps the index
//! lock handling and hook environment identical to what the user's git
//! does.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::GitIndex;
use crate::error::GitError;
use crate::exec::{ExecResult, Executor, SystemExecutor};

/// Locate the working-tree root of the repository enclosing `start`.
///
/// # Errors
///
/// Returns [`GitError::NotARepository`] when `start` is not inside a
/// repository or the repository is bare.
pub fn discover_root(start: &Path) -> Result<PathBuf, GitError> {
    let repo = git2::Repository::discover(start).map_err(|e| {
        if e.code() == git2::ErrorCode::NotFound {
            GitError::NotARepository(start.display().to_string())
        } else {
            GitError::Libgit(e)
        }
    })?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| GitError::NotARepository(start.display().to_string()))?;
    Ok(dunce::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf()))
}

/// Production [`GitIndex`] for the repository at `root`.
#[derive(Debug, Clone)]
pub struct RepoGit {
    root: PathBuf,
    executor: Arc<dyn Executor>,
}

impl RepoGit {
    /// Create for the working tree at `root`, running the system `git`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_executor(root, Arc::new(SystemExecutor))
    }

    /// Create with a custom [`Executor`] (for testing).
    #[must_use]
    pub fn with_executor(root: impl Into<PathBuf>, executor: Arc<dyn Executor>) -> Self {
        Self {
            root: root.into(),
            executor,
        }
    }

    /// Run `git <args>` in the working tree, mapping failures to [`GitError`].
    fn git(&self, args: &[&str]) -> Result<ExecResult, GitError> {
        let command = format!("git {}", args.first().copied().unwrap_or_default());
        let result = self
            .executor
            .run_in(&self.root, "git", args)
            .map_err(|e| GitError::Spawn {
                command: command.clone(),
                reason: format!("{e:#}"),
            })?;
        if !result.success {
            return Err(GitError::CommandFailed {
                command,
                exit_code: result.code.unwrap_or(-1),
                stderr: result.stderr.trim().to_string(),
            });
        }
        Ok(result)
    }

    /// The index the running git command works on.
    ///
    /// Git points hooks at a temporary index through `GIT_INDEX_FILE` for
    /// `git commit <paths>`; otherwise this is the repository's own index.
    fn index(&self, repo: &git2::Repository) -> Result<git2::Index, GitError> {
        let index = std::env::var_os("GIT_INDEX_FILE")
            .filter(|v| !v.is_empty())
            .map_or_else(
                || repo.index(),
                |file| git2::Index::open(&self.root.join(file)),
            )?;
        Ok(index)
    }

    /// Stage-0 blob of `path` in [`index`](Self::index).
    fn index_blob(&self, repo: &git2::Repository, path: &str) -> Result<Vec<u8>, GitError> {
        let entry = self
            .index(repo)?
            .get_path(Path::new(path), 0)
            .ok_or_else(|| GitError::NotTracked(path.to_string()))?;
        let blob = repo.find_blob(entry.id)?;
        Ok(blob.content().to_vec())
    }
}

impl GitIndex for RepoGit {
    fn read_committed(&self, path: &str) -> Result<Vec<u8>, GitError> {
        let repo = git2::Repository::open(&self.root)?;

        // An unborn HEAD (fresh repository) falls through to the index.
        if let Ok(tree) = repo.head().and_then(|head| head.peel_to_tree())
            && let Ok(entry) = tree.get_path(Path::new(path))
        {
            let blob = repo.find_blob(entry.id())?;
            return Ok(blob.content().to_vec());
        }
        self.index_blob(&repo, path)
    }

    fn read_staged(&self, path: &str) -> Result<Vec<u8>, GitError> {
        let repo = git2::Repository::open(&self.root)?;
        self.index_blob(&repo, path)
    }

    fn staged_paths(&self) -> Result<BTreeSet<String>, GitError> {
        let result = self.git(&["diff", "--cached", "--name-only", "-z"])?;
        Ok(result
            .stdout
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect())
    }

    fn is_hidden(&self, path: &str) -> Result<bool, GitError> {
        // `ls-files -v` tags skip-worktree entries with `S`.
        let result = self.git(&["ls-files", "-v", "--", path])?;
        Ok(result
            .stdout
            .lines()
            .any(|line| line.starts_with("S ") || line.starts_with("s ")))
    }

    fn set_hidden(&self, path: &str) -> Result<(), GitError> {
        self.git(&["update-index", "--skip-worktree", "--", path]).map(drop)
    }

    fn clear_hidden(&self, path: &str) -> Result<(), GitError> {
        self.git(&["update-index", "--no-skip-worktree", "--", path]).map(drop)
    }

    fn restage(&self, path: &str) -> Result<(), GitError> {
        self.git(&["add", "--", path]).map(drop)
    }
}
