// Shared helpers for integration tests.
//
// Provides a throwaway git repository in a temporary directory so each
// integration test runs against real plumbing without touching the
// developer's checkout.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::Context as _;

use local_overrides::cli::GlobalOpts;
use local_overrides::commands::{Session, resolve_root};
use local_overrides::engine::Engine;
use local_overrides::exec::{Executor, SystemExecutor};
use local_overrides::logging::Logger;

/// Whether a usable `git` binary is on PATH.  Tests skip themselves when it
/// is not.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// A git repository in a [`tempfile::TempDir`], deleted on drop.
pub struct TestRepo {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl TestRepo {
    /// Initialise an empty repository with a committer identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        let repo = Self { _dir: dir, root };
        repo.git(&["init", "-q"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    /// Path to the repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git in the repository and return its stdout, failing the test
    /// on a non-zero exit.
    pub fn git(&self, args: &[&str]) -> String {
        let result = SystemExecutor
            .run_in(&self.root, "git", args)
            .with_context(|| format!("spawning git {}", args.join(" ")))
            .expect("git could not be run");
        assert!(
            result.success,
            "git {} failed: {}",
            args.join(" "),
            result.stderr.trim()
        );
        result.stdout
    }

    /// Write `contents` to the repo-relative path `rel`.
    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, contents).expect("write file");
        self
    }

    /// Working-tree content of `rel`.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("read file")
    }

    /// Stage everything and commit.
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
    }

    /// Content of `rel` in the index.
    pub fn staged(&self, rel: &str) -> String {
        self.git(&["show", &format!(":{rel}")])
    }

    /// Whether the skip-worktree bit of `rel` is set.
    pub fn is_skip_worktree(&self, rel: &str) -> bool {
        self.git(&["ls-files", "-v", "--", rel]).starts_with("S ")
    }

    /// Build an engine over this repository the way the CLI does.
    pub fn engine(&self) -> Engine {
        let global = GlobalOpts {
            root: Some(self.root.clone()),
            ..GlobalOpts::default()
        };
        let root = resolve_root(&global).expect("resolve root");
        Session::open(root)
            .expect("open session")
            .into_engine(Arc::new(Logger::new("test")), false)
    }
}

/// Config with one override replacing two targets.
pub const GROUP_CONFIG: &str = "\
pattern: .local
files:
  - override: AGENTS.local.md
    replaces:
      - AGENTS.md
      - CLAUDE.md
";

/// A committed repository with [`GROUP_CONFIG`], both targets committed,
/// and the override file present but untracked.
pub fn group_repo() -> TestRepo {
    let repo = TestRepo::new();
    repo.write(".local-overrides.yaml", GROUP_CONFIG)
        .write("AGENTS.md", "shared agents\n")
        .write("CLAUDE.md", "shared claude\n")
        .write(".gitignore", "*.local.md\n");
    repo.commit_all("initial");
    repo.write("AGENTS.local.md", "my instructions\n");
    repo
}
