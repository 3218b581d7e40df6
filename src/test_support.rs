//! Shared fixture for engine and command unit tests.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::engine::Engine;
use crate::git::{GitIndex, MemoryGit};
use crate::logging::{Log, RecordingLog};
use crate::operations::{FileSystemOps, MockFileSystemOps};

/// Repository root used by every in-memory fixture.
pub const ROOT: &str = "/repo";

/// Two groups: `AGENTS.local.md` replaces `AGENTS.md` and `CLAUDE.md`;
/// `config.local.toml` replaces `config.toml`.
pub const CONFIG: &str = "\
pattern: .local
files:
  - override: AGENTS.local.md
    replaces:
      - AGENTS.md
      - CLAUDE.md
  - override: config.local.toml
    replaces:
      - config.toml
";

/// In-memory working tree, index, and log.
///
/// All three targets are committed; only `AGENTS.local.md` exists, so the
/// `config.toml` group is inactive.
#[derive(Debug)]
pub struct Fixture {
    pub fs: Arc<MockFileSystemOps>,
    pub git: Arc<MemoryGit>,
    pub log: Arc<RecordingLog>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(|git| git)
    }

    /// Like [`new`](Self::new), letting the caller adjust the fake index.
    pub fn build(customize: impl FnOnce(MemoryGit) -> MemoryGit) -> Self {
        let fs = Arc::new(
            MockFileSystemOps::new()
                .with_file("/repo/AGENTS.md", "agents committed\n")
                .with_file("/repo/CLAUDE.md", "claude committed\n")
                .with_file("/repo/config.toml", "config committed\n")
                .with_file("/repo/AGENTS.local.md", "my instructions\n"),
        );
        let git = MemoryGit::new(ROOT, Arc::clone(&fs))
            .with_committed("AGENTS.md", "agents committed\n")
            .with_committed("CLAUDE.md", "claude committed\n")
            .with_committed("config.toml", "config committed\n");
        Self {
            fs,
            git: Arc::new(customize(git)),
            log: Arc::new(RecordingLog::new()),
        }
    }

    pub fn config(&self) -> Config {
        Config::parse(CONFIG).unwrap().config
    }

    pub fn engine(&self) -> Engine {
        Engine::new(
            self.config(),
            ROOT,
            Arc::clone(&self.fs) as Arc<dyn FileSystemOps>,
            Arc::clone(&self.git) as Arc<dyn GitIndex>,
            Arc::clone(&self.log) as Arc<dyn Log>,
        )
    }

    /// Working-tree content of `rel`, empty when absent.
    pub fn file(&self, rel: &str) -> String {
        self.fs
            .contents(Path::new(ROOT).join(rel))
            .unwrap_or_default()
    }

    pub fn write(&self, rel: &str, contents: &str) {
        self.fs
            .write(&Path::new(ROOT).join(rel), contents.as_bytes())
            .unwrap();
    }
}
