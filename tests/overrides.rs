#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! End-to-end transitions against real git repositories.
//!
//! Each test builds a throwaway repository with the `git` binary and drives
//! the engine through [`Session`](local_overrides::commands::Session), the
//! same path the CLI and hooks take.

mod common;

use common::*;
use local_overrides::commands::hook;
use local_overrides::cli::HookCommand;
use local_overrides::logging::Logger;
use local_overrides::resources::target::TargetState;

macro_rules! require_git {
    () => {
        if !git_available() {
            return;
        }
    };
}

// ---------------------------------------------------------------------------
// Single target
// ---------------------------------------------------------------------------

#[test]
fn single_target_apply_and_restore() {
    require_git!();
    let repo = TestRepo::new();
    repo.write(
        ".local-overrides.yaml",
        "pattern: .local\nfiles:\n  - override: config.local.toml\n    replaces:\n      - config.toml\n",
    )
    .write("config.toml", "shared = true\n");
    repo.commit_all("initial");
    repo.write("config.local.toml", "shared = false\n");

    let engine = repo.engine();
    let stats = engine.apply_all().unwrap();
    assert_eq!(stats.changed, 1);
    assert_eq!(repo.read("config.toml"), "shared = false\n");
    assert!(repo.is_skip_worktree("config.toml"));
    assert!(
        !repo.git(&["status", "--porcelain"]).contains("config.toml"),
        "hidden target must not show as modified"
    );

    let stats = engine.restore_all().unwrap();
    assert_eq!(stats.changed, 1);
    assert_eq!(repo.read("config.toml"), "shared = true\n");
    assert!(!repo.is_skip_worktree("config.toml"));
    assert_eq!(repo.git(&["status", "--porcelain", "--", "config.toml"]), "");
}

#[test]
fn apply_twice_changes_nothing_the_second_time() {
    require_git!();
    let repo = group_repo();
    let engine = repo.engine();
    engine.apply_all().unwrap();
    let stats = engine.apply_all().unwrap();
    assert_eq!(stats.changed, 0);
    assert_eq!(stats.already_ok, 2);
}

#[test]
fn inactive_group_is_left_alone() {
    require_git!();
    let repo = group_repo();
    std::fs::remove_file(repo.root().join("AGENTS.local.md")).unwrap();
    let stats = repo.engine().apply_all().unwrap();
    assert_eq!(stats.total(), 0);
    assert_eq!(repo.read("AGENTS.md"), "shared agents\n");
    assert!(!repo.is_skip_worktree("AGENTS.md"));
}

#[test]
fn status_tracks_each_state() {
    require_git!();
    let repo = group_repo();
    let engine = repo.engine();
    let group = &engine.config().groups[0];

    assert_eq!(
        engine.resource(group, "AGENTS.md").observe().unwrap(),
        TargetState::Original
    );
    engine.apply("AGENTS.md").unwrap();
    assert_eq!(
        engine.resource(group, "AGENTS.md").observe().unwrap(),
        TargetState::Overridden
    );
    repo.write("AGENTS.md", "edited while hidden\n");
    assert_eq!(
        engine.resource(group, "AGENTS.md").observe().unwrap(),
        TargetState::Drifted
    );
}

// ---------------------------------------------------------------------------
// Grouped restore before commit
// ---------------------------------------------------------------------------

#[test]
fn pre_commit_captures_committed_content_for_whole_group() {
    require_git!();
    let repo = group_repo();

    // Override bytes leak into the index for one member before the bit is set.
    repo.write("AGENTS.md", "my instructions\n");
    repo.git(&["add", "AGENTS.md"]);
    repo.engine().apply_all().unwrap();
    assert_eq!(repo.staged("AGENTS.md"), "my instructions\n");

    let log = Logger::new("pre-commit");
    hook::execute(&HookCommand::PreCommit, &repo.engine(), &log).unwrap();

    assert_eq!(repo.staged("AGENTS.md"), "shared agents\n");
    assert_eq!(repo.staged("CLAUDE.md"), "shared claude\n");
    assert_eq!(repo.read("AGENTS.md"), "shared agents\n");
    assert_eq!(repo.read("CLAUDE.md"), "shared claude\n");
    assert!(!repo.is_skip_worktree("AGENTS.md"));
    assert!(!repo.is_skip_worktree("CLAUDE.md"));

    repo.git(&["commit", "-q", "--allow-empty", "-m", "no leak"]);
    assert_eq!(repo.git(&["show", "HEAD:AGENTS.md"]), "shared agents\n");

    hook::execute(&HookCommand::PostCommit, &repo.engine(), &log).unwrap();
    assert_eq!(repo.read("CLAUDE.md"), "my instructions\n");
    assert!(repo.is_skip_worktree("CLAUDE.md"));
}

#[test]
fn pre_commit_ignores_unrelated_staged_files() {
    require_git!();
    let repo = group_repo();
    repo.engine().apply_all().unwrap();
    repo.write("README.md", "docs\n");
    repo.git(&["add", "README.md"]);

    let log = Logger::new("pre-commit");
    hook::execute(&HookCommand::PreCommit, &repo.engine(), &log).unwrap();

    assert!(repo.is_skip_worktree("AGENTS.md"));
    assert_eq!(repo.read("AGENTS.md"), "my instructions\n");
}

#[test]
fn pre_commit_keeps_a_deliberately_staged_edit() {
    require_git!();
    let repo = group_repo();
    let engine = repo.engine();
    engine.apply_all().unwrap();
    engine.restore("AGENTS.md").unwrap();
    repo.write("AGENTS.md", "new shared agents\n");
    repo.git(&["add", "AGENTS.md"]);

    let log = Logger::new("pre-commit");
    hook::execute(&HookCommand::PreCommit, &repo.engine(), &log).unwrap();

    assert_eq!(repo.staged("AGENTS.md"), "new shared agents\n");
    assert_eq!(repo.read("AGENTS.md"), "new shared agents\n");
    assert_eq!(repo.staged("CLAUDE.md"), "shared claude\n");
    assert_eq!(repo.read("CLAUDE.md"), "shared claude\n");
    assert!(!repo.is_skip_worktree("CLAUDE.md"));

    repo.git(&["commit", "-q", "-m", "update shared agents"]);
    assert_eq!(repo.git(&["show", "HEAD:AGENTS.md"]), "new shared agents\n");
    assert_eq!(repo.git(&["show", "HEAD:CLAUDE.md"]), "shared claude\n");
}

#[test]
fn pre_commit_matches_dot_prefixed_targets_against_git_paths() {
    require_git!();
    let repo = TestRepo::new();
    repo.write(
        ".local-overrides.yaml",
        "pattern: .local\nfiles:\n  - override: ./C.local.md\n    replaces:\n      - ./A.md\n      - B.md\n",
    )
    .write("A.md", "shared a\n")
    .write("B.md", "shared b\n");
    repo.commit_all("initial");
    repo.write("C.local.md", "mine\n");

    // The override bytes reach the index before the bit is ever set.
    repo.write("A.md", "mine\n");
    repo.git(&["add", "A.md"]);

    let engine = repo.engine();
    assert_eq!(engine.config().groups[0].targets, ["A.md", "B.md"]);
    engine.apply_all().unwrap();

    let log = Logger::new("pre-commit");
    hook::execute(&HookCommand::PreCommit, &repo.engine(), &log).unwrap();

    assert_eq!(repo.staged("A.md"), "shared a\n");
    assert_eq!(repo.staged("B.md"), "shared b\n");
    assert!(!repo.is_skip_worktree("A.md"));
}
