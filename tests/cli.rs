#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Tests that drive the `local-overrides` binary.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{TestRepo, git_available, group_repo};

/// Run the binary in `dir` with an isolated log directory.
fn run(dir: &Path, args: &[&str]) -> Output {
    let cache = tempfile::tempdir().expect("create cache dir");
    Command::new(env!("CARGO_BIN_EXE_local-overrides"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CACHE_HOME", cache.path())
        .output()
        .expect("run local-overrides")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn hooks_are_silent_no_ops_without_config() {
    let dir = tempfile::tempdir().unwrap();
    for args in [
        &["hook", "pre-commit"][..],
        &["hook", "post-commit"][..],
        &["hook", "post-checkout", "a", "b", "1"][..],
    ] {
        let output = run(dir.path(), args);
        assert!(output.status.success(), "{args:?}: {output:?}");
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }
}

#[test]
fn apply_and_restore_round_trip() {
    if !git_available() {
        return;
    }
    let repo = group_repo();

    let output = run(repo.root(), &["apply"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("2 changed"), "{}", stdout(&output));
    assert_eq!(repo.read("CLAUDE.md"), "my instructions\n");
    assert!(repo.is_skip_worktree("CLAUDE.md"));

    let output = run(repo.root(), &["restore", "CLAUDE.md"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(repo.read("CLAUDE.md"), "shared claude\n");
    assert!(!repo.is_skip_worktree("CLAUDE.md"));
    assert!(repo.is_skip_worktree("AGENTS.md"));
}

#[test]
fn dry_run_touches_nothing() {
    if !git_available() {
        return;
    }
    let repo = group_repo();
    let output = run(repo.root(), &["--dry-run", "apply"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("would apply"), "{}", stdout(&output));
    assert_eq!(repo.read("AGENTS.md"), "shared agents\n");
    assert!(!repo.is_skip_worktree("AGENTS.md"));
}

#[test]
fn apply_without_config_is_a_no_op() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.write("README.md", "docs\n");
    repo.commit_all("initial");
    let output = run(repo.root(), &["apply"]);
    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_config_exits_one() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.write(
        ".local-overrides.yaml",
        "files:\n  - override: a.local\n    replaces:\n      - a\n",
    );
    let output = run(repo.root(), &["apply"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("pattern"));

    let output = run(repo.root(), &["check"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(repo.root(), &["hook", "pre-commit"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(repo.root(), &["hook", "post-commit"]);
    assert!(output.status.success(), "{output:?}");
}

#[test]
fn list_json_reports_activity() {
    if !git_available() {
        return;
    }
    let repo = group_repo();
    let output = run(repo.root(), &["list", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["override"], "AGENTS.local.md");
    assert_eq!(value[0]["active"], true);
}

#[test]
fn suggest_outside_a_repository_uses_default_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["suggest", "docs/guide.md"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "docs/guide.local.md\n");
}
