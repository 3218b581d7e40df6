//! Subprocess execution behind an injectable [`Executor`].
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output (lossily decoded).
    pub stdout: String,
    /// Captured standard error (lossily decoded).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution so git plumbing can be faked in tests.
///
/// Exit status is reported in [`ExecResult`], not as an error; callers map
/// failures into their own error type.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` with `args` in `dir`, returning the result regardless
    /// of exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {program} in {}", dir.display()))?;
        Ok(ExecResult::from(output))
    }
}
