//! Local overrides for tracked files.
//!
//! Keeps personal, uncommitted variants of tracked files (an `AGENTS.md`
//! with your own instructions, a `config.toml` pointing at your machine)
//! swapped into the working tree while git keeps seeing, staging, and
//! committing the shared version.  The mapping lives in
//! `.local-overrides.yaml` at the repository root.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate `.local-overrides.yaml`
//! - **[`resolve`]**: which groups are active (their override file exists)
//! - **[`resources`]** and **[`engine`]**: idempotent apply/restore
//!   transitions over a working tree and a [`git::GitIndex`]
//! - **[`commands`]**: CLI verbs and the git hook adapters
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod git;
pub mod logging;
pub mod operations;
pub mod resolve;
pub mod resources;

#[cfg(test)]
pub(crate) mod test_support;
