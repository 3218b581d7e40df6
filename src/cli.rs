//! Command-line interface: verbs, hook subcommands, and global options.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "local-overrides",
    about = "Keep personal, uncommitted variants of tracked files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without touching files or the index
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Repository root (defaults to the repository enclosing the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Swap overrides into their targets and hide them from git
    Apply(TargetOpts),
    /// Put the committed content back and unhide the targets
    Restore(TargetOpts),
    /// List configured override groups
    List(ListOpts),
    /// Show the state of every configured target
    Status(StatusOpts),
    /// Print the conventional override path for a file
    Suggest(SuggestOpts),
    /// Validate the config file
    Check,
    /// Entry points invoked by the installed git hooks
    #[command(subcommand)]
    Hook(HookCommand),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name; also used as the log file name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Restore(_) => "restore",
            Self::List(_) => "list",
            Self::Status(_) => "status",
            Self::Suggest(_) => "suggest",
            Self::Check => "check",
            Self::Hook(hook) => hook.name(),
            Self::Version => "version",
        }
    }
}

/// Target selection for `apply` and `restore`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetOpts {
    /// Only these targets (repo-relative); all active targets when omitted
    pub targets: Vec<String>,
}

/// Options for the `list` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ListOpts {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Options for the `status` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct StatusOpts {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Options for the `suggest` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SuggestOpts {
    /// Repo-relative path of the tracked file
    pub path: String,
}

/// Git hook entry points.
#[derive(Subcommand, Debug, Clone)]
pub enum HookCommand {
    /// Called by git after `checkout`/`switch`
    PostCheckout(PostCheckoutArgs),
    /// Called by git before recording a commit
    PreCommit,
    /// Called by git after recording a commit
    PostCommit,
}

impl HookCommand {
    /// Hook name as git knows it; also used as the log file name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PostCheckout(_) => "post-checkout",
            Self::PreCommit => "pre-commit",
            Self::PostCommit => "post-commit",
        }
    }
}

/// Arguments git passes to `post-checkout`.
#[derive(Args, Debug, Clone)]
pub struct PostCheckoutArgs {
    /// Ref of the previous HEAD
    pub old_ref: String,
    /// Ref of the new HEAD
    pub new_ref: String,
    /// `1` for a branch checkout, `0` for a file checkout
    pub flag: String,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_apply_all() {
        let cli = Cli::parse_from(["local-overrides", "apply"]);
        assert!(matches!(&cli.command, Command::Apply(opts) if opts.targets.is_empty()));
    }

    #[test]
    fn parse_restore_with_targets() {
        let cli = Cli::parse_from(["local-overrides", "restore", "AGENTS.md", "CLAUDE.md"]);
        assert!(
            matches!(&cli.command, Command::Restore(opts) if opts.targets == ["AGENTS.md", "CLAUDE.md"])
        );
    }

    #[test]
    fn parse_dry_run_short() {
        let cli = Cli::parse_from(["local-overrides", "-d", "apply"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["local-overrides", "status", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Status(StatusOpts { json: false })));
        assert_eq!(cli.command.name(), "status");
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["local-overrides", "--root", "/tmp/repo", "check"]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/repo")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn parse_list_json() {
        let cli = Cli::parse_from(["local-overrides", "list", "--json"]);
        assert!(matches!(cli.command, Command::List(ListOpts { json: true })));
    }

    #[test]
    fn parse_suggest_requires_path() {
        assert!(Cli::try_parse_from(["local-overrides", "suggest"]).is_err());
        let cli = Cli::parse_from(["local-overrides", "suggest", "docs/guide.md"]);
        assert!(matches!(&cli.command, Command::Suggest(o) if o.path == "docs/guide.md"));
    }

    #[test]
    fn parse_post_checkout_hook() {
        let cli = Cli::parse_from([
            "local-overrides",
            "hook",
            "post-checkout",
            "abc123",
            "def456",
            "1",
        ]);
        assert!(
            matches!(
                &cli.command,
                Command::Hook(HookCommand::PostCheckout(args))
                    if args.old_ref == "abc123" && args.new_ref == "def456" && args.flag == "1"
            ),
            "got {:?}",
            cli.command
        );
    }

    #[test]
    fn post_checkout_requires_three_arguments() {
        assert!(
            Cli::try_parse_from(["local-overrides", "hook", "post-checkout", "a", "b"]).is_err()
        );
    }

    #[test]
    fn parse_commit_hooks() {
        let cli = Cli::parse_from(["local-overrides", "hook", "pre-commit"]);
        assert!(matches!(cli.command, Command::Hook(HookCommand::PreCommit)));
        assert_eq!(cli.command.name(), "pre-commit");
        let cli = Cli::parse_from(["local-overrides", "hook", "post-commit"]);
        assert!(matches!(cli.command, Command::Hook(HookCommand::PostCommit)));
    }

    #[test]
    fn hook_names_match_git() {
        assert_eq!(HookCommand::PreCommit.name(), "pre-commit");
        assert_eq!(HookCommand::PostCommit.name(), "post-commit");
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["local-overrides", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
