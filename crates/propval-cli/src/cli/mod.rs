//! CLI argument definitions using the clap derive API.
//!
//! Only argument names, help text and value enums live here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "propval",
    bin_name = "propval",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Replay validation message scenarios for content editors",
    long_about = "Propval drives per-property validation message presenters \
                  from a JSON event script and reports what each field displays.",
    after_help = "EXAMPLES:\n\
        \x20 propval replay scripts/resubmit.json\n\
        \x20 propval replay scripts/resubmit.json --format json\n\
        \x20 propval check scripts/resubmit.json\n\
        \x20 propval completions bash > /usr/share/bash-completion/completions/propval",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run an event script against an edit session.
    #[command(
        visible_alias = "r",
        about = "Replay an event script",
        after_help = "EXAMPLES:\n\
            \x20 propval replay scenario.json\n\
            \x20 propval replay scenario.json --format json > transcript.json\n\
            \x20 propval replay scenario.json --fallback-message 'Fix this field'"
    )]
    Replay(ReplayArgs),

    /// Validate a script without running it.
    #[command(
        about = "Check an event script",
        after_help = "EXAMPLES:\n\
            \x20 propval check scenario.json"
    )]
    Check(CheckArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 propval completions bash > ~/.local/share/bash-completion/completions/propval\n\
            \x20 propval completions zsh  > ~/.zfunc/_propval\n\
            \x20 propval completions fish > ~/.config/fish/completions/propval.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Propval configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 propval config get presenter.fallback_message\n\
            \x20 propval config list\n\
            \x20 propval config path"
    )]
    Config(ConfigCommands),
}

// ── replay ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the JSON event script.
    #[arg(value_name = "SCRIPT", help = "Event script to replay")]
    pub script: PathBuf,

    /// Transcript format; defaults to `output.format` from the configuration.
    #[arg(long = "format", value_enum, help = "Transcript format")]
    pub format: Option<ReplayFormat>,

    /// Override `presenter.fallback_message` for this run.
    #[arg(
        long = "fallback-message",
        value_name = "TEXT",
        help = "Message shown for invalid fields without a server message"
    )]
    pub fallback_message: Option<String>,

    /// Start from a form that has not been evaluated yet.
    #[arg(long = "unevaluated", help = "Start with an unevaluated form")]
    pub unevaluated: bool,
}

/// How `replay` renders its transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ReplayFormat {
    /// Step-by-step listing with a field table.
    Human,
    /// The full transcript as JSON.
    Json,
}

impl std::fmt::Display for ReplayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ReplayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

// ── check ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the JSON event script.
    #[arg(value_name = "SCRIPT", help = "Event script to check")]
    pub script: PathBuf,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `presenter.fallback_message`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path of the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_replay_command() {
        let cli = Cli::parse_from(["propval", "replay", "s.json", "--format", "json"]);
        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.script, PathBuf::from("s.json"));
                assert_eq!(args.format, Some(ReplayFormat::Json));
                assert!(!args.unevaluated);
            }
            other => panic!("expected Replay, got {other:?}"),
        }
    }

    #[test]
    fn replay_alias() {
        let cli = Cli::parse_from(["propval", "r", "s.json"]);
        assert!(matches!(cli.command, Commands::Replay(_)));
    }

    #[test]
    fn replay_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<ReplayFormat>(), Ok(ReplayFormat::Json));
        assert!("yaml".parse::<ReplayFormat>().is_err());
        assert_eq!(ReplayFormat::Human.to_string(), "human");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["propval", "check", "s.json", "-vv", "--no-color"]);
        assert_eq!(cli.global.verbose, 2);
        assert!(cli.global.no_color);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["propval", "--quiet", "--verbose", "config", "list"]);
        assert!(result.is_err());
    }
}
