//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Report every flagged i18n record
//! - `list`: List identifiers with their values and usages
//! - `locate`: Find the span of an identifier occurrence in one template
//! - `fix`: List, preview or apply fix actions for flagged records
//! - `watch`: Keep the index live and print notifications as problems change
//! - `init`: Write a default configuration file
//! - `serve`: Start the MCP server for AI integration

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Check(cmd)) => Some(&cmd.common),
            Some(Command::List(cmd)) => Some(&cmd.common),
            Some(Command::Locate(cmd)) => Some(&cmd.common),
            Some(Command::Fix(cmd)) => Some(&cmd.common),
            Some(Command::Watch(cmd)) => Some(&cmd.common),
            Some(Command::Init(cmd)) => Some(&cmd.common),
            Some(Command::Serve) | None => None,
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|common| common.verbose)
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root; the config file is looked up from here
    #[arg(long, env = "NGI18N_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only list identifiers starting with this prefix
    pub prefix: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct LocateCommand {
    /// Template file, relative to the project root
    pub file: PathBuf,

    /// Translation identifier, e.g. @@greeting
    pub id: String,

    /// Zero-based occurrence of the identifier within the file
    #[arg(long, default_value_t = 0)]
    pub occurrence: usize,

    /// Locate the translated content instead of the identifier
    #[arg(long)]
    pub content: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct FixCommand {
    /// Identifier of the flagged record
    #[arg(long, requires_all = ["index", "action"])]
    pub id: Option<String>,

    /// Position of the record among the identifier's records
    #[arg(long, requires = "id")]
    pub index: Option<usize>,

    /// Fix action id, as printed by `check` or `fix`
    #[arg(long, requires = "id")]
    pub action: Option<String>,

    /// Actually write the fix (default is dry-run)
    #[arg(long, requires = "id")]
    pub apply: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Quiet period before re-validating after a burst of changes
    #[arg(long, default_value_t = 150)]
    pub debounce_ms: u64,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check templates for i18n problems
    Check(CheckCommand),
    /// List translation identifiers with their values and usages
    List(ListCommand),
    /// Print the span of an identifier occurrence in a template
    Locate(LocateCommand),
    /// Show or apply fixes for flagged records
    Fix(FixCommand),
    /// Watch templates and report when problems change
    Watch(WatchCommand),
    /// Initialize a new .ngi18nrc.json configuration file
    Init(InitCommand),
    /// Start MCP server for AI coding agents
    Serve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn test_fix_requires_index_and_action_with_id() {
        let err = Arguments::try_parse_from(["ngi18n", "fix", "--id", "@@a"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args = Arguments::try_parse_from([
            "ngi18n", "fix", "--id", "@@a", "--index", "1", "--action", "flatten", "--apply",
        ])
        .unwrap();
        match args.command {
            Some(Command::Fix(cmd)) => {
                assert_eq!(cmd.index, Some(1));
                assert!(cmd.apply);
            }
            _ => panic!("expected fix command"),
        }
    }

    #[test]
    fn test_locate_defaults() {
        let args = Arguments::try_parse_from(["ngi18n", "locate", "a.html", "@@x", "-v"]).unwrap();
        assert!(args.verbose());
        match args.command {
            Some(Command::Locate(cmd)) => {
                assert_eq!(cmd.occurrence, 0);
                assert!(!cmd.content);
            }
            _ => panic!("expected locate command"),
        }
    }
}
