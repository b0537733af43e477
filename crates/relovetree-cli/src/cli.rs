//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use relovetree_domain::SortKey;

/// Relovetree CLI - Manage love trees and keep clones in step with their sources.
#[derive(Debug, Parser)]
#[command(name = "relovetree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Act as this user instead of the configured viewer
    #[arg(long = "as", global = true, env = "RELOVETREE_VIEWER")]
    pub viewer: Option<String>,

    /// Database file, overriding the configuration
    #[arg(long, global = true, env = "RELOVETREE_DB")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List your trees with their update status
    List(ListArgs),

    /// Check one clone against its source
    Check(CheckArgs),

    /// Check all of your clones
    CheckAll(CheckAllArgs),

    /// Overwrite a clone with its source's latest content
    Sync(SyncArgs),

    /// Clone someone's tree
    Clone(CloneArgs),

    /// Delete one of your trees
    Delete(DeleteArgs),

    /// Print a tree's nodes and how complete they are
    Dump(DumpArgs),

    /// List every tree in the database
    Trees(TreesArgs),
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Title filter
    #[arg(short, long)]
    pub q: Option<String>,

    /// Sort order
    #[arg(short, long, value_parser = parse_sort)]
    pub sort: Option<SortKey>,

    /// Rows per page (10, 20 or 50)
    #[arg(long)]
    pub size: Option<usize>,

    /// Page number (1-based)
    #[arg(short, long)]
    pub page: Option<usize>,

    /// View state as a URL query string (e.g. "?sort=likes_desc&page=2")
    #[arg(long, conflicts_with_all = ["q", "sort", "size", "page"])]
    pub url: Option<String>,

    /// Only show cached status; do not contact sources
    #[arg(long)]
    pub no_check: bool,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Clone ID
    pub id: String,
}

/// Arguments for the check-all command.
#[derive(Debug, Parser)]
pub struct CheckAllArgs {
    /// Re-check clones that have a fresh cached status too
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the sync command.
#[derive(Debug, Parser)]
pub struct SyncArgs {
    /// Clone ID
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the clone command.
#[derive(Debug, Parser)]
pub struct CloneArgs {
    /// Source tree ID
    pub source_id: String,
}

/// Arguments for the delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Tree ID
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the dump command.
#[derive(Debug, Parser)]
pub struct DumpArgs {
    /// Tree ID
    pub id: String,
}

/// Arguments for the trees command.
#[derive(Debug, Parser)]
pub struct TreesArgs {
    /// Only trees owned by this user
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Only clones
    #[arg(long)]
    pub clones: bool,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

fn parse_sort(value: &str) -> std::result::Result<SortKey, String> {
    value.parse()
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_command() {
        let cli = Cli::parse_from(["relovetree", "list", "--sort", "likes_desc", "--page", "2"]);
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.sort, Some(SortKey::LikesDesc));
                assert_eq!(args.page, Some(2));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let result = Cli::try_parse_from(["relovetree", "list", "--sort", "random"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_url_conflicts_with_explicit_state() {
        let result = Cli::try_parse_from(["relovetree", "list", "--url", "?page=2", "--page", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sync_command() {
        let cli = Cli::parse_from(["relovetree", "--as", "bob", "sync", "tree-1", "--yes"]);
        assert_eq!(cli.viewer.as_deref(), Some("bob"));
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.id, "tree-1");
                assert!(args.yes);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn test_check_all_force() {
        let cli = Cli::parse_from(["relovetree", "check-all", "--force"]);
        assert!(matches!(cli.command, Command::CheckAll(CheckAllArgs { force: true })));
    }
}
