use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::Locale;

/// Chat-style to-do list with nested tasks.
/// Storage defaults to ~/.todo/tasks.db or a path passed via --db.
#[derive(Parser)]
#[command(name = "todo", version, about = "Chat-style to-do list manager")]
pub struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, global = true, env = "TODO_DB")]
    pub db: Option<PathBuf>,

    /// Language of the bot replies.
    #[arg(long, global = true, value_enum, env = "TODO_LOCALE")]
    pub locale: Option<Locale>,

    /// Settings file (default: ~/.todo/config.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["todo", "list", "--locale", "ru", "--db", "x.db"]).unwrap();
        assert_eq!(cli.locale, Some(Locale::Ru));
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(matches!(cli.command, Commands::List { .. }));
    }
}
