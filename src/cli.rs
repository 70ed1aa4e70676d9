use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_DB: &str = "pokemon.db";

#[derive(Parser, Debug)]
#[command(name = "pokedex-to-sqlite")]
#[command(version, about = "Load the veekun Pokedex CSV datasets into SQLite")]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Source selection shared by the loading commands
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Only include these sources (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub include: Option<Vec<String>>,

    /// Exclude these sources (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// JSON manifest replacing the builtin source list
    #[arg(long, value_name = "MANIFEST")]
    pub sources: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and load every source whose table is missing
    Sync {
        /// Output SQLite database path
        #[arg(env = "POKEDEX_DB", default_value = DEFAULT_DB)]
        output_db: PathBuf,

        #[command(flatten)]
        select: SourceArgs,

        /// Drop and reload tables that already exist
        #[arg(short, long)]
        force: bool,

        /// Custom cache directory
        #[arg(short, long, env = "POKEDEX_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Do not read or write the download cache
        #[arg(long, conflicts_with = "cache_dir")]
        no_cache: bool,

        /// Stop at the first failing source
        #[arg(long)]
        fail_fast: bool,

        /// Show the full-screen dashboard
        #[arg(long)]
        tui: bool,
    },

    /// Load sources from local CSV files named `<source>.csv`
    Import {
        /// Directory containing the CSV files
        input_dir: PathBuf,

        /// Output SQLite database path
        #[arg(env = "POKEDEX_DB", default_value = DEFAULT_DB)]
        output_db: PathBuf,

        #[command(flatten)]
        select: SourceArgs,

        /// Drop and reload tables that already exist
        #[arg(short, long)]
        force: bool,

        /// Stop at the first failing source
        #[arg(long)]
        fail_fast: bool,
    },

    /// List the configured sources
    ListSources {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// JSON manifest replacing the builtin source list
        #[arg(long, value_name = "MANIFEST")]
        sources: Option<PathBuf>,
    },

    /// Show registered sources and their row counts
    Status {
        /// SQLite database path
        #[arg(env = "POKEDEX_DB", default_value = DEFAULT_DB)]
        db: PathBuf,
    },

    /// Delete cached CSV downloads
    ClearCache {
        /// Custom cache directory
        #[arg(short, long, env = "POKEDEX_CACHE_DIR")]
        cache_dir: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_parses_filters() {
        let cli = Cli::try_parse_from([
            "pokedex-to-sqlite",
            "sync",
            "out.db",
            "--include",
            "types,stats",
            "--force",
        ])
        .unwrap();

        match cli.command {
            Commands::Sync {
                output_db,
                select,
                force,
                ..
            } => {
                assert_eq!(output_db, PathBuf::from("out.db"));
                assert_eq!(select.include, Some(vec!["types".into(), "stats".into()]));
                assert!(force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_cache_conflicts_with_cache_dir() {
        let result = Cli::try_parse_from([
            "pokedex-to-sqlite",
            "sync",
            "--no-cache",
            "--cache-dir",
            "/tmp/x",
        ]);
        assert!(result.is_err());
    }
}
