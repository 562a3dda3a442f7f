use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use lineup_core::source::SourceSystem;
use lineup_resolve::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "lineup", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/lineup/lineup.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Show lifetime resolution totals
    ///
    /// Prints the same JSON report shape as migrate, with counters
    /// accumulated from the migration log across all runs.
    Status,
    /// Resolve staged source records into the canonical store
    ///
    /// Pages over the staging relation for one source system (or all of
    /// them), resolving each record through the four-step cascade:
    /// source-map lookup, slug lookup, fuzzy name match, creation.
    /// Ambiguous matches are filed as merge candidates for human review
    /// rather than linked.
    ///
    /// With --dry-run the whole run executes inside one transaction and
    /// is rolled back at the end; the printed stats are exactly what a
    /// committing run over the same staged data would produce. Without
    /// it, each page commits in its own transaction.
    ///
    /// Prints a JSON report: success, action, stats, errors, duration.
    Migrate {
        /// Source system to migrate (manual, legacy, sync, rag, scraper)
        source: Option<String>,

        /// Migrate every source system in priority order
        #[arg(long, conflicts_with = "source")]
        all: bool,

        /// Preview: resolve everything, roll it all back
        #[arg(long)]
        dry_run: bool,

        /// Records per page (one transaction per page in commit mode)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Skip this many staged records before the first page
        #[arg(long, default_value_t = 0)]
        start_from: usize,
    },
    /// Check the store for referential-integrity problems
    Validate,
    /// Print the flat projection of one artist by slug
    Lookup {
        /// Canonical slug, e.g. "jeff-mills"
        slug: String,
    },
    /// Review pending merge candidates
    Review {
        #[command(subcommand)]
        action: commands::review::ReviewAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match cli.db {
        Some(db) => Config::load_with_db_path(db)?,
        None => Config::load()?,
    };

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Status => {
            commands::show_status(&config)?;
        }
        Commands::Migrate {
            source,
            all,
            dry_run,
            batch_size,
            start_from,
        } => {
            let target = match (&source, all) {
                (Some(name), false) => match SourceSystem::parse(name) {
                    Some(system) => commands::migrate::Target::One(system),
                    None => {
                        anyhow::bail!(
                            "unknown source system '{name}' (expected one of: manual, legacy, sync, rag, scraper)"
                        );
                    }
                },
                (None, true) => commands::migrate::Target::All,
                _ => anyhow::bail!("specify a source system or --all"),
            };
            commands::run_migrate(&config, target, dry_run, batch_size, start_from)?;
        }
        Commands::Validate => {
            commands::run_validate(&config)?;
        }
        Commands::Lookup { slug } => {
            commands::run_lookup(&config, &slug)?;
        }
        Commands::Review { action } => {
            commands::run_review(&config, action)?;
        }
        Commands::Config { action } => {
            commands::run_config(&action)?;
        }
    }

    Ok(())
}
