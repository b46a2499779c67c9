//! # Mission Harvest CLI (`harvest`)
//!
//! Maps mission offers exported by staffing platforms into canonical
//! mission-request JSON.
//!
//! ## Usage
//!
//! ```bash
//! harvest --config ./config/harvest.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `harvest sources` | List the source profiles |
//! | `harvest map <file> --source <profile>` | Map one file and print the result |
//! | `harvest sync <profile>` | Map every attachment under `input.root` into `output.dir` |
//! | `harvest recent <listing> --since <date>` | Print opportunity ids updated after a date |
//!
//! Logs go to stderr; `RUST_LOG` overrides `logging.level`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mission_harvest::config::{self, Config};
use mission_harvest::ingest;
use mission_harvest::sources;
use mission_harvest::traits::ProfileRegistry;

/// Mission Harvest: map staffing-platform mission offers into canonical
/// mission requests.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Only `sync` requires it to exist.
#[derive(Parser)]
#[command(
    name = "harvest",
    about = "Map staffing-platform mission offers into canonical mission requests",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/harvest.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available source profiles.
    Sources,

    /// Map a single source file and print the canonical JSON to stdout.
    Map {
        /// Source JSON file.
        file: PathBuf,

        /// Source profile name (see `harvest sources`).
        #[arg(long)]
        source: String,

        /// Enrichment result (`{"skills": [...], "languages": [...]}`) to stage before mapping.
        #[arg(long)]
        enrichment: Option<PathBuf>,
    },

    /// Map every attachment under `input.root` and write `<job_id>.json` files.
    ///
    /// Files that fail to parse or validate are logged and counted; they
    /// do not stop the run. A sibling `<name>.enrichment.json` is staged
    /// automatically.
    Sync {
        /// Source profile name.
        profile: String,

        /// Map and validate without writing output files.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of files to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print ids from an opportunity listing updated after a date.
    Recent {
        /// Listing JSON file (`{"data": [{"id", "attributes": {"updateDate"}}]}`).
        listing: PathBuf,

        /// Cutoff date (YYYY-MM-DD, UTC midnight).
        #[arg(long)]
        since: String,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.command {
        Commands::Sync { .. } => config::load_config(&cli.config)?,
        _ => config::load_config(&cli.config).unwrap_or_else(|_| Config::minimal()),
    };
    init_logging(&cfg.logging.level);

    let registry = ProfileRegistry::builtin();

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&registry)?;
        }
        Commands::Map {
            file,
            source,
            enrichment,
        } => {
            let profile = ingest::resolve_profile(&registry, &source)?;
            ingest::run_map(profile, &file, enrichment.as_deref())?;
        }
        Commands::Sync {
            profile,
            dry_run,
            limit,
        } => {
            let profile = ingest::resolve_profile(&registry, &profile)?;
            ingest::run_sync(&cfg, profile, dry_run, limit)?;
        }
        Commands::Recent { listing, since } => {
            ingest::run_recent(&listing, &since)?;
        }
    }

    Ok(())
}
