//! # Plugin Catalog CLI (`catalog`)
//!
//! The `catalog` binary fetches the plugin directory into a local JSON
//! snapshot and queries it.
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog` / `catalog fetch` | Rebuild `data/plugins.json` from GitHub |
//! | `catalog search [QUERY]` | Fuzzy search, grouped by category |
//! | `catalog get <id>` | Show one plugin in full |
//! | `catalog stats` | Summarize the saved catalog |
//! | `catalog categories` | List categories in display order |
//! | `catalog serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Fetch with a token to avoid rate limits
//! GITHUB_TOKEN=ghp_... catalog fetch
//!
//! # Search two categories
//! catalog search review --category "Code Quality Testing" --category "Git Workflow"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use plugin_catalog::progress::ProgressMode;
use plugin_catalog::{config, get, ingest, search, server, stats};

/// Plugin Catalog CLI: fetch and search a Claude Code plugin directory.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Plugin Catalog: fetch and search a Claude Code plugin directory",
    version,
    long_about = "Plugin Catalog reads a GitHub plugin directory (a README listing plugins under \
    category headings, plus per-plugin README, agents/ and commands/ folders), writes a \
    normalized JSON catalog, and answers fuzzy, category-filtered searches over it."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/catalog.toml`. Source repository, output path,
    /// categories, pacing, and search tuning are read from this file.
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    /// Defaults to `fetch`.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Fetch the plugin directory and rewrite the catalog file.
    ///
    /// Parses the root listing, reads every listed plugin's README, agents,
    /// and commands, and writes the normalized catalog. Plugins that fail
    /// are skipped and counted; the run still exits 0.
    Fetch {
        /// Progress output: `auto`, `human`, `json`, or `off`. Overrides
        /// `[output] progress`.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Search the saved catalog.
    ///
    /// Matches the query approximately against names, descriptions,
    /// READMEs, and agent definitions, then groups results by category.
    /// An empty query lists everything.
    Search {
        /// The search query string.
        #[arg(default_value = "")]
        query: String,

        /// Only show plugins in this category. Repeat to select several.
        #[arg(long = "category")]
        categories: Vec<String>,
    },

    /// Show one plugin: README, agents, commands, and install command.
    Get {
        /// Plugin identifier (its folder name).
        id: String,
    },

    /// Summarize the saved catalog.
    Stats,

    /// List the configured categories in display order.
    Categories,

    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` and serves the saved catalog.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command.unwrap_or(Commands::Fetch { progress: None }) {
        Commands::Fetch { progress } => {
            let setting = progress.unwrap_or_else(|| cfg.output.progress.clone());
            let mode = ProgressMode::from_setting(&setting)?;
            ingest::run_fetch(&cfg, mode.reporter().as_ref()).await?;
        }
        Commands::Search { query, categories } => {
            search::run_search(&cfg, &query, &categories)?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Categories => {
            stats::run_categories(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
