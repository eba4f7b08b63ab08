//! Catalog statistics and freshness overview.
//!
//! Provides a quick summary of the saved snapshot: plugin, agent, and
//! command counts, a per-category breakdown, and when the file was last
//! written. Used by `catalog stats` to confirm a fetch did what was expected.

use anyhow::Result;

use plugin_catalog_core::category::CategorySet;
use plugin_catalog_core::models::Plugin;

use crate::config::Config;
use crate::export::load_catalog;
use crate::ingest::category_breakdown;

/// Per-category counts of plugins and their documents.
#[derive(Debug, PartialEq, Eq)]
struct CategoryStats {
    category: String,
    plugins: usize,
    agents: usize,
    commands: usize,
}

/// Run the stats command: load the catalog and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let path = &config.catalog.output;
    let catalog = match load_catalog(path)? {
        Some(c) => c,
        None => {
            println!(
                "No catalog at {}. Run `catalog fetch` first.",
                path.display()
            );
            return Ok(());
        }
    };

    let meta = std::fs::metadata(path)?;
    let modified = meta
        .modified()
        .ok()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp());

    let total_agents: usize = catalog.iter().map(|p| p.agents.len()).sum();
    let total_commands: usize = catalog.iter().map(|p| p.commands.len()).sum();

    println!("Plugin Catalog Stats");
    println!("====================");
    println!();
    println!("  Catalog:     {}", path.display());
    println!("  Size:        {}", format_bytes(meta.len()));
    println!(
        "  Last fetch:  {}",
        modified
            .map(format_ts_relative)
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!();
    println!("  Plugins:     {}", catalog.len());
    println!("  Agents:      {}", total_agents);
    println!("  Commands:    {}", total_commands);

    let stats = category_stats(&catalog, &config.catalog.categories);
    if !stats.is_empty() {
        println!();
        println!("  By category:");
        println!(
            "  {:<32} {:>7} {:>7} {:>9}",
            "CATEGORY", "PLUGINS", "AGENTS", "COMMANDS"
        );
        println!("  {}", "-".repeat(58));
        for s in &stats {
            println!(
                "  {:<32} {:>7} {:>7} {:>9}",
                s.category, s.plugins, s.agents, s.commands
            );
        }
    }

    println!();
    Ok(())
}

/// Print the configured categories in display order, with plugin counts
/// when a catalog has been fetched.
pub fn run_categories(config: &Config) -> Result<()> {
    let catalog = load_catalog(&config.catalog.output)?;
    for (i, category) in config.catalog.categories.iter().enumerate() {
        match &catalog {
            Some(c) => {
                let n = c.iter().filter(|p| p.category == category).count();
                println!("{:>3}. {:<40} {:>5}", i + 1, category, n);
            }
            None => println!("{:>3}. {}", i + 1, category),
        }
    }
    Ok(())
}

fn category_stats(catalog: &[Plugin], categories: &CategorySet) -> Vec<CategoryStats> {
    category_breakdown(catalog, categories)
        .into_iter()
        .map(|(category, plugins)| {
            let members = catalog.iter().filter(|p| p.category == category);
            let (agents, commands) = members.fold((0, 0), |(a, c), p| {
                (a + p.agents.len(), c + p.commands.len())
            });
            CategoryStats {
                category,
                plugins,
                agents,
                commands,
            }
        })
        .collect()
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
