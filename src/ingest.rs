//! Ingestion pipeline orchestration.
//!
//! Coordinates the full fetch flow: root listing → per-plugin artifacts →
//! normalization → catalog file. Plugins are processed one at a time with a
//! fixed pause every few plugins to stay under the remote rate limit.
//!
//! Failure tiers:
//!
//! - the root listing, the parser setup, and the final write are fatal;
//! - a plugin that cannot be built is skipped and counted as failed;
//! - a missing or unreadable artifact degrades to empty content with a note.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use plugin_catalog_core::category::CategorySet;
use plugin_catalog_core::listing::ListingParser;
use plugin_catalog_core::models::{ListingEntry, Plugin, PluginLinks};
use plugin_catalog_core::normalize::{build_plugin, validate_identifier, Normalized};

use crate::config::Config;
use crate::connector_github::GitHubClient;
use crate::export::{write_catalog, WrittenCatalog};
use crate::fetch::{fetch_listing, DetailFetcher};
use crate::progress::{FetchEvent, FetchReporter};
use crate::traits::SourceClient;

/// What a fetch run produced.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub source: String,
    /// Entries found in the listing, duplicates included.
    pub found: usize,
    pub catalog: Vec<Plugin>,
    /// `(identifier, error)` for every skipped plugin.
    pub failures: Vec<(String, String)>,
    pub notes: usize,
    pub written: WrittenCatalog,
}

impl FetchOutcome {
    pub fn succeeded(&self) -> usize {
        self.catalog.len()
    }
}

/// Run `catalog fetch` against GitHub and print the summary.
pub async fn run_fetch(config: &Config, progress: &dyn FetchReporter) -> Result<()> {
    let client: Arc<dyn SourceClient> = Arc::new(GitHubClient::new(&config.source)?);
    let outcome = ingest(config, client, progress).await?;
    print!("{}", format_summary(&outcome, &config.catalog.categories));
    Ok(())
}

/// Build the catalog from `client` and write it to the configured output.
pub async fn ingest(
    config: &Config,
    client: Arc<dyn SourceClient>,
    progress: &dyn FetchReporter,
) -> Result<FetchOutcome> {
    let listing = fetch_listing(client.as_ref(), &config.source.readme_path)
        .await
        .context("Failed to fetch root listing")?;

    let parser = ListingParser::new(
        config.catalog.categories.clone(),
        &config.source.plugins_dir,
    )?;
    let entries = parser.parse(&listing);
    let total = entries.len();
    progress.report(FetchEvent::ListingFound {
        total: total as u64,
    });

    let fetcher = DetailFetcher::new(
        client.clone(),
        &config.source.plugins_dir,
        &config.catalog.document_globs,
    )?;
    let links = config.source.links();

    let mut catalog = Vec::with_capacity(total);
    let mut failures = Vec::new();
    let mut notes = 0usize;

    for (i, entry) in entries.into_iter().enumerate() {
        let id = entry.name.clone();
        progress.report(FetchEvent::EntityStarted {
            id: id.clone(),
            n: (i + 1) as u64,
            total: total as u64,
        });

        // Each plugin runs in its own task so a panic while building one
        // plugin is contained to that plugin.
        let task = tokio::spawn(build_one(entry, fetcher.clone(), links.clone()));
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(anyhow::anyhow!("task failed: {}", e)),
        };

        match result {
            Ok(built) => {
                for message in built.notes {
                    notes += 1;
                    progress.report(FetchEvent::Note {
                        id: id.clone(),
                        message,
                    });
                }
                progress.report(FetchEvent::EntityFinished {
                    id,
                    agents: built.value.agents.len() as u64,
                    commands: built.value.commands.len() as u64,
                });
                catalog.push(built.value);
            }
            Err(e) => {
                let error = format!("{:#}", e);
                progress.report(FetchEvent::EntityFailed {
                    id: id.clone(),
                    error: error.clone(),
                });
                failures.push((id, error));
            }
        }

        let done = i + 1;
        if config.fetch.pause_every > 0 && done % config.fetch.pause_every == 0 && done < total {
            progress.report(FetchEvent::Pausing {
                after: done as u64,
                millis: config.fetch.pause_ms,
            });
            tokio::time::sleep(Duration::from_millis(config.fetch.pause_ms)).await;
        }
    }

    let written = write_catalog(&config.catalog.output, &catalog)?;
    progress.report(FetchEvent::Saved {
        path: written.path.clone(),
        plugins: written.plugins as u64,
    });

    Ok(FetchOutcome {
        source: client.label(),
        found: total,
        catalog,
        failures,
        notes,
        written,
    })
}

async fn build_one(
    entry: ListingEntry,
    fetcher: DetailFetcher,
    links: PluginLinks,
) -> Result<Normalized<Plugin>> {
    validate_identifier(&entry.name)?;
    let artifacts = fetcher.fetch(&entry.name).await;
    let mut built = build_plugin(
        &entry,
        &artifacts.readme,
        &artifacts.agents,
        &artifacts.commands,
        &links,
    )?;
    let mut notes = artifacts.notes;
    notes.append(&mut built.notes);
    built.notes = notes;
    Ok(built)
}

/// Plugin counts per category, largest first. Ties keep category order.
pub fn category_breakdown(catalog: &[Plugin], categories: &CategorySet) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = categories
        .iter()
        .map(|c| {
            let n = catalog.iter().filter(|p| p.category == c).count();
            (c.to_string(), n)
        })
        .filter(|(_, n)| *n > 0)
        .collect();

    // Categories not in the set can only come from a hand-edited file.
    for plugin in catalog {
        if !categories.contains(&plugin.category)
            && !counts.iter().any(|(c, _)| *c == plugin.category)
        {
            let n = catalog
                .iter()
                .filter(|p| p.category == plugin.category)
                .count();
            counts.push((plugin.category.clone(), n));
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Render the run summary printed on stdout.
pub fn format_summary(outcome: &FetchOutcome, categories: &CategorySet) -> String {
    let mut out = String::new();
    out.push_str(&format!("fetch {}\n", outcome.source));
    out.push_str(&format!("  found: {} plugins\n", outcome.found));
    out.push_str(&format!("  succeeded: {}\n", outcome.succeeded()));
    out.push_str(&format!("  failed: {}\n", outcome.failures.len()));
    for (id, error) in &outcome.failures {
        out.push_str(&format!("    {}: {}\n", id, error));
    }
    if outcome.notes > 0 {
        out.push_str(&format!("  notes: {}\n", outcome.notes));
    }
    let breakdown = category_breakdown(&outcome.catalog, categories);
    if !breakdown.is_empty() {
        out.push_str("  by category:\n");
        for (category, n) in breakdown {
            out.push_str(&format!("    {:<32} {:>5}\n", category, n));
        }
    }
    out.push_str(&format!(
        "  output: {} ({} plugins, {} bytes)\n",
        outcome.written.path.display(),
        outcome.written.plugins,
        outcome.written.bytes
    ));
    out.push_str(&format!("  sha256: {}\n", outcome.written.sha256));
    out.push_str("ok\n");
    out
}
