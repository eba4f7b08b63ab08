//! Terminal rendering of the grouped catalog view.
//!
//! `catalog search` loads the saved snapshot, builds a
//! [`CatalogExplorer`], and prints one section per non-empty category:
//!
//! ```text
//! [3/42] plugins
//!
//! Security (3)
//!   audit-log           Records access events  (2 agents, 1 command)
//!   ...
//! ```
//!
//! An absent or empty catalog and a filter that matches nothing print
//! different messages.

use anyhow::{bail, Result};
use std::collections::BTreeSet;

use plugin_catalog_core::search::{CatalogExplorer, CatalogView, ViewState};

use crate::config::Config;
use crate::export::load_catalog;

/// Load the saved snapshot into an explorer. A missing file is an empty
/// catalog.
pub fn load_explorer(config: &Config) -> Result<CatalogExplorer> {
    let catalog = load_catalog(&config.catalog.output)?.unwrap_or_default();
    Ok(CatalogExplorer::new(
        catalog,
        config.catalog.categories.clone(),
        config.search.match_options(),
    ))
}

/// Check every requested category against the configured set.
pub fn selected_categories(config: &Config, names: &[String]) -> Result<BTreeSet<String>> {
    let mut selected = BTreeSet::new();
    for name in names {
        if !config.catalog.categories.contains(name) {
            bail!(
                "Unknown category: '{}'. Run `catalog categories` to list them.",
                name
            );
        }
        selected.insert(name.clone());
    }
    Ok(selected)
}

pub fn run_search(config: &Config, query: &str, categories: &[String]) -> Result<()> {
    let selected = selected_categories(config, categories)?;
    let explorer = load_explorer(config)?;
    let view = explorer.view(query, &selected);
    print!("{}", render_view(config, &explorer, &view));
    Ok(())
}

/// Render `view` as plain text.
pub fn render_view(config: &Config, explorer: &CatalogExplorer, view: &CatalogView) -> String {
    match view.state {
        ViewState::NoData => {
            return format!(
                "No plugins found. Run `catalog fetch` to populate {}.\n",
                config.catalog.output.display()
            )
        }
        ViewState::NoResults => {
            return format!(
                "[0/{}] plugins\n\nNo plugins match your search.\n",
                view.total
            )
        }
        ViewState::Results => {}
    }

    let mut out = format!("[{}/{}] plugins\n", view.matched, view.total);
    for group in &view.groups {
        out.push('\n');
        out.push_str(&group.label());
        out.push('\n');
        for plugin in explorer.members(group) {
            out.push_str(&format!(
                "  {:<28} {}{}\n",
                plugin.name,
                plugin.description,
                counts_suffix(plugin.agents.len(), plugin.commands.len())
            ));
        }
    }
    out
}

fn counts_suffix(agents: usize, commands: usize) -> String {
    let mut parts = Vec::new();
    if agents > 0 {
        parts.push(format!("{} agent{}", agents, if agents == 1 { "" } else { "s" }));
    }
    if commands > 0 {
        parts.push(format!(
            "{} command{}",
            commands,
            if commands == 1 { "" } else { "s" }
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  ({})", parts.join(", "))
    }
}
