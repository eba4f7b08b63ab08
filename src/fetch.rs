//! Retrieval of the root listing and per-plugin artifacts.
//!
//! For one plugin `foo` the fetcher reads three artifacts concurrently:
//!
//! ```text
//! plugins/foo/README.md     → description document
//! plugins/foo/agents/*.md   → agent documents
//! plugins/foo/commands/*.md → command documents
//! ```
//!
//! None of these failures propagate. A missing README becomes empty text,
//! a missing or unreadable folder becomes an empty list, and each
//! degradation is recorded as a note for the progress reporter. Only the
//! root listing is required.

use anyhow::{bail, Result};
use futures::future::join_all;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::sync::Arc;

use plugin_catalog_core::models::RawDocument;

use crate::traits::{Contents, EntryKind, SourceClient};

const README_FILE: &str = "README.md";
const AGENTS_DIR: &str = "agents";
const COMMANDS_DIR: &str = "commands";

/// Fetch the root listing document. Any failure here is fatal to the run.
pub async fn fetch_listing(client: &dyn SourceClient, path: &str) -> Result<String> {
    match client.get_contents(path).await? {
        Contents::File(text) => Ok(text),
        Contents::Missing => bail!("Root listing '{}' not found in {}", path, client.label()),
        Contents::Dir(_) => bail!("Root listing '{}' is a directory, expected a file", path),
    }
}

/// Everything retrieved for one plugin, plus notes on what degraded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginArtifacts {
    pub readme: String,
    pub agents: Vec<RawDocument>,
    pub commands: Vec<RawDocument>,
    pub notes: Vec<String>,
}

/// Fetches per-plugin artifacts from a [`SourceClient`].
#[derive(Clone)]
pub struct DetailFetcher {
    client: Arc<dyn SourceClient>,
    plugins_dir: String,
    documents: GlobSet,
}

impl DetailFetcher {
    /// `document_globs` select which folder entries count as documents
    /// (matched against the file name).
    pub fn new(
        client: Arc<dyn SourceClient>,
        plugins_dir: &str,
        document_globs: &[String],
    ) -> Result<Self> {
        Ok(Self {
            client,
            plugins_dir: plugins_dir.trim_matches('/').to_string(),
            documents: build_globset(document_globs)?,
        })
    }

    fn plugin_path(&self, id: &str, rest: &str) -> String {
        format!("{}/{}/{}", self.plugins_dir, id, rest)
    }

    /// Fetch README, agents, and commands for `id` concurrently.
    pub async fn fetch(&self, id: &str) -> PluginArtifacts {
        let (readme, agents, commands) = tokio::join!(
            self.fetch_readme(id),
            self.fetch_folder(id, AGENTS_DIR),
            self.fetch_folder(id, COMMANDS_DIR),
        );

        let mut notes = Vec::new();
        let (readme, note) = readme;
        notes.extend(note);
        let (agents, agent_notes) = agents;
        notes.extend(agent_notes);
        let (commands, command_notes) = commands;
        notes.extend(command_notes);

        PluginArtifacts {
            readme,
            agents,
            commands,
            notes,
        }
    }

    async fn fetch_readme(&self, id: &str) -> (String, Option<String>) {
        let path = self.plugin_path(id, README_FILE);
        match self.client.get_contents(&path).await {
            Ok(Contents::File(text)) => (text, None),
            Ok(Contents::Missing) => (String::new(), Some(format!("no {} found", README_FILE))),
            Ok(Contents::Dir(_)) => (
                String::new(),
                Some(format!("{} is a directory, ignoring", README_FILE)),
            ),
            Err(e) => (
                String::new(),
                Some(format!("could not fetch {}: {:#}", README_FILE, e)),
            ),
        }
    }

    async fn fetch_folder(&self, id: &str, folder: &str) -> (Vec<RawDocument>, Vec<String>) {
        let path = self.plugin_path(id, folder);
        let entries = match self.client.get_contents(&path).await {
            Ok(Contents::Dir(entries)) => entries,
            // Most plugins ship only one of agents/ or commands/.
            Ok(Contents::Missing) => return (Vec::new(), Vec::new()),
            Ok(Contents::File(_)) => {
                return (
                    Vec::new(),
                    vec![format!("{}/ is a file, expected a folder", folder)],
                )
            }
            Err(e) => {
                return (
                    Vec::new(),
                    vec![format!("could not list {}/: {:#}", folder, e)],
                )
            }
        };

        let wanted: Vec<_> = entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::File && self.documents.is_match(&e.name))
            .collect();

        let results = join_all(
            wanted
                .iter()
                .map(|entry| self.client.get_contents(&entry.path)),
        )
        .await;

        let mut docs = Vec::with_capacity(wanted.len());
        let mut notes = Vec::new();
        for (entry, result) in wanted.iter().zip(results) {
            let content = match result {
                Ok(Contents::File(text)) => text,
                Ok(_) => {
                    notes.push(format!("{}/{} is not a readable file", folder, entry.name));
                    String::new()
                }
                Err(e) => {
                    notes.push(format!("could not fetch {}/{}: {:#}", folder, entry.name, e));
                    String::new()
                }
            };
            docs.push(RawDocument::new(&entry.name, content));
        }
        (docs, notes)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RemoteEntry;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapClient {
        paths: HashMap<String, Contents>,
        broken: Vec<String>,
    }

    #[async_trait]
    impl SourceClient for MapClient {
        fn label(&self) -> String {
            "map".into()
        }

        async fn get_contents(&self, path: &str) -> Result<Contents> {
            if self.broken.iter().any(|b| b == path) {
                bail!("connection reset");
            }
            Ok(self.paths.get(path).cloned().unwrap_or(Contents::Missing))
        }
    }

    fn fetcher(client: MapClient) -> DetailFetcher {
        DetailFetcher::new(Arc::new(client), "plugins", &["*.md".to_string()]).unwrap()
    }

    #[tokio::test]
    async fn listing_must_be_a_file() {
        let client = MapClient::default();
        assert!(fetch_listing(&client, "README.md").await.is_err());

        let mut client = MapClient::default();
        client
            .paths
            .insert("README.md".into(), Contents::File("### Docs".into()));
        assert_eq!(fetch_listing(&client, "README.md").await.unwrap(), "### Docs");
    }

    #[tokio::test]
    async fn fetches_all_three_artifacts() {
        let mut client = MapClient::default();
        client.paths.insert(
            "plugins/foo/README.md".into(),
            Contents::File("# Foo\nDoes foo.".into()),
        );
        client.paths.insert(
            "plugins/foo/agents".into(),
            Contents::Dir(vec![
                RemoteEntry::file("b.md", "plugins/foo/agents/b.md"),
                RemoteEntry::file("notes.txt", "plugins/foo/agents/notes.txt"),
                RemoteEntry {
                    name: "sub.md".into(),
                    path: "plugins/foo/agents/sub.md".into(),
                    kind: EntryKind::Dir,
                },
                RemoteEntry::file("a.md", "plugins/foo/agents/a.md"),
            ]),
        );
        client
            .paths
            .insert("plugins/foo/agents/a.md".into(), Contents::File("A".into()));
        client
            .paths
            .insert("plugins/foo/agents/b.md".into(), Contents::File("B".into()));

        let artifacts = fetcher(client).fetch("foo").await;
        assert_eq!(artifacts.readme, "# Foo\nDoes foo.");
        let names: Vec<&str> = artifacts.agents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.md", "a.md"]);
        assert!(artifacts.commands.is_empty());
        assert!(artifacts.notes.is_empty());
    }

    #[tokio::test]
    async fn folder_error_degrades_to_empty_with_note() {
        let mut client = MapClient::default();
        client.broken.push("plugins/foo/agents".into());
        let artifacts = fetcher(client).fetch("foo").await;
        assert!(artifacts.agents.is_empty());
        assert_eq!(artifacts.notes.len(), 2);
        assert!(artifacts.notes.iter().any(|n| n.contains("agents/")));
        assert!(artifacts.notes.iter().any(|n| n.contains("no README.md")));
    }

    #[tokio::test]
    async fn unreadable_document_is_kept_empty() {
        let mut client = MapClient::default();
        client.paths.insert(
            "plugins/foo/commands".into(),
            Contents::Dir(vec![RemoteEntry::file("run.md", "plugins/foo/commands/run.md")]),
        );
        client.broken.push("plugins/foo/commands/run.md".into());
        let artifacts = fetcher(client).fetch("foo").await;
        assert_eq!(artifacts.commands, vec![RawDocument::new("run.md", "")]);
        assert!(artifacts.notes.iter().any(|n| n.contains("commands/run.md")));
    }
}
