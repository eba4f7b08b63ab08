//! Core data models used throughout Plugin Catalog.
//!
//! These types represent the listing entries, raw documents, and normalized
//! catalog records that flow from the ingestion pipeline into the search
//! layer. The serialized field names are camelCase so the catalog document
//! stays readable by the web front end.

use serde::{Deserialize, Serialize};

/// One `(identifier, category)` pair extracted from the root listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Path segment under the plugins directory (e.g. `"foo"`).
    pub name: String,
    /// Category heading the reference appeared under.
    pub category: String,
}

impl ListingEntry {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// A raw markdown document fetched from an `agents/` or `commands/` folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// File name including extension (e.g. `"reviewer.md"`).
    pub file_name: String,
    /// Full file content. Empty if the file could not be fetched.
    pub content: String,
}

impl RawDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// A named capability definition with a prompt body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub name: String,
    pub description: String,
    /// Document body with any frontmatter block removed.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// A named action definition with a short description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// One catalog entry: a listed plugin with its documents and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    /// Stable identifier, equal to the listing path segment.
    pub id: String,
    pub name: String,
    pub category: String,
    /// First paragraph after the README title.
    pub description: String,
    /// Full README text (may be empty).
    pub readme: String,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub commands: Vec<Command>,
    pub install_command: String,
    pub github_url: String,
}

/// Coordinates of the remote repository, used to build per-plugin links.
///
/// Links are a pure function of the identifier, so rebuilding a plugin from
/// the same source always yields the same `install_command` and `github_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLinks {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub plugins_dir: String,
}

impl PluginLinks {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        plugins_dir: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            plugins_dir: plugins_dir.into(),
        }
    }

    /// `/plugin install github.com/<owner>/<repo>/<plugins_dir>/<id>`
    pub fn install_command(&self, id: &str) -> String {
        format!(
            "/plugin install github.com/{}/{}/{}/{}",
            self.owner, self.repo, self.plugins_dir, id
        )
    }

    /// `https://github.com/<owner>/<repo>/tree/<branch>/<plugins_dir>/<id>`
    pub fn github_url(&self, id: &str) -> String {
        format!(
            "https://github.com/{}/{}/tree/{}/{}/{}",
            self.owner, self.repo, self.branch, self.plugins_dir, id
        )
    }
}

impl Default for PluginLinks {
    fn default() -> Self {
        Self::new("ccplugins", "awesome-claude-code-plugins", "main", "plugins")
    }
}
