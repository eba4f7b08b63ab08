//! Document normalization: raw README/agent/command text → catalog records.
//!
//! All functions here are pure. Anything worth reporting (a malformed
//! frontmatter block) is returned in [`Normalized::notes`] rather than
//! logged, so the ingestion layer decides where notes go.
//!
//! # Field precedence
//!
//! | Field | Source, first non-empty wins |
//! |-------|------------------------------|
//! | `name` | frontmatter `name` → file name without `.md` → full file name |
//! | `description` | frontmatter `description` → first body line → fallback |
//! | `model`, `color` | frontmatter only |

use anyhow::{bail, Result};

use crate::frontmatter::{parse_frontmatter, Frontmatter, Metadata};
use crate::models::{Agent, Command, ListingEntry, Plugin, PluginLinks, RawDocument};

/// Maximum description length in characters before truncation.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Appended to truncated descriptions.
pub const ELLIPSIS: &str = "...";

pub const PLUGIN_DESCRIPTION_FALLBACK: &str = "No description available";
pub const AGENT_DESCRIPTION_FALLBACK: &str = "Agent definition";
pub const COMMAND_DESCRIPTION_FALLBACK: &str = "Command definition";

/// A normalized value plus any notes produced while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub notes: Vec<String>,
}

/// Extract a plugin description from its README.
///
/// Skips a leading heading (ignoring blank lines before it), then returns the
/// first non-empty line that is not itself a heading.
pub fn extract_plugin_description(readme: &str) -> String {
    let mut lines = readme.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();

    if lines.peek().is_some_and(|l| is_heading(l)) {
        lines.next();
    }

    lines
        .find(|l| !is_heading(l))
        .map(str::to_string)
        .unwrap_or_else(|| PLUGIN_DESCRIPTION_FALLBACK.to_string())
}

/// First non-empty, non-heading line of `body`, truncated.
fn derive_description(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !is_heading(l))
        .map(str::to_string)
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#')
}

/// Cut `text` to [`MAX_DESCRIPTION_CHARS`] characters and append
/// [`ELLIPSIS`] if it is longer than that.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Name derived from a file name: drop a trailing `.md`, never empty.
pub fn name_from_file(file_name: &str) -> String {
    match file_name.strip_suffix(".md") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// Shared handling for agent and command documents.
struct ParsedDocument<'a> {
    metadata: Metadata,
    body: &'a str,
    name: String,
    description: String,
    notes: Vec<String>,
}

fn parse_document<'a>(
    doc: &'a RawDocument,
    kind: &str,
    fallback_description: &str,
) -> ParsedDocument<'a> {
    let mut notes = Vec::new();
    let parsed = parse_frontmatter(&doc.content);
    if let Frontmatter::Malformed { reason } = &parsed {
        notes.push(format!(
            "could not parse frontmatter for {} {}, using entire content: {}",
            kind, doc.file_name, reason
        ));
    }
    let (metadata, body) = parsed.into_parts(&doc.content);

    let name = metadata
        .get_str("name")
        .unwrap_or_else(|| name_from_file(&doc.file_name));
    let description = metadata
        .get_str("description")
        .or_else(|| derive_description(body))
        .map(|d| truncate_description(&d))
        .unwrap_or_else(|| fallback_description.to_string());

    ParsedDocument {
        metadata,
        body,
        name,
        description,
        notes,
    }
}

/// Build an [`Agent`] from one document in an `agents/` folder.
pub fn parse_agent(doc: &RawDocument) -> Normalized<Agent> {
    let parsed = parse_document(doc, "agent", AGENT_DESCRIPTION_FALLBACK);
    Normalized {
        value: Agent {
            model: parsed.metadata.get_str("model"),
            color: parsed.metadata.get_str("color"),
            name: parsed.name,
            description: parsed.description,
            prompt: parsed.body.to_string(),
            file_name: Some(doc.file_name.clone()),
        },
        notes: parsed.notes,
    }
}

/// Build a [`Command`] from one document in a `commands/` folder.
pub fn parse_command(doc: &RawDocument) -> Normalized<Command> {
    let parsed = parse_document(doc, "command", COMMAND_DESCRIPTION_FALLBACK);
    Normalized {
        value: Command {
            name: parsed.name,
            description: parsed.description,
            file_name: Some(doc.file_name.clone()),
        },
        notes: parsed.notes,
    }
}

/// Reject identifiers that cannot name a folder under the plugins directory.
pub fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("plugin identifier must not be empty");
    }
    if id.contains("..") || id.contains('\\') || id.chars().any(char::is_whitespace) {
        bail!("invalid plugin identifier: '{}'", id);
    }
    Ok(())
}

/// Build the catalog record for one listing entry from its raw artifacts.
///
/// Fails only if the identifier is invalid. Frontmatter problems in agent or
/// command documents become notes.
pub fn build_plugin(
    entry: &ListingEntry,
    readme: &str,
    agent_docs: &[RawDocument],
    command_docs: &[RawDocument],
    links: &PluginLinks,
) -> Result<Normalized<Plugin>> {
    validate_identifier(&entry.name)?;

    let mut notes = Vec::new();

    let agents = agent_docs
        .iter()
        .map(|doc| {
            let n = parse_agent(doc);
            notes.extend(n.notes);
            n.value
        })
        .collect();

    let commands = command_docs
        .iter()
        .map(|doc| {
            let n = parse_command(doc);
            notes.extend(n.notes);
            n.value
        })
        .collect();

    let plugin = Plugin {
        id: entry.name.clone(),
        name: entry.name.clone(),
        category: entry.category.clone(),
        description: extract_plugin_description(readme),
        readme: readme.to_string(),
        agents,
        commands,
        install_command: links.install_command(&entry.name),
        github_url: links.github_url(&entry.name),
    };

    Ok(Normalized {
        value: plugin,
        notes,
    })
}
