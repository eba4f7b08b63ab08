//! The remote source seam.
//!
//! The ingestion pipeline never talks to GitHub directly. It asks a
//! [`SourceClient`] for repository paths and gets back a [`Contents`]
//! value: a decoded file, a directory listing, or "missing".
//!
//! ```text
//! ┌─────────────────────┐      get_contents("plugins/foo/agents")
//! │   ingest pipeline   │ ───────────────────────────────────────┐
//! └─────────────────────┘                                        ▼
//!                                              ┌───────────────────────────┐
//!                                              │  dyn SourceClient         │
//!                                              │  ├─ GitHubClient (HTTP)   │
//!                                              │  └─ test fakes            │
//!                                              └───────────────────────────┘
//! ```
//!
//! The client is threaded through as `Arc<dyn SourceClient>`, so tests can
//! substitute an in-memory tree without touching the network.

use anyhow::Result;
use async_trait::async_trait;

/// Kind of an entry in a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules, and anything else.
    Other,
}

/// One entry of a remote directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Base name, e.g. `"reviewer.md"`.
    pub name: String,
    /// Full repository path, e.g. `"plugins/foo/agents/reviewer.md"`.
    pub path: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
        }
    }
}

/// What lives at a repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// A file, decoded to text.
    File(String),
    /// A directory, in the order the source lists it.
    Dir(Vec<RemoteEntry>),
    /// Nothing exists at this path.
    Missing,
}

/// Read access to the remote source tree.
///
/// Implementations should map "not found" to [`Contents::Missing`] and
/// reserve `Err` for transport, authorization, and decoding failures.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Short label used in log lines (e.g. `"github:ccplugins/awesome-claude-code-plugins"`).
    fn label(&self) -> String;

    /// Fetch whatever lives at `path` (relative to the repository root).
    async fn get_contents(&self, path: &str) -> Result<Contents>;
}
