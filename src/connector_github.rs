//! GitHub contents API client.
//!
//! Reads files and directory listings with
//! `GET {api_url}/repos/{owner}/{repo}/contents/{path}?ref={branch}`.
//!
//! # Response shapes
//!
//! - A **file** is a JSON object with `type: "file"`, `encoding: "base64"`,
//!   and `content` holding base64 text wrapped with newlines.
//! - A **directory** is a JSON array of `{ name, path, type }` objects.
//! - A missing path is HTTP 404, mapped to [`Contents::Missing`].
//!
//! # Authentication
//!
//! If the environment variable named by `[source] token_env` is set, its
//! value is sent as a bearer token. Unauthenticated requests work but are
//! heavily rate limited.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use crate::config::SourceConfig;
use crate::traits::{Contents, EntryKind, RemoteEntry, SourceClient};

/// A [`SourceClient`] backed by the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
    user_agent: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_url: source.api_url.trim_end_matches('/').to_string(),
            owner: source.owner.clone(),
            repo: source.repo.clone(),
            branch: source.branch.clone(),
            user_agent: source.user_agent.clone(),
            token: source.token(),
        })
    }

    /// Each path segment is percent-encoded, so identifiers containing `#`,
    /// `?` or `%` still address their own folder.
    fn contents_url(&self, path: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API URL '{}'", self.api_url))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("API URL '{}' cannot take a path", self.api_url))?;
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }
}

#[async_trait]
impl SourceClient for GitHubClient {
    fn label(&self) -> String {
        format!("github:{}/{}", self.owner, self.repo)
    }

    async fn get_contents(&self, path: &str) -> Result<Contents> {
        let url = self.contents_url(path)?;

        let mut req = self
            .http
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/vnd.github+json");
        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch {}: {}", path, e))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Contents::Missing);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "GitHub contents request failed (HTTP {}) for '{}': {}",
                status,
                path,
                body.chars().take(500).collect::<String>()
            );
        }

        let body = resp.text().await?;
        parse_contents_response(&body).with_context(|| format!("Bad response for '{}'", path))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Dir(Vec<DirItem>),
    File(FileItem),
}

#[derive(Debug, Deserialize)]
struct DirItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct FileItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Parse a contents API response body.
pub fn parse_contents_response(body: &str) -> Result<Contents> {
    let parsed: ContentsResponse =
        serde_json::from_str(body).context("Failed to parse contents response")?;

    match parsed {
        ContentsResponse::Dir(items) => Ok(Contents::Dir(
            items
                .into_iter()
                .map(|item| RemoteEntry {
                    kind: match item.kind.as_str() {
                        "file" => EntryKind::File,
                        "dir" => EntryKind::Dir,
                        _ => EntryKind::Other,
                    },
                    name: item.name,
                    path: item.path,
                })
                .collect(),
        )),
        ContentsResponse::File(file) => {
            if file.kind != "file" {
                bail!("Expected a file, got '{}'", file.kind);
            }
            match file.encoding.as_deref() {
                Some("base64") | None => {}
                Some(other) => bail!("Unsupported content encoding '{}'", other),
            }
            let content = file.content.unwrap_or_default();
            Ok(Contents::File(decode_base64_content(&content)?))
        }
    }
}

/// Decode GitHub's newline-wrapped base64 into UTF-8 text.
fn decode_base64_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .context("Invalid base64 content")?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
