use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use plugin_catalog_core::category::CategorySet;
use plugin_catalog_core::fuzzy::MatchOptions;
use plugin_catalog_core::models::PluginLinks;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_readme_path")]
    pub readme_path: String,
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            branch: default_branch(),
            api_url: default_api_url(),
            readme_path: default_readme_path(),
            plugins_dir: default_plugins_dir(),
            token_env: default_token_env(),
            user_agent: default_user_agent(),
        }
    }
}

impl SourceConfig {
    pub fn links(&self) -> PluginLinks {
        PluginLinks::new(
            &self.owner,
            &self.repo,
            &self.branch,
            self.plugins_dir.trim_matches('/'),
        )
    }

    /// The access token, if the configured variable is set and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_owner() -> String {
    "ccplugins".to_string()
}
fn default_repo() -> String {
    "awesome-claude-code-plugins".to_string()
}
fn default_branch() -> String {
    "main".to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_readme_path() -> String {
    "README.md".to_string()
}
fn default_plugins_dir() -> String {
    "plugins".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_user_agent() -> String {
    format!("plugin-catalog/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub categories: CategorySet,
    #[serde(default = "default_document_globs")]
    pub document_globs: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            categories: CategorySet::default(),
            document_globs: default_document_globs(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("data/plugins.json")
}
fn default_document_globs() -> Vec<String> {
    vec!["*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_pause_every")]
    pub pause_every: usize,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            pause_every: default_pause_every(),
            pause_ms: default_pause_ms(),
        }
    }
}

fn default_pause_every() -> usize {
    10
}
fn default_pause_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_distance")]
    pub distance: usize,
    #[serde(default)]
    pub ignore_location: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            distance: default_distance(),
            ignore_location: false,
        }
    }
}

impl SearchConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold,
            distance: self.distance,
            ignore_location: self.ignore_location,
        }
    }
}

fn default_threshold() -> f64 {
    0.3
}
fn default_distance() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_progress")]
    pub progress: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress: default_progress(),
        }
    }
}

fn default_progress() -> String {
    "auto".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

/// Parse and validate a config document.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load the config at `path`. A missing file yields the built-in defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    // Validate source
    for (key, value) in [
        ("source.owner", &config.source.owner),
        ("source.repo", &config.source.repo),
        ("source.branch", &config.source.branch),
        ("source.readme_path", &config.source.readme_path),
        ("source.plugins_dir", &config.source.plugins_dir),
    ] {
        if value.trim().trim_matches('/').is_empty() {
            bail!("{} must not be empty", key);
        }
    }
    if !config.source.api_url.starts_with("http://")
        && !config.source.api_url.starts_with("https://")
    {
        bail!(
            "source.api_url must be an http(s) URL, got '{}'",
            config.source.api_url
        );
    }

    // Validate catalog
    if config.catalog.document_globs.is_empty() {
        bail!("catalog.document_globs must contain at least one pattern");
    }

    // Validate search
    if !(0.0..=1.0).contains(&config.search.threshold) {
        bail!("search.threshold must be in [0.0, 1.0]");
    }
    if config.search.distance == 0 {
        bail!("search.distance must be > 0");
    }

    match config.output.progress.as_str() {
        "auto" | "human" | "json" | "off" => {}
        other => bail!(
            "Unknown output.progress mode: '{}'. Must be auto, human, json, or off.",
            other
        ),
    }

    Ok(())
}
