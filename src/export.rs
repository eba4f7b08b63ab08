//! Catalog persistence.
//!
//! The catalog is one pretty-printed JSON array written wholesale. Writes go
//! to a sibling temporary file which is then renamed over the target, so a
//! reader never sees a half-written document.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use plugin_catalog_core::models::Plugin;

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenCatalog {
    pub path: PathBuf,
    pub plugins: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the written document.
    pub sha256: String,
}

/// Serialize `catalog` in order.
pub fn render_catalog(catalog: &[Plugin]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(catalog)?;
    json.push('\n');
    Ok(json)
}

/// Write `catalog` to `path`, creating parent directories.
pub fn write_catalog(path: &Path, catalog: &[Plugin]) -> Result<WrittenCatalog> {
    let json = render_catalog(catalog)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, &json)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move catalog into place at {}", path.display()))?;

    Ok(WrittenCatalog {
        path: path.to_path_buf(),
        plugins: catalog.len(),
        bytes: json.len(),
        sha256: hex::encode(Sha256::digest(json.as_bytes())),
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "catalog".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load a saved catalog. `Ok(None)` means nothing has been fetched yet.
pub fn load_catalog(path: &Path) -> Result<Option<Vec<Plugin>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read catalog: {}", path.display()))
        }
    };
    let catalog: Vec<Plugin> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
    Ok(Some(catalog))
}
