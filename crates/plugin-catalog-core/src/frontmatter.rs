//! YAML frontmatter extraction.
//!
//! Agent and command documents may start with a metadata block:
//!
//! ```text
//! ---
//! name: reviewer
//! description: Reviews pull requests
//! model: sonnet
//! ---
//! # Reviewer
//! ...
//! ```
//!
//! [`parse_frontmatter`] never fails. It reports what it found as a
//! [`Frontmatter`] value and leaves logging to the caller.

use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Parsed key-value metadata from a frontmatter block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    map: Mapping,
}

impl Metadata {
    /// Return `key` as a non-empty string.
    ///
    /// Strings are returned as-is, numbers and booleans are rendered.
    /// Empty strings, nulls, and nested values count as absent.
    pub fn get_str(&self, key: &str) -> Option<String> {
        let value = self.map.get(Value::String(key.to_string()))?;
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Outcome of looking for a frontmatter block.
#[derive(Debug, Clone, PartialEq)]
pub enum Frontmatter<'a> {
    /// The document has no delimited block; the whole text is body.
    Absent,
    /// A block was found and parsed; `body` is the text after it.
    Parsed { metadata: Metadata, body: &'a str },
    /// A block was found but is not valid YAML.
    Malformed { reason: String },
}

impl<'a> Frontmatter<'a> {
    /// Resolve to `(metadata, body)`, treating a malformed block as absent.
    pub fn into_parts(self, original: &'a str) -> (Metadata, &'a str) {
        match self {
            Frontmatter::Parsed { metadata, body } => (metadata, body),
            Frontmatter::Absent | Frontmatter::Malformed { .. } => {
                (Metadata::default(), original)
            }
        }
    }
}

/// Split a leading `---` block off `content` and parse it as YAML.
pub fn parse_frontmatter(content: &str) -> Frontmatter<'_> {
    let Some((block, body)) = split_frontmatter(content) else {
        return Frontmatter::Absent;
    };

    if block.trim().is_empty() {
        return Frontmatter::Parsed {
            metadata: Metadata::default(),
            body,
        };
    }

    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(map)) => Frontmatter::Parsed {
            metadata: Metadata { map },
            body,
        },
        Ok(_) => Frontmatter::Parsed {
            metadata: Metadata::default(),
            body,
        },
        Err(e) => Frontmatter::Malformed {
            reason: e.to_string(),
        },
    }
}

/// Return `(block, body)` if `content` opens with a delimiter line and has a
/// closing delimiter line. The body starts after the closing line's newline.
fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let block = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }

    None
}
