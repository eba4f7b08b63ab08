//! The closed, ordered set of plugin categories.
//!
//! Declaration order is display order: grouped views iterate the set from
//! first to last, so group order never depends on the data.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Categories of the upstream plugin directory, in display order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Official Claude Code Plugins",
    "Workflow Orchestration",
    "Automation DevOps",
    "Business Sales",
    "Code Quality Testing",
    "Data Analytics",
    "Design UX",
    "Development Engineering",
    "Documentation",
    "Git Workflow",
    "Marketing Growth",
    "Project & Product Management",
    "Security, Compliance, & Legal",
];

/// An ordered set of category names, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    /// Build a set from names. Names must be non-empty and distinct.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if name.trim().is_empty() {
                bail!("category names must not be empty");
            }
            if out.contains(&name) {
                bail!("duplicate category: '{}'", name);
            }
            out.push(name);
        }
        if out.is_empty() {
            bail!("category set must not be empty");
        }
        Ok(Self { names: out })
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Position of `name` in display order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TryFrom<Vec<String>> for CategorySet {
    type Error = anyhow::Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<CategorySet> for Vec<String> {
    fn from(set: CategorySet) -> Self {
        set.names
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
