//! Root listing parser.
//!
//! Turns the repository README into an ordered list of
//! [`ListingEntry`] values. The README is only loosely structured, so the
//! parser is a single line scan with one piece of state, the current
//! category:
//!
//! ```text
//! ### Documentation              ← recognized heading: current = "Documentation"
//! - [foo](./plugins/foo)         ← entity reference: push ("foo", "Documentation")
//! ### Sponsors                   ← unknown heading: ignored, current unchanged
//! - [bar](./plugins/bar)         ← push ("bar", "Documentation")
//! ```
//!
//! References that appear before the first recognized heading are dropped.
//! Duplicate references are kept.

use anyhow::Result;
use regex::Regex;

use crate::category::CategorySet;
use crate::models::ListingEntry;

const HEADING_PREFIX: &str = "### ";

/// Headings containing these words are never category boundaries.
const EXCLUDED_HEADING_WORDS: &[&str] = &["Contributing", "License"];

/// Parser for the root listing document.
#[derive(Debug, Clone)]
pub struct ListingParser {
    categories: CategorySet,
    entity_link: Regex,
}

impl ListingParser {
    /// Create a parser recognizing `categories` and entity links of the form
    /// `- [label](./<plugins_dir>/<name>)`.
    pub fn new(categories: CategorySet, plugins_dir: &str) -> Result<Self> {
        let prefix = plugins_dir.trim_matches('/');
        let pattern = format!(
            r#"^-\s*\[([^\]]+)\]\(\./{}/([^)"]+)"#,
            regex::escape(prefix)
        );
        Ok(Self {
            categories,
            entity_link: Regex::new(&pattern)?,
        })
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Scan `text` and return every entity reference that falls under a
    /// recognized category heading, in document order.
    pub fn parse(&self, text: &str) -> Vec<ListingEntry> {
        let mut entries = Vec::new();
        let mut current: Option<&str> = None;

        for raw in text.lines() {
            let line = raw.trim();

            if let Some(heading) = self.category_heading(line) {
                current = Some(heading);
            }

            let Some(category) = current else {
                continue;
            };
            if let Some(name) = self.entity_reference(line) {
                entries.push(ListingEntry::new(name, category));
            }
        }

        entries
    }

    /// Return the category named by `line` if it is a recognized heading.
    fn category_heading<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(HEADING_PREFIX)?;
        if EXCLUDED_HEADING_WORDS.iter().any(|w| line.contains(w)) {
            return None;
        }
        let name = rest.trim();
        self.categories.contains(name).then_some(name)
    }

    /// Return the identifier referenced by `line`, if it is an entity link.
    fn entity_reference<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.entity_link.captures(line)?;
        let name = caps.get(2)?.as_str().trim().trim_end_matches('/');
        (!name.is_empty()).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ListingParser {
        ListingParser::new(CategorySet::default(), "plugins").unwrap()
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(parser().parse("").is_empty());
    }

    #[test]
    fn reference_under_heading() {
        let entries = parser().parse("### Documentation\n- [foo](./plugins/foo)\n");
        assert_eq!(entries, vec![ListingEntry::new("foo", "Documentation")]);
    }

    #[test]
    fn references_before_first_heading_are_dropped() {
        let text = "- [early](./plugins/early)\n### Git Workflow\n- [late](./plugins/late)";
        let entries = parser().parse(text);
        assert_eq!(entries, vec![ListingEntry::new("late", "Git Workflow")]);
    }

    #[test]
    fn unknown_heading_keeps_current_category() {
        let text = "\
### Documentation
- [a](./plugins/a)
### Sponsors
- [b](./plugins/b)
### Data Analytics
- [c](./plugins/c)";
        let entries = parser().parse(text);
        assert_eq!(
            entries,
            vec![
                ListingEntry::new("a", "Documentation"),
                ListingEntry::new("b", "Documentation"),
                ListingEntry::new("c", "Data Analytics"),
            ]
        );
    }

    #[test]
    fn unknown_heading_before_any_category_is_a_no_op() {
        let text = "### Sponsors\n- [x](./plugins/x)";
        assert!(parser().parse(text).is_empty());
    }

    #[test]
    fn contributing_and_license_headings_are_ignored() {
        let set = CategorySet::new(["Documentation", "License", "Contributing Guide"]).unwrap();
        let parser = ListingParser::new(set, "plugins").unwrap();
        let text = "\
### Documentation
### License
- [a](./plugins/a)
### Contributing Guide
- [b](./plugins/b)";
        let entries = parser.parse(text);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.category == "Documentation"));
    }

    #[test]
    fn headings_must_match_exactly() {
        let text = "### documentation\n- [a](./plugins/a)\n#### Documentation\n- [b](./plugins/b)";
        assert!(parser().parse(text).is_empty());
    }

    #[test]
    fn indented_lines_and_trailing_slash() {
        let text = "  ### Design UX  \n   -   [Pretty Name](./plugins/ui-kit/)";
        let entries = parser().parse(text);
        assert_eq!(entries, vec![ListingEntry::new("ui-kit", "Design UX")]);
    }

    #[test]
    fn link_title_is_not_part_of_identifier() {
        let text = "### Design UX\n- [x](./plugins/figma \"Figma tools\")";
        let entries = parser().parse(text);
        assert_eq!(entries[0].name, "figma");
    }

    #[test]
    fn non_plugin_links_are_ignored() {
        let text = "### Design UX\n- [docs](https://example.com)\n- [x](./docs/x)\n* [y](./plugins/y)";
        assert!(parser().parse(text).is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let text = "### Documentation\n- [a](./plugins/a)\n### Git Workflow\n- [a](./plugins/a)";
        let entries = parser().parse(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, entries[1].name);
        assert_ne!(entries[0].category, entries[1].category);
    }

    #[test]
    fn custom_plugins_dir() {
        let set = CategorySet::new(["Tools"]).unwrap();
        let parser = ListingParser::new(set, "/extensions/").unwrap();
        let entries = parser.parse("### Tools\n- [a](./extensions/a)\n- [b](./plugins/b)");
        assert_eq!(entries, vec![ListingEntry::new("a", "Tools")]);
    }
}
