//! Catalog search: weighted fuzzy index, category filter, and grouping.
//!
//! The whole catalog is small and resident in memory, so every query is a
//! linear pass over a prebuilt [`FuzzyIndex`]. The entry point is the pure
//! function [`compute_view`]:
//!
//! ```text
//! (query, selected categories, catalog) → CatalogView
//! ```
//!
//! # Pipeline
//!
//! 1. **Text filter**: if the trimmed query is non-empty, keep plugins with
//!    at least one field matching within the threshold, ranked best first.
//!    Otherwise keep every plugin in catalog order.
//! 2. **Category filter**: keep plugins whose category is selected (an
//!    empty selection keeps everything).
//! 3. **Grouping**: walk the category set in declared order and emit one
//!    group per category with at least one plugin.
//!
//! Both filters are per-plugin predicates, so applying them in either order
//! yields the same set.
//!
//! # Scoring
//!
//! Each matched field value contributes `score ^ (weight × norm)` to a
//! product, where `weight` is the key weight divided by the sum of all key
//! weights and `norm = 1 / sqrt(tokens in the value)`. Lower is better.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::category::CategorySet;
use crate::fuzzy::{FuzzyMatcher, MatchOptions};
use crate::models::Plugin;

/// A field of [`Plugin`] that takes part in text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Description,
    Readme,
    AgentName,
    AgentDescription,
    AgentPrompt,
}

impl SearchField {
    fn values<'a>(&self, plugin: &'a Plugin) -> Vec<&'a str> {
        match self {
            SearchField::Name => vec![plugin.name.as_str()],
            SearchField::Description => vec![plugin.description.as_str()],
            SearchField::Readme => vec![plugin.readme.as_str()],
            SearchField::AgentName => plugin.agents.iter().map(|a| a.name.as_str()).collect(),
            SearchField::AgentDescription => plugin
                .agents
                .iter()
                .map(|a| a.description.as_str())
                .collect(),
            SearchField::AgentPrompt => plugin.agents.iter().map(|a| a.prompt.as_str()).collect(),
        }
    }
}

/// A searchable field and its relative weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchKey {
    pub field: SearchField,
    pub weight: f64,
}

/// Name ranks highest, agent prompt bodies lowest.
pub const DEFAULT_KEYS: &[SearchKey] = &[
    SearchKey { field: SearchField::Name, weight: 2.0 },
    SearchKey { field: SearchField::Description, weight: 1.5 },
    SearchKey { field: SearchField::Readme, weight: 1.0 },
    SearchKey { field: SearchField::AgentName, weight: 1.0 },
    SearchKey { field: SearchField::AgentDescription, weight: 1.0 },
    SearchKey { field: SearchField::AgentPrompt, weight: 0.5 },
];

struct IndexedValue {
    /// Position in the key list.
    key: usize,
    text: Vec<char>,
    norm: f64,
}

/// Precomputed, lowercased field values for every plugin in a catalog.
pub struct FuzzyIndex {
    /// Normalized weight per key (sums to 1).
    weights: Vec<f64>,
    records: Vec<Vec<IndexedValue>>,
    options: MatchOptions,
}

/// One ranked text-search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Position of the plugin in the catalog.
    pub position: usize,
    pub score: f64,
}

impl FuzzyIndex {
    pub fn new(catalog: &[Plugin], options: MatchOptions) -> Self {
        Self::with_keys(catalog, DEFAULT_KEYS, options)
    }

    pub fn with_keys(catalog: &[Plugin], keys: &[SearchKey], options: MatchOptions) -> Self {
        let total: f64 = keys.iter().map(|k| k.weight).sum();
        let weights = keys
            .iter()
            .map(|k| if total > 0.0 { k.weight / total } else { 0.0 })
            .collect();

        let records = catalog
            .iter()
            .map(|plugin| {
                let mut values = Vec::new();
                for (key, search_key) in keys.iter().enumerate() {
                    for value in search_key.field.values(plugin) {
                        if value.trim().is_empty() {
                            continue;
                        }
                        values.push(IndexedValue {
                            key,
                            text: value.to_lowercase().chars().collect(),
                            norm: field_norm(value),
                        });
                    }
                }
                values
            })
            .collect();

        Self {
            weights,
            records,
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rank every plugin with at least one matching field, best first.
    /// Ties keep catalog order.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let matcher = FuzzyMatcher::new(query.trim(), self.options);
        if matcher.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(position, values)| {
                let mut matched = false;
                let mut total = 1.0f64;
                for value in values {
                    if let Some(score) = matcher.score(&value.text) {
                        matched = true;
                        let base = if score == 0.0 { f64::EPSILON } else { score };
                        total *= base.powf(self.weights[value.key] * value.norm);
                    }
                }
                matched.then_some(SearchHit {
                    position,
                    score: total,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        hits
    }
}

/// `1 / sqrt(token count)`, rounded to three decimals.
fn field_norm(value: &str) -> f64 {
    let tokens = value.split_whitespace().count().max(1) as f64;
    (1.0 / tokens.sqrt() * 1000.0).round() / 1000.0
}

/// Positions of plugins matching `query`, ranked; every position in catalog
/// order when the query is blank.
pub fn filter_text(index: &FuzzyIndex, query: &str) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..index.len()).collect();
    }
    index.search(query).into_iter().map(|h| h.position).collect()
}

/// Keep positions whose plugin category is in `selected`. An empty
/// selection keeps everything.
pub fn filter_categories(
    catalog: &[Plugin],
    positions: &[usize],
    selected: &BTreeSet<String>,
) -> Vec<usize> {
    if selected.is_empty() {
        return positions.to_vec();
    }
    positions
        .iter()
        .copied()
        .filter(|&p| selected.contains(&catalog[p].category))
        .collect()
}

/// What the view should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// The catalog itself is empty (never fetched).
    NoData,
    /// The catalog has plugins but none pass the current filters.
    NoResults,
    Results,
}

/// Plugins of one category, in filtered order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    /// Catalog positions of the group's plugins.
    pub positions: Vec<usize>,
}

impl CategoryGroup {
    /// Heading text, e.g. `"Documentation (2)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.category, self.positions.len())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Filtered and grouped catalog, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub state: ViewState,
    /// Plugins in the catalog.
    pub total: usize,
    /// Plugins passing both filters.
    pub matched: usize,
    pub groups: Vec<CategoryGroup>,
}

/// Partition `positions` by category, in category-set order. Categories
/// with no plugins are omitted. Plugins in categories outside the set
/// follow in groups of their own, in order of first appearance.
pub fn group_by_category(
    catalog: &[Plugin],
    positions: &[usize],
    categories: &CategorySet,
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = categories
        .iter()
        .filter_map(|category| {
            let members: Vec<usize> = positions
                .iter()
                .copied()
                .filter(|&p| catalog[p].category == category)
                .collect();
            (!members.is_empty()).then(|| CategoryGroup {
                category: category.to_string(),
                positions: members,
            })
        })
        .collect();

    let known = groups.len();
    for &p in positions {
        let category = &catalog[p].category;
        if categories.contains(category) {
            continue;
        }
        match groups[known..].iter_mut().find(|g| &g.category == category) {
            Some(group) => group.positions.push(p),
            None => groups.push(CategoryGroup {
                category: category.clone(),
                positions: vec![p],
            }),
        }
    }
    groups
}

/// Compute the grouped view for one `(query, selected)` pair.
///
/// `index` must have been built from `catalog`.
pub fn compute_view(
    catalog: &[Plugin],
    index: &FuzzyIndex,
    categories: &CategorySet,
    query: &str,
    selected: &BTreeSet<String>,
) -> CatalogView {
    let by_text = filter_text(index, query);
    let filtered = filter_categories(catalog, &by_text, selected);
    let groups = group_by_category(catalog, &filtered, categories);

    let state = if catalog.is_empty() {
        ViewState::NoData
    } else if filtered.is_empty() {
        ViewState::NoResults
    } else {
        ViewState::Results
    };

    CatalogView {
        state,
        total: catalog.len(),
        matched: filtered.len(),
        groups,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewKey {
    query: String,
    selected: BTreeSet<String>,
}

/// An immutable catalog snapshot with its search index.
///
/// The index is built once in [`CatalogExplorer::new`]. [`view`](Self::view)
/// remembers only the most recent `(query, selected)` result.
pub struct CatalogExplorer {
    catalog: Arc<Vec<Plugin>>,
    categories: CategorySet,
    index: FuzzyIndex,
    last: Mutex<Option<(ViewKey, Arc<CatalogView>)>>,
}

impl CatalogExplorer {
    pub fn new(catalog: Vec<Plugin>, categories: CategorySet, options: MatchOptions) -> Self {
        let index = FuzzyIndex::new(&catalog, options);
        Self {
            catalog: Arc::new(catalog),
            categories,
            index,
            last: Mutex::new(None),
        }
    }

    pub fn catalog(&self) -> &[Plugin] {
        &self.catalog
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Find a plugin by identifier (the first one, if listed twice).
    pub fn find(&self, id: &str) -> Option<&Plugin> {
        self.catalog.iter().find(|p| p.id == id)
    }

    /// Filtered and grouped view for `query` and `selected`.
    pub fn view(&self, query: &str, selected: &BTreeSet<String>) -> Arc<CatalogView> {
        let key = ViewKey {
            query: query.trim().to_string(),
            selected: selected.clone(),
        };

        if let Ok(last) = self.last.lock() {
            if let Some((k, v)) = last.as_ref() {
                if *k == key {
                    return v.clone();
                }
            }
        }

        let view = Arc::new(compute_view(
            &self.catalog,
            &self.index,
            &self.categories,
            &key.query,
            &key.selected,
        ));

        if let Ok(mut last) = self.last.lock() {
            *last = Some((key, view.clone()));
        }
        view
    }

    /// Plugins of `group`, in group order.
    pub fn members<'a>(&'a self, group: &'a CategoryGroup) -> impl Iterator<Item = &'a Plugin> {
        group.positions.iter().map(move |&p| &self.catalog[p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Agent;

    fn plugin(id: &str, category: &str, description: &str) -> Plugin {
        Plugin {
            id: id.to_string(),
            name: id.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            readme: String::new(),
            agents: vec![],
            commands: vec![],
            install_command: String::new(),
            github_url: String::new(),
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> (Vec<Plugin>, CategorySet) {
        let catalog = vec![
            plugin("audit-log", "Security", "Records access events"),
            plugin("doc-writer", "Documentation", "Writes reference docs"),
            plugin("secret-scan", "Security", "Finds leaked credentials"),
            plugin("api-docs", "Documentation", "Generates API docs"),
            plugin("pen-test", "Security", "Security testing helper"),
        ];
        let categories = CategorySet::new(["Documentation", "Security"]).unwrap();
        (catalog, categories)
    }

    #[test]
    fn category_filter_groups_under_one_heading() {
        let (catalog, categories) = sample();
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let view = compute_view(&catalog, &index, &categories, "", &set(&["Security"]));

        assert_eq!(view.state, ViewState::Results);
        assert_eq!(view.matched, 3);
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].label(), "Security (3)");
        assert_eq!(view.groups[0].positions, vec![0, 2, 4]);
    }

    #[test]
    fn groups_follow_category_order_not_data_order() {
        let (catalog, categories) = sample();
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let view = compute_view(&catalog, &index, &categories, "", &BTreeSet::new());
        let labels: Vec<String> = view.groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["Documentation (2)", "Security (3)"]);
    }

    #[test]
    fn fuzzy_query_matches_misspelling() {
        let (catalog, categories) = sample();
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let view = compute_view(&catalog, &index, &categories, "secret-scna", &BTreeSet::new());
        assert!(view
            .groups
            .iter()
            .flat_map(|g| g.positions.iter())
            .any(|&p| catalog[p].id == "secret-scan"));
    }

    #[test]
    fn name_match_outranks_description_match() {
        let catalog = vec![
            plugin("helper", "Security", "deploy things quickly"),
            plugin("deploy", "Security", "a helper"),
        ];
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let hits = index.search("deploy");
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn agent_fields_are_searchable() {
        let mut p = plugin("bundle", "Security", "misc");
        p.agents.push(Agent {
            name: "threat-modeler".into(),
            description: "models threats".into(),
            prompt: String::new(),
            model: None,
            color: None,
            file_name: None,
        });
        let catalog = vec![p, plugin("other", "Security", "misc")];
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let positions = filter_text(&index, "threat");
        assert_eq!(positions, vec![0]);
    }

    #[test]
    fn no_data_is_distinct_from_no_results() {
        let categories = CategorySet::default();
        let empty: Vec<Plugin> = vec![];
        let index = FuzzyIndex::new(&empty, MatchOptions::default());
        let view = compute_view(&empty, &index, &categories, "x", &BTreeSet::new());
        assert_eq!(view.state, ViewState::NoData);

        let (catalog, categories) = sample();
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let view = compute_view(&catalog, &index, &categories, "zzzzqqqq", &BTreeSet::new());
        assert_eq!(view.state, ViewState::NoResults);
        assert!(view.groups.is_empty());
        assert_eq!(view.total, 5);
    }

    #[test]
    fn filters_commute_and_intersect() {
        let (catalog, _) = sample();
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let all: Vec<usize> = (0..catalog.len()).collect();

        for query in ["", "docs", "secur", "zzz"] {
            for selected in [set(&[]), set(&["Security"]), set(&["Documentation", "Security"])] {
                let text_then_cat: BTreeSet<usize> =
                    filter_categories(&catalog, &filter_text(&index, query), &selected)
                        .into_iter()
                        .collect();

                let by_cat = filter_categories(&catalog, &all, &selected);
                let by_text: BTreeSet<usize> = filter_text(&index, query).into_iter().collect();
                let cat_then_text: BTreeSet<usize> =
                    by_cat.iter().copied().filter(|p| by_text.contains(p)).collect();

                let by_cat: BTreeSet<usize> = by_cat.into_iter().collect();
                let intersection: BTreeSet<usize> =
                    by_text.intersection(&by_cat).copied().collect();

                assert_eq!(text_then_cat, cat_then_text, "query={query:?}");
                assert_eq!(text_then_cat, intersection, "query={query:?}");
            }
        }
    }

    #[test]
    fn every_filtered_plugin_lands_in_exactly_one_group() {
        let (catalog, categories) = sample();
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        for query in ["", "doc", "s"] {
            let view = compute_view(&catalog, &index, &categories, query, &BTreeSet::new());
            let grouped: Vec<usize> = view.groups.iter().flat_map(|g| g.positions.clone()).collect();
            let unique: BTreeSet<usize> = grouped.iter().copied().collect();
            assert_eq!(grouped.len(), unique.len());
            assert_eq!(grouped.len(), view.matched);
            assert!(view.groups.iter().all(|g| !g.is_empty()));
        }
    }

    #[test]
    fn unlisted_categories_get_trailing_groups() {
        let (mut catalog, categories) = sample();
        catalog.push(plugin("old-one", "Legacy", "Retired helper"));
        catalog.insert(0, plugin("old-two", "Legacy", "Another retired helper"));
        catalog.push(plugin("misc", "Misc", "Odds and ends"));
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());

        let view = compute_view(&catalog, &index, &categories, "", &BTreeSet::new());
        let labels: Vec<String> = view.groups.iter().map(|g| g.label()).collect();
        assert_eq!(
            labels[labels.len() - 2..].to_vec(),
            vec!["Legacy (2)".to_string(), "Misc (1)".to_string()]
        );
        let grouped: usize = view.groups.iter().map(|g| g.len()).sum();
        assert_eq!(grouped, view.matched);
        assert_eq!(view.matched, catalog.len());
    }

    #[test]
    fn exact_value_outranks_partial_match() {
        let catalog = vec![
            plugin("docs-writer", "Documentation", "alpha"),
            plugin("docs", "Documentation", "beta"),
        ];
        let index = FuzzyIndex::new(&catalog, MatchOptions::default());
        let hits = index.search("docs");
        let order: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(order, vec![1, 0]);
        assert!(hits[0].score < hits[1].score);
    }

    #[test]
    fn explorer_memoizes_last_view() {
        let (catalog, categories) = sample();
        let explorer = CatalogExplorer::new(catalog, categories, MatchOptions::default());
        let a = explorer.view("docs ", &BTreeSet::new());
        let b = explorer.view(" docs", &BTreeSet::new());
        assert!(Arc::ptr_eq(&a, &b));

        let c = explorer.view("docs", &set(&["Security"]));
        assert!(!Arc::ptr_eq(&a, &c));
        let members: Vec<&str> = c
            .groups
            .iter()
            .flat_map(|g| explorer.members(g))
            .map(|p| p.id.as_str())
            .collect();
        assert!(members.iter().all(|id| explorer.find(id).unwrap().category == "Security"));
    }

    #[test]
    fn field_norm_rounds() {
        assert_eq!(field_norm("one"), 1.0);
        assert_eq!(field_norm("one two three four"), 0.5);
        assert_eq!(field_norm("a b c"), 0.577);
    }
}
