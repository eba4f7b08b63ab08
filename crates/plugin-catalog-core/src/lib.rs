//! # Plugin Catalog Core
//!
//! Pure logic for Plugin Catalog: data models, the root listing parser,
//! frontmatter and document normalization, fuzzy matching, and the
//! search/grouping view.
//!
//! This crate performs no network or filesystem I/O and has no async
//! runtime dependency. Fetching and persistence live in the
//! `plugin-catalog` binary crate.

pub mod category;
pub mod frontmatter;
pub mod fuzzy;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod search;
