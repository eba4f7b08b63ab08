//! # Plugin Catalog
//!
//! Builds a searchable catalog of Claude Code plugins from a GitHub
//! directory repository.
//!
//! The repository README lists plugins under category headings. `catalog
//! fetch` parses that listing, reads each plugin's README, `agents/*.md`,
//! and `commands/*.md`, normalizes them into [`models::Plugin`] records, and
//! writes one JSON document. The presentation side loads that snapshot and
//! answers fuzzy, category-filtered, grouped queries from the terminal or
//! over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────────┐
//! │ SourceClient │──▶│   Pipeline    │──▶│ data/plugins.json   │
//! │  (GitHub)    │   │ Parse+Normal. │   └──────────┬──────────┘
//! └──────────────┘   └──────────────┘              │
//!                                     ┌────────────┤
//!                                     ▼            ▼
//!                               ┌──────────┐ ┌──────────┐
//!                               │   CLI    │ │   HTTP   │
//!                               │(catalog) │ │  (axum)  │
//!                               └──────────┘ └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! catalog                        # fetch (same as `catalog fetch`)
//! catalog search "code review"   # grouped fuzzy search
//! catalog search --category Documentation
//! catalog get <id>
//! catalog serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`traits`] | The [`traits::SourceClient`] seam |
//! | [`connector_github`] | GitHub contents API client |
//! | [`fetch`] | Listing and per-plugin artifact retrieval |
//! | [`ingest`] | Fetch pipeline and run summary |
//! | [`export`] | Catalog file read/write |
//! | [`progress`] | Progress reporting on stderr |
//! | [`search`] | Terminal grouped view |
//! | [`get`] | Single plugin lookup |
//! | [`stats`] | Catalog statistics and category listing |
//! | [`server`] | HTTP API |
//!
//! Parsing, normalization, and search logic live in `plugin-catalog-core`.

pub mod config;
pub mod connector_github;
pub mod export;
pub mod fetch;
pub mod get;
pub mod ingest;
pub mod progress;
pub mod search;
pub mod server;
pub mod stats;
pub mod traits;

pub use plugin_catalog_core::models;
