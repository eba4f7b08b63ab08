//! Read-only HTTP API over the saved catalog.
//!
//! The snapshot is loaded once at startup and served from memory; run
//! `catalog fetch` and restart to pick up new data.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/categories` | Configured categories in display order |
//! | `GET`  | `/plugins` | Full catalog array |
//! | `GET`  | `/plugins/{id}` | One plugin |
//! | `POST` | `/search` | Grouped view for `{ "query", "categories" }` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Unknown category: 'X'" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! can query the API directly.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use plugin_catalog_core::models::Plugin;
use plugin_catalog_core::search::{CatalogExplorer, ViewState};

use crate::config::Config;
use crate::search::load_explorer;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    explorer: Arc<CatalogExplorer>,
}

impl AppState {
    pub fn new(explorer: CatalogExplorer) -> Self {
        Self {
            explorer: Arc::new(explorer),
        }
    }
}

/// Starts the HTTP server on `[server].bind`. Runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let explorer = load_explorer(config)?;
    let plugins = explorer.catalog().len();
    let app = router(AppState::new(explorer));

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!(
        "Catalog server listening on http://{} ({} plugins)",
        bind_addr, plugins
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes and the CORS layer.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/categories", get(handle_categories))
        .route("/plugins", get(handle_plugins))
        .route("/plugins/{id}", get(handle_plugin))
        .route("/search", post(handle_search))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /categories ============

async fn handle_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .explorer
            .categories()
            .iter()
            .map(str::to_string)
            .collect(),
    )
}

// ============ GET /plugins ============

async fn handle_plugins(State(state): State<AppState>) -> Json<Vec<Plugin>> {
    Json(state.explorer.catalog().to_vec())
}

// ============ GET /plugins/{id} ============

async fn handle_plugin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Plugin>, AppError> {
    state
        .explorer
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("plugin not found: {}", id)))
}

// ============ POST /search ============

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Serialize)]
struct GroupResponse<'a> {
    category: &'a str,
    label: String,
    plugins: Vec<&'a Plugin>,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    state: ViewState,
    total: usize,
    matched: usize,
    groups: Vec<GroupResponse<'a>>,
}

async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Response, AppError> {
    let explorer = &state.explorer;
    let mut selected = BTreeSet::new();
    for name in req.categories {
        if !explorer.categories().contains(&name) {
            return Err(bad_request(format!("Unknown category: '{}'", name)));
        }
        selected.insert(name);
    }

    let view = explorer.view(&req.query, &selected);
    let body = SearchResponse {
        state: view.state,
        total: view.total,
        matched: view.matched,
        groups: view
            .groups
            .iter()
            .map(|g| GroupResponse {
                category: &g.category,
                label: g.label(),
                plugins: explorer.members(g).collect(),
            })
            .collect(),
    };
    Ok(Json(body).into_response())
}
