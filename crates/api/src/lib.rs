//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - File upload, listing, and deletion routes
//! - Text post CRUD routes
//! - Static serving of locally stored uploads

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use quickshare_core::files::FileCatalog;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room left in the request body limit for multipart framing.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Catalog over the upload folder.
    pub catalog: Arc<FileCatalog>,
    /// Default page size for file listings.
    pub page_size: u32,
}

impl AppState {
    /// Creates state with the given connection and catalog.
    #[must_use]
    pub fn new(db: DatabaseConnection, catalog: FileCatalog, page_size: u32) -> Self {
        Self {
            db: Arc::new(db),
            catalog: Arc::new(catalog),
            page_size,
        }
    }
}

/// Creates the main application router.
///
/// Uploads held on the local filesystem are served under `/storage`.
pub fn create_router(state: AppState) -> Router {
    let max_file_size = state.catalog.storage().config().max_file_size;
    let body_limit = usize::try_from(max_file_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let mut router = Router::new().nest("/api", routes::api_routes());

    if let Some(root) = state.catalog.storage().local_root() {
        router = router.nest_service("/storage", ServeDir::new(root));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
