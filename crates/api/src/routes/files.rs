//! File listing and deletion routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use quickshare_core::files::StoredFile;
use quickshare_shared::types::{PageRequest, PageResponse};
use serde::Deserialize;
use tracing::{error, info};

use crate::AppState;
use crate::error::ApiError;

/// Creates the file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(list_files))
        .route("/files/{name}", delete(delete_file))
}

/// Query parameters for listing files.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// One-based page number.
    pub page: Option<u32>,
    /// Entries per page; the server default applies when absent.
    pub per_page: Option<u32>,
}

/// GET `/files`
/// One page of uploaded files, newest first.
async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<PageResponse<StoredFile>>, ApiError> {
    let request = PageRequest::new(
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(state.page_size),
    );

    let page = state
        .catalog
        .page(request)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to list files"))?;
    Ok(Json(page))
}

/// DELETE `/files/{name}`
async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .remove(&name)
        .await
        .inspect_err(|e| error!(error = %e, name = %name, "Failed to delete file"))?;
    info!(name = %name, "File removed via API");
    Ok(StatusCode::NO_CONTENT)
}
