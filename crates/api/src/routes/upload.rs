//! File upload route.
//!
//! `POST /upload` accepts one multipart part named `file` and stores it under a
//! fresh name in the upload folder.

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;
use quickshare_core::files::FileError;

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_file).get(method_not_allowed))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Successful upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always true.
    pub success: bool,
    /// Original file name as submitted.
    pub file_name: String,
    /// Stored object path inside the bucket.
    pub file_path: String,
    /// Unauthenticated download link.
    pub public_url: String,
    /// Size in bytes.
    pub size: u64,
    /// Content type as stored.
    pub mimetype: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn no_file_uploaded() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file uploaded" })),
    )
        .into_response()
}

fn file_too_large(details: &str) -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(json!({ "error": "File too large", "details": details })),
    )
        .into_response()
}

fn read_failed(err: &MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large(&err.body_text());
    }

    error!(error = %err, "Failed to read upload body");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "details": err.body_text() })),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/upload`
/// Store the `file` part and return where it landed.
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        warn!("Upload request was not multipart");
        return no_file_uploaded();
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return no_file_uploaded(),
            Err(e) => return read_failed(&e),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = match field.bytes().await {
            Ok(body) => body,
            Err(e) => return read_failed(&e),
        };

        return store(&state, &original_name, &content_type, body).await;
    }
}

async fn store(state: &AppState, original_name: &str, content_type: &str, body: Bytes) -> Response {
    match state.catalog.upload(original_name, content_type, body).await {
        Ok(stored) => {
            info!(file_name = %original_name, path = %stored.path, size = stored.size, "Upload accepted");
            (
                StatusCode::OK,
                Json(UploadResponse {
                    success: true,
                    file_name: original_name.to_string(),
                    file_path: stored.path,
                    public_url: stored.public_url,
                    size: stored.size,
                    mimetype: stored.mime_type,
                }),
            )
                .into_response()
        }
        Err(FileError::NoFile) => no_file_uploaded(),
        Err(e @ FileError::TooLarge { .. }) => file_too_large(&e.to_string()),
        Err(e) => {
            error!(error = %e, file_name = %original_name, "Failed to upload file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to upload file", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET `/upload`
async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}
