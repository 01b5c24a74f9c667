//! Text post routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use quickshare_core::posts::{PostInput, PostService, TextPost};
use quickshare_db::PostRepository;
use quickshare_shared::types::PostId;
use tracing::error;

use crate::AppState;
use crate::error::ApiError;

/// Creates the post routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", put(update_post).delete(delete_post))
}

fn service(state: &AppState) -> PostService<PostRepository> {
    PostService::new(Arc::new(PostRepository::new((*state.db).clone())))
}

/// GET `/posts`
/// All posts, newest first.
async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<TextPost>>, ApiError> {
    let posts = service(&state)
        .list()
        .await
        .inspect_err(|e| error!(error = %e, "Failed to list posts"))?;
    Ok(Json(posts))
}

/// POST `/posts`
async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<TextPost>), ApiError> {
    let post = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT `/posts/{id}`
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    Json(input): Json<PostInput>,
) -> Result<Json<TextPost>, ApiError> {
    let post = service(&state).update(id, input).await?;
    Ok(Json(post))
}

/// DELETE `/posts/{id}`
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<StatusCode, ApiError> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
