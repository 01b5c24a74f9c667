//! Error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quickshare_core::files::FileError;
use quickshare_core::posts::PostError;
use quickshare_shared::AppError;
use serde_json::json;

/// An [`AppError`] rendered as `{"error": message}` with its HTTP status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        Self(err.into())
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation("Title is required".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::NotFound("gone".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::PayloadTooLarge("big".into()), StatusCode::PAYLOAD_TOO_LARGE)]
    #[case(AppError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_follows_category(#[case] err: AppError, #[case] status: StatusCode) {
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), status);
    }
}
