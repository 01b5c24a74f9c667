//! Post error types.

use quickshare_shared::types::PostId;
use thiserror::Error;

/// Post operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    /// Input rejected before any backend call.
    #[error("{0}")]
    Validation(String),

    /// No post with that ID.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// Repository operation failed; message is the backend's.
    #[error("{0}")]
    Repository(String),

    /// Failure talking to a remote API.
    #[error("{0}")]
    Transport(String),
}

impl PostError {
    /// Message for a blank title.
    pub const TITLE_REQUIRED: &'static str = "Title is required";

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: PostId) -> Self {
        Self::NotFound(id)
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

impl From<PostError> for quickshare_shared::AppError {
    fn from(err: PostError) -> Self {
        let message = err.to_string();
        match err {
            PostError::Validation(_) => Self::Validation(message),
            PostError::NotFound(_) => Self::NotFound(message),
            PostError::Repository(_) => Self::Database(message),
            PostError::Transport(_) => Self::ExternalService(message),
        }
    }
}
