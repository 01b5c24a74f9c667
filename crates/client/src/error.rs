//! Client error types.

use quickshare_core::files::FileError;
use quickshare_core::posts::PostError;
use quickshare_shared::types::PostId;
use thiserror::Error;

/// Errors from talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server message, with details appended when present.
        message: String,
    },
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }

    pub(crate) fn into_file_error(self) -> FileError {
        FileError::transport(self.to_string())
    }

    pub(crate) fn into_post_error(self, id: Option<PostId>) -> PostError {
        match (self.status(), id) {
            (Some(400), _) => PostError::validation(self.message()),
            (Some(404), Some(id)) => PostError::not_found(id),
            _ => PostError::Transport(self.to_string()),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(e) => e.to_string(),
        }
    }
}
