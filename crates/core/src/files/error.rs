//! File catalog error types.

use thiserror::Error;

use crate::storage::StorageError;

/// File operation errors.
#[derive(Debug, Error)]
pub enum FileError {
    /// Nothing was provided to upload.
    #[error("No file uploaded")]
    NoFile,

    /// File exceeds the configured maximum.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    TooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// No object with that name.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Name is empty or addresses something outside the upload folder.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Storage backend failure; the backend's message is kept as-is.
    #[error(transparent)]
    Storage(StorageError),

    /// Failure talking to a remote API.
    #[error("{0}")]
    Transport(String),
}

impl FileError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an invalid name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName(name.into())
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

impl From<StorageError> for FileError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::FileTooLarge { size, max } => Self::TooLarge { size, max },
            StorageError::NotFound { key } => Self::NotFound(key),
            StorageError::InvalidKey(key) => Self::InvalidName(key),
            other => Self::Storage(other),
        }
    }
}

impl From<FileError> for quickshare_shared::AppError {
    fn from(err: FileError) -> Self {
        let message = err.to_string();
        match err {
            FileError::NoFile | FileError::InvalidName(_) => Self::Validation(message),
            FileError::TooLarge { .. } => Self::PayloadTooLarge(message),
            FileError::NotFound(_) => Self::NotFound(message),
            FileError::Storage(StorageError::AlreadyExists { .. }) => Self::Conflict(message),
            FileError::Storage(StorageError::Configuration(_)) => Self::Internal(message),
            FileError::Storage(_) | FileError::Transport(_) => Self::ExternalService(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickshare_shared::AppError;

    #[test]
    fn test_storage_errors_are_lifted() {
        assert!(matches!(
            FileError::from(StorageError::file_too_large(5, 4)),
            FileError::TooLarge { size: 5, max: 4 }
        ));
        assert!(matches!(
            FileError::from(StorageError::backend("Bucket not found")),
            FileError::Storage(_)
        ));
    }

    #[test]
    fn test_backend_message_is_kept_verbatim() {
        let err = FileError::from(StorageError::backend("Bucket not found"));
        assert_eq!(err.to_string(), "Bucket not found");
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.message(), "Bucket not found");
    }

    #[test]
    fn test_app_error_mapping() {
        assert_eq!(AppError::from(FileError::NoFile).status_code(), 400);
        assert_eq!(
            AppError::from(FileError::TooLarge { size: 2, max: 1 }).status_code(),
            413
        );
        assert_eq!(AppError::from(FileError::not_found("a")).status_code(), 404);
        assert_eq!(
            AppError::from(FileError::from(StorageError::already_exists("p"))).status_code(),
            409
        );
    }
}
