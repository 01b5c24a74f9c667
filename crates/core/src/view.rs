//! Errors shared by the view controllers.

use thiserror::Error;

/// View controller errors. Backend messages are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Input rejected before any backend call.
    #[error("{0}")]
    Validation(String),

    /// A confirmation was acted on while none was open.
    #[error("nothing is awaiting confirmation")]
    NothingPending,

    /// The entry is already being deleted.
    #[error("{0} is already being deleted")]
    AlreadyDeleting(String),

    /// The open dialog is running its action.
    #[error("another action is in progress")]
    Busy,

    /// The backend call failed.
    #[error("{0}")]
    Backend(String),
}

impl ViewError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
