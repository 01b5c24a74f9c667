//! Multi-file uploads: concurrent dispatch, progress tracking, and the form view.

mod error;
mod form;
mod orchestrator;
mod types;

pub use error::UploadError;
pub use form::{UploadForm, UploadFormSnapshot};
pub use orchestrator::{DEFAULT_CONCURRENCY, UploadBatch, UploadOrchestrator, UploadTransport, chunked};
pub use types::{BatchProgress, LocalFile, ProgressHandle, UploadReport, UploadTask};

#[cfg(test)]
mod tests;
