//! Upload error types.

use thiserror::Error;

use super::types::UploadReport;

/// Upload submission errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The submission held no files.
    #[error("Please select a file first")]
    NoFiles,

    /// At least one file failed; the report holds every settled outcome.
    #[error("{message}")]
    Failed {
        /// Name of the first failing file.
        file_name: String,
        /// Its error message, verbatim.
        message: String,
        /// Outcomes of the whole submission.
        report: Box<UploadReport>,
    },
}

impl UploadError {
    /// The settled report, when uploads were attempted.
    #[must_use]
    pub fn report(&self) -> Option<&UploadReport> {
        match self {
            Self::NoFiles => None,
            Self::Failed { report, .. } => Some(report),
        }
    }
}
