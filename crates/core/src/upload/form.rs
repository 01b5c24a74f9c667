//! Headless controller for the upload form.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::UploadError;
use super::orchestrator::{UploadOrchestrator, UploadTransport};
use super::types::{BatchProgress, LocalFile, UploadReport};

/// Snapshot of the upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadFormSnapshot {
    /// Names of the selected files.
    pub selected: Vec<String>,
    /// A submission is running.
    pub uploading: bool,
    /// Per-file progress of the running or last submission.
    pub percents: Vec<u8>,
    /// "N of M complete" for the running or last submission.
    pub summary: Option<String>,
    /// Report of the last successful submission.
    pub report: Option<UploadReport>,
    /// Last error message.
    pub error: Option<String>,
}

#[derive(Default)]
struct FormState {
    selected: Vec<LocalFile>,
    uploading: bool,
    progress: Option<Arc<BatchProgress>>,
    report: Option<UploadReport>,
    error: Option<String>,
}

/// Upload form: file selection, submit, progress, and result.
pub struct UploadForm<T: UploadTransport> {
    orchestrator: UploadOrchestrator<T>,
    state: Mutex<FormState>,
}

impl<T: UploadTransport> UploadForm<T> {
    /// Creates an empty form.
    #[must_use]
    pub fn new(orchestrator: UploadOrchestrator<T>) -> Self {
        Self {
            orchestrator,
            state: Mutex::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the selection. An empty selection leaves the form untouched.
    pub fn select(&self, files: Vec<LocalFile>) {
        if files.is_empty() {
            return;
        }
        let mut state = self.state();
        state.selected = files;
        state.error = None;
        state.report = None;
    }

    /// Upload the selection.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NoFiles`] when nothing is selected, or the first
    /// file failure; the message is also kept in the snapshot.
    pub async fn submit(&self) -> Result<UploadReport, UploadError> {
        let files = {
            let mut state = self.state();
            if state.selected.is_empty() {
                state.error = Some(UploadError::NoFiles.to_string());
                return Err(UploadError::NoFiles);
            }
            state.error = None;
            state.selected.clone()
        };

        let batch = self.orchestrator.start(files)?;
        {
            let mut state = self.state();
            state.uploading = true;
            state.progress = Some(batch.progress());
        }

        let result = batch.finish().await;

        let mut state = self.state();
        state.uploading = false;
        match &result {
            Ok(report) => state.report = Some(report.clone()),
            Err(e) => state.error = Some(e.to_string()),
        }
        result
    }

    /// Clear selection, result, and error.
    pub fn reset(&self) {
        *self.state() = FormState::default();
    }

    /// Current form state.
    #[must_use]
    pub fn snapshot(&self) -> UploadFormSnapshot {
        let state = self.state();
        UploadFormSnapshot {
            selected: state.selected.iter().map(|f| f.name.clone()).collect(),
            uploading: state.uploading,
            percents: state
                .progress
                .as_ref()
                .map(|p| p.percents())
                .unwrap_or_default(),
            summary: state.progress.as_ref().map(|p| p.summary()),
            report: state.report.clone(),
            error: state.error.clone(),
        }
    }
}
