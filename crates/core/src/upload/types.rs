//! Upload session types.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use bytes::Bytes;

use crate::files::{DEFAULT_CONTENT_TYPE, StoredFile};

/// A file picked for upload, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Original file name.
    pub name: String,
    /// Declared content type.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl LocalFile {
    /// Wrap in-memory contents.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(Self {
            name,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Outcome of one file in a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    /// Original file name.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last reported progress, 0 to 100.
    pub progress_percent: u8,
    /// Stored file on success.
    pub result: Option<StoredFile>,
    /// Error message on failure.
    pub error: Option<String>,
}

/// Settled outcome of every file in a submission, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// One entry per submitted file.
    pub tasks: Vec<UploadTask>,
}

impl UploadReport {
    /// Files that were stored.
    pub fn succeeded(&self) -> impl Iterator<Item = &StoredFile> {
        self.tasks.iter().filter_map(|t| t.result.as_ref())
    }

    /// Tasks that failed.
    pub fn failed(&self) -> impl Iterator<Item = &UploadTask> {
        self.tasks.iter().filter(|t| t.error.is_some())
    }

    /// First failure in submission order.
    #[must_use]
    pub fn first_failure(&self) -> Option<&UploadTask> {
        self.failed().next()
    }
}

/// Live progress of a submission, shared with the upload tasks.
#[derive(Debug)]
pub struct BatchProgress {
    percents: Vec<AtomicU8>,
    completed: AtomicUsize,
}

impl BatchProgress {
    /// Progress for `files` files, all at 0%.
    #[must_use]
    pub fn new(files: usize) -> Self {
        Self {
            percents: (0..files).map(|_| AtomicU8::new(0)).collect(),
            completed: AtomicUsize::new(0),
        }
    }

    /// Per-file progress, 0 to 100, in submission order.
    #[must_use]
    pub fn percents(&self) -> Vec<u8> {
        self.percents
            .iter()
            .map(|p| p.load(Ordering::Relaxed))
            .collect()
    }

    /// Progress of one file.
    #[must_use]
    pub fn percent(&self, index: usize) -> u8 {
        self.percents
            .get(index)
            .map_or(0, |p| p.load(Ordering::Relaxed))
    }

    /// Files stored so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Files in the submission.
    #[must_use]
    pub fn total(&self) -> usize {
        self.percents.len()
    }

    /// "N of M complete".
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} of {} complete", self.completed(), self.total())
    }

    pub(crate) fn set(&self, index: usize, percent: u8) {
        if let Some(slot) = self.percents.get(index) {
            slot.fetch_max(percent.min(100), Ordering::Relaxed);
        }
    }

    pub(crate) fn mark_complete(&self, index: usize) {
        self.set(index, 100);
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Progress reporter handed to a transport for one file.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    batch: Arc<BatchProgress>,
    index: usize,
}

impl ProgressHandle {
    pub(crate) fn new(batch: Arc<BatchProgress>, index: usize) -> Self {
        Self { batch, index }
    }

    /// Handle that reports into a private one-file batch.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(Arc::new(BatchProgress::new(1)), 0)
    }

    /// Record that `sent` of `total` bytes have been transferred.
    pub fn report(&self, sent: u64, total: u64) {
        let percent = if total == 0 {
            100
        } else {
            (sent.min(total) * 100 / total) as u8
        };
        self.batch.set(self.index, percent);
    }

    /// Current percent for this file.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.batch.percent(self.index)
    }
}
