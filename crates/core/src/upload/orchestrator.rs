//! Concurrent multi-file upload dispatch.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::error::UploadError;
use super::types::{BatchProgress, LocalFile, ProgressHandle, UploadReport, UploadTask};
use crate::files::{FileCatalog, FileError, StoredFile};

/// Default number of files uploaded at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Sends one file to wherever files are stored.
pub trait UploadTransport: Send + Sync + 'static {
    /// Upload `file`, reporting transferred bytes through `progress`.
    fn upload(
        &self,
        file: LocalFile,
        progress: ProgressHandle,
    ) -> impl Future<Output = Result<StoredFile, FileError>> + Send;
}

impl UploadTransport for FileCatalog {
    async fn upload(
        &self,
        file: LocalFile,
        progress: ProgressHandle,
    ) -> Result<StoredFile, FileError> {
        let size = file.size();
        progress.report(0, size);
        let stored = FileCatalog::upload(self, &file.name, &file.content_type, file.bytes).await?;
        progress.report(size, size);
        Ok(stored)
    }
}

/// Dispatches one upload per file, at most `concurrency` at a time.
pub struct UploadOrchestrator<T: UploadTransport> {
    transport: Arc<T>,
    permits: Arc<Semaphore>,
}

/// A submission in flight.
pub struct UploadBatch {
    progress: Arc<BatchProgress>,
    files: Vec<(String, u64)>,
    handles: Vec<JoinHandle<Result<StoredFile, FileError>>>,
}

impl<T: UploadTransport> UploadOrchestrator<T> {
    /// Creates an orchestrator. A concurrency of 0 is treated as 1.
    #[must_use]
    pub fn new(transport: Arc<T>, concurrency: usize) -> Self {
        Self {
            transport,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Start uploading every file.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NoFiles`] for an empty submission without
    /// contacting the transport.
    pub fn start(&self, files: Vec<LocalFile>) -> Result<UploadBatch, UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }

        let progress = Arc::new(BatchProgress::new(files.len()));
        let mut names = Vec::with_capacity(files.len());
        let mut handles = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            names.push((file.name.clone(), file.size()));

            let transport = Arc::clone(&self.transport);
            let permits = Arc::clone(&self.permits);
            let handle = ProgressHandle::new(Arc::clone(&progress), index);
            let batch = Arc::clone(&progress);

            handles.push(tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| FileError::transport(e.to_string()))?;
                let stored = transport.upload(file, handle).await?;
                batch.mark_complete(index);
                Ok(stored)
            }));
        }

        Ok(UploadBatch {
            progress,
            files: names,
            handles,
        })
    }

    /// Upload every file and wait for all of them to settle.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NoFiles`] for an empty submission, or
    /// [`UploadError::Failed`] carrying the first failure when any file fails.
    /// Other files are not cancelled.
    pub async fn upload_all(&self, files: Vec<LocalFile>) -> Result<UploadReport, UploadError> {
        self.start(files)?.finish().await
    }
}

impl UploadBatch {
    /// Live progress.
    #[must_use]
    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// Wait for every upload to settle.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Failed`] when any file failed.
    pub async fn finish(self) -> Result<UploadReport, UploadError> {
        let outcomes = join_all(self.handles).await;

        let tasks: Vec<UploadTask> = outcomes
            .into_iter()
            .zip(self.files)
            .enumerate()
            .map(|(index, (outcome, (file_name, size)))| {
                let progress_percent = self.progress.percent(index);
                match outcome {
                    Ok(Ok(stored)) => {
                        info!(file = %file_name, path = %stored.path, size, "Upload finished");
                        UploadTask {
                            file_name,
                            size,
                            progress_percent,
                            result: Some(stored),
                            error: None,
                        }
                    }
                    Ok(Err(e)) => {
                        error!(error = %e, file = %file_name, "Upload failed");
                        UploadTask {
                            file_name,
                            size,
                            progress_percent,
                            result: None,
                            error: Some(e.to_string()),
                        }
                    }
                    Err(e) => {
                        error!(error = %e, file = %file_name, "Upload task aborted");
                        UploadTask {
                            file_name,
                            size,
                            progress_percent,
                            result: None,
                            error: Some(format!("upload task aborted: {e}")),
                        }
                    }
                }
            })
            .collect();

        let report = UploadReport { tasks };
        if let Some(failed) = report.first_failure() {
            return Err(UploadError::Failed {
                file_name: failed.file_name.clone(),
                message: failed.error.clone().unwrap_or_default(),
                report: Box::new(report),
            });
        }
        Ok(report)
    }
}

/// Bytes of a file as a stream of chunks, for transports that stream bodies.
#[must_use]
pub fn chunked(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect()
}
