//! Upload orchestration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;

use super::*;
use crate::files::{FileCatalog, FileError, StoredFile};
use crate::storage::StorageService;

/// Transport that records calls and fails files whose name starts with "bad".
#[derive(Default)]
struct MockTransport {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl UploadTransport for MockTransport {
    async fn upload(
        &self,
        file: LocalFile,
        progress: ProgressHandle,
    ) -> Result<StoredFile, FileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let size = file.size();
        progress.report(size / 2, size);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if file.name.starts_with("bad") {
            return Err(FileError::transport(format!("{} was rejected", file.name)));
        }
        progress.report(size, size);
        Ok(StoredFile {
            name: format!("1-{}", file.name),
            path: format!("user-uploads/1-{}", file.name),
            public_url: format!("http://files.test/1-{}", file.name),
            size,
            mime_type: file.content_type,
            created_at: None,
        })
    }
}

fn file(name: &str, body: &'static [u8]) -> LocalFile {
    LocalFile::new(name, "text/plain", Bytes::from_static(body))
}

#[tokio::test]
async fn test_empty_submission_never_calls_transport() {
    let transport = Arc::new(MockTransport::default());
    let orchestrator = UploadOrchestrator::new(Arc::clone(&transport), 4);

    let err = orchestrator.upload_all(Vec::new()).await.unwrap_err();
    assert!(matches!(err, UploadError::NoFiles));
    assert_eq!(err.to_string(), "Please select a file first");
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_all_files_uploaded_in_order() {
    let transport = Arc::new(MockTransport::default());
    let orchestrator = UploadOrchestrator::new(Arc::clone(&transport), 4);

    let report = orchestrator
        .upload_all(vec![file("a.txt", b"aaaa"), file("b.txt", b"bb")])
        .await
        .expect("uploads succeed");

    let names: Vec<_> = report.tasks.iter().map(|t| t.file_name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);
    assert!(report.tasks.iter().all(|t| t.progress_percent == 100));
    assert_eq!(report.succeeded().count(), 2);
    assert_eq!(report.tasks[0].result.as_ref().map(|s| s.size), Some(4));
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let transport = Arc::new(MockTransport::default());
    let orchestrator = UploadOrchestrator::new(Arc::clone(&transport), 2);

    let files = (0..6).map(|i| file(&format!("{i}.txt"), b"x")).collect();
    orchestrator.upload_all(files).await.expect("uploads succeed");

    assert_eq!(transport.calls.load(Ordering::SeqCst), 6);
    assert!(transport.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_one_failure_fails_submission_without_cancelling_others() {
    let transport = Arc::new(MockTransport::default());
    let orchestrator = UploadOrchestrator::new(Arc::clone(&transport), 4);

    let err = orchestrator
        .upload_all(vec![
            file("good.txt", b"1"),
            file("bad.txt", b"2"),
            file("fine.txt", b"3"),
        ])
        .await
        .unwrap_err();

    match &err {
        UploadError::Failed {
            file_name, message, ..
        } => {
            assert_eq!(file_name, "bad.txt");
            assert_eq!(message, "bad.txt was rejected");
        }
        other => panic!("unexpected error {other:?}"),
    }
    let report = err.report().expect("report attached");
    assert_eq!(report.succeeded().count(), 2);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_batch_progress_summary() {
    let transport = Arc::new(MockTransport::default());
    let orchestrator = UploadOrchestrator::new(transport, 1);

    let batch = orchestrator
        .start(vec![file("a.txt", b"a"), file("bad.txt", b"b")])
        .expect("non-empty");
    let progress = batch.progress();
    assert_eq!(progress.total(), 2);

    let _ = batch.finish().await;
    assert_eq!(progress.summary(), "1 of 2 complete");
}

#[tokio::test]
async fn test_catalog_transport_stores_files() {
    let storage = Arc::new(StorageService::in_memory("http://files.test"));
    let catalog = Arc::new(FileCatalog::new(storage));
    let orchestrator = UploadOrchestrator::new(Arc::clone(&catalog), DEFAULT_CONCURRENCY);

    let report = orchestrator
        .upload_all(vec![LocalFile::new(
            "photo 1.png",
            "image/png",
            Bytes::from_static(b"\x89PNG"),
        )])
        .await
        .expect("upload");

    let stored = report.succeeded().next().expect("one stored file");
    assert_eq!(stored.size, 4);
    assert_eq!(stored.mime_type, "image/png");
    assert!(stored.name.ends_with("-photo-1.png"));
    assert_eq!(catalog.count().await.expect("count"), 1);
}

#[tokio::test]
async fn test_same_named_files_get_distinct_names() {
    let storage = Arc::new(StorageService::in_memory("http://files.test"));
    let catalog = Arc::new(FileCatalog::new(storage));
    let orchestrator = UploadOrchestrator::new(Arc::clone(&catalog), DEFAULT_CONCURRENCY);

    let report = orchestrator
        .upload_all((0..4).map(|_| file("notes.txt", b"same")).collect())
        .await
        .expect("every copy stored");

    let mut names: Vec<_> = report.succeeded().map(|f| f.name.clone()).collect();
    assert_eq!(names.len(), 4);
    assert!(names.iter().all(|n| n.ends_with("-notes.txt")));
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 4);
    assert_eq!(catalog.count().await.expect("count"), 4);
}

#[tokio::test]
async fn test_form_requires_selection() {
    let form = UploadForm::new(UploadOrchestrator::new(
        Arc::new(MockTransport::default()),
        4,
    ));

    assert!(matches!(form.submit().await, Err(UploadError::NoFiles)));
    assert_eq!(
        form.snapshot().error.as_deref(),
        Some("Please select a file first")
    );
}

#[tokio::test]
async fn test_form_submit_and_reset() {
    let form = UploadForm::new(UploadOrchestrator::new(
        Arc::new(MockTransport::default()),
        4,
    ));
    form.select(vec![file("a.txt", b"abc")]);
    assert_eq!(form.snapshot().selected, vec!["a.txt".to_string()]);

    form.submit().await.expect("upload");
    let snapshot = form.snapshot();
    assert!(!snapshot.uploading);
    assert_eq!(snapshot.percents, vec![100]);
    assert_eq!(snapshot.summary.as_deref(), Some("1 of 1 complete"));
    assert!(snapshot.report.is_some());

    form.reset();
    let snapshot = form.snapshot();
    assert!(snapshot.selected.is_empty());
    assert!(snapshot.report.is_none());
}

#[tokio::test]
async fn test_form_keeps_failure_message() {
    let form = UploadForm::new(UploadOrchestrator::new(
        Arc::new(MockTransport::default()),
        4,
    ));
    form.select(vec![file("bad.txt", b"x")]);

    assert!(form.submit().await.is_err());
    assert_eq!(
        form.snapshot().error.as_deref(),
        Some("bad.txt was rejected")
    );
}

#[test]
fn test_chunked_splits_bytes() {
    let chunks = chunked(&Bytes::from_static(b"abcdefg"), 3);
    assert_eq!(
        chunks,
        vec![
            Bytes::from_static(b"abc"),
            Bytes::from_static(b"def"),
            Bytes::from_static(b"g"),
        ]
    );
    assert!(chunked(&Bytes::new(), 3).is_empty());
}
