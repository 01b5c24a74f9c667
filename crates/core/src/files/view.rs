//! Headless controller for the paged file list.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quickshare_shared::types::PageRequest;
use tracing::error;

use super::catalog::FileSource;
use super::types::StoredFile;
use crate::confirm::Confirmation;
use crate::view::ViewError;

/// Snapshot of what the file list shows.
#[derive(Debug, Clone, Default)]
pub struct FileListSnapshot {
    /// Entries on the current page.
    pub entries: Vec<StoredFile>,
    /// Current page (1-indexed).
    pub page: u32,
    /// Total pages.
    pub total_pages: u32,
    /// Total files.
    pub total: u64,
    /// A fetch is in flight.
    pub loading: bool,
    /// Last error message, verbatim from the backend.
    pub error: Option<String>,
}

#[derive(Default)]
struct FileListState {
    entries: Vec<StoredFile>,
    page: u32,
    total_pages: u32,
    total: u64,
    loading: bool,
    error: Option<String>,
    deleting: HashSet<String>,
    pending: Option<Confirmation<String>>,
}

/// Paged file list with delete-with-confirmation.
///
/// State sits behind a mutex that is never held across a backend call, so the
/// list stays readable while a deletion is in flight.
pub struct FileListView<S: FileSource> {
    source: Arc<S>,
    per_page: u32,
    state: Mutex<FileListState>,
}

impl<S: FileSource> FileListView<S> {
    /// Creates a view on page 1.
    #[must_use]
    pub fn new(source: Arc<S>, per_page: u32) -> Self {
        Self {
            source,
            per_page: PageRequest::new(1, per_page).per_page,
            state: Mutex::new(FileListState {
                page: 1,
                total_pages: 1,
                ..FileListState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FileListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current view state.
    #[must_use]
    pub fn snapshot(&self) -> FileListSnapshot {
        let state = self.state();
        FileListSnapshot {
            entries: state.entries.clone(),
            page: state.page,
            total_pages: state.total_pages,
            total: state.total,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Fetch the current page.
    ///
    /// # Errors
    ///
    /// Returns the backend message when the fetch fails; it is also kept in the
    /// snapshot's `error`.
    pub async fn load(&self) -> Result<(), ViewError> {
        let page = {
            let mut state = self.state();
            state.loading = true;
            state.page
        };
        self.fetch(page).await
    }

    /// Move to `page` and fetch it. Pages below 1 are treated as 1.
    ///
    /// # Errors
    ///
    /// Returns the backend message when the fetch fails.
    pub async fn set_page(&self, page: u32) -> Result<(), ViewError> {
        {
            let mut state = self.state();
            state.page = page.max(1);
            state.loading = true;
        }
        self.load().await
    }

    /// Advance one page if there is one.
    ///
    /// # Errors
    ///
    /// Returns the backend message when the fetch fails.
    pub async fn next_page(&self) -> Result<(), ViewError> {
        let (page, last) = {
            let state = self.state();
            (state.page, state.total_pages)
        };
        if page >= last {
            return Ok(());
        }
        self.set_page(page + 1).await
    }

    /// Go back one page if not on the first.
    ///
    /// # Errors
    ///
    /// Returns the backend message when the fetch fails.
    pub async fn previous_page(&self) -> Result<(), ViewError> {
        let page = self.state().page;
        if page <= 1 {
            return Ok(());
        }
        self.set_page(page - 1).await
    }

    async fn fetch(&self, page: u32) -> Result<(), ViewError> {
        let result = self
            .source
            .list_page(PageRequest::new(page, self.per_page))
            .await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(response) => {
                // A newer page request supersedes this response.
                if state.page == page {
                    state.entries = response.data;
                    state.total = response.meta.total;
                    state.total_pages = response.meta.total_pages;
                    state.error = None;
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, page, "Failed to fetch files");
                let message = e.to_string();
                state.error = Some(message.clone());
                Err(ViewError::backend(message))
            }
        }
    }

    /// Open the confirmation dialog for deleting `name`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is already being deleted or the open dialog is running.
    pub fn request_delete(&self, name: &str) -> Result<(), ViewError> {
        let mut state = self.state();
        if state.deleting.contains(name) {
            return Err(ViewError::AlreadyDeleting(name.to_string()));
        }
        if state.pending.as_ref().is_some_and(|p| p.dialog().is_loading()) {
            return Err(ViewError::Busy);
        }
        state.pending = Some(Confirmation::new(
            format!("Are you sure you want to delete {name}?"),
            name.to_string(),
        ));
        Ok(())
    }

    /// Dismiss the dialog. Ignored while the deletion runs.
    pub fn cancel_delete(&self) {
        let mut state = self.state();
        if state.pending.as_ref().is_some_and(Confirmation::can_cancel) {
            state.pending = None;
        }
    }

    /// The open dialog, if any.
    #[must_use]
    pub fn pending(&self) -> Option<Confirmation<String>> {
        self.state().pending.clone()
    }

    /// Whether `name` is being deleted.
    #[must_use]
    pub fn is_deleting(&self, name: &str) -> bool {
        self.state().deleting.contains(name)
    }

    /// Delete the pending entry, then re-fetch the current page.
    ///
    /// If the page comes back empty and is past the first, the view moves to the
    /// new last page.
    ///
    /// # Errors
    ///
    /// Fails if nothing is pending or the dialog is already running; otherwise
    /// returns the backend message when removal fails. A failed re-fetch after
    /// a successful removal is left in the snapshot's `error`.
    pub async fn confirm_delete(&self) -> Result<(), ViewError> {
        let name = {
            let mut state = self.state();
            let pending = state.pending.as_mut().ok_or(ViewError::NothingPending)?;
            let name = pending.begin().ok_or(ViewError::Busy)?.clone();
            state.deleting.insert(name.clone());
            name
        };

        let result = self.source.remove(&name).await;

        {
            let mut state = self.state();
            state.deleting.remove(&name);
            state.pending = None;
            if let Err(e) = result {
                error!(error = %e, name = %name, "Failed to delete file");
                let message = e.to_string();
                state.error = Some(message.clone());
                return Err(ViewError::backend(message));
            }
        }

        if self.load().await.is_err() {
            return Ok(());
        }

        let (page, total_pages, empty) = {
            let state = self.state();
            (state.page, state.total_pages, state.entries.is_empty())
        };
        if empty && page > 1 {
            // Reported through the snapshot like the re-fetch above.
            let _ = self.set_page(total_pages.min(page - 1)).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileError;
    use quickshare_shared::types::PageResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// In-memory source; `remove` can be held open with `gate`.
    #[derive(Default)]
    struct MockSource {
        names: Mutex<Vec<String>>,
        fail_remove: Mutex<Option<String>>,
        fail_list: Mutex<Option<String>>,
        gate: Option<Arc<Notify>>,
        list_calls: AtomicUsize,
    }

    impl MockSource {
        fn with_files(count: usize) -> Self {
            Self {
                names: Mutex::new((0..count).rev().map(|i| format!("{i}-f.txt")).collect()),
                ..Self::default()
            }
        }
    }

    impl FileSource for MockSource {
        async fn list_page(&self, page: PageRequest) -> Result<PageResponse<StoredFile>, FileError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail_list.lock().unwrap().clone() {
                return Err(FileError::transport(message));
            }
            let names = self.names.lock().unwrap().clone();
            let total = names.len() as u64;
            let data = names
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap())
                .take(page.per_page as usize)
                .map(|name| StoredFile {
                    path: format!("user-uploads/{name}"),
                    public_url: format!("http://files.test/{name}"),
                    name,
                    size: 1,
                    mime_type: "text/plain".to_string(),
                    created_at: None,
                })
                .collect();
            Ok(PageResponse::new(data, page.page, page.per_page, total))
        }

        async fn remove(&self, name: &str) -> Result<(), FileError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(message) = self.fail_remove.lock().unwrap().clone() {
                return Err(FileError::transport(message));
            }
            self.names.lock().unwrap().retain(|n| n != name);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_fetches_one_page() {
        let view = FileListView::new(Arc::new(MockSource::with_files(5)), 2);
        view.load().await.expect("load");

        let snapshot = view.snapshot();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].name, "4-f.txt");
        assert_eq!(snapshot.total, 5);
        assert_eq!(snapshot.total_pages, 3);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_paging_stays_in_bounds() {
        let view = FileListView::new(Arc::new(MockSource::with_files(3)), 2);
        view.load().await.expect("load");

        view.next_page().await.expect("next");
        assert_eq!(view.snapshot().page, 2);
        view.next_page().await.expect("next at end");
        assert_eq!(view.snapshot().page, 2);
        view.previous_page().await.expect("previous");
        view.previous_page().await.expect("previous at start");
        assert_eq!(view.snapshot().page, 1);
    }

    #[tokio::test]
    async fn test_delete_flow_refetches() {
        let source = Arc::new(MockSource::with_files(3));
        let view = FileListView::new(Arc::clone(&source), 12);
        view.load().await.expect("load");

        view.request_delete("1-f.txt").expect("request");
        let pending = view.pending().expect("dialog open");
        assert_eq!(
            pending.dialog().message(),
            "Are you sure you want to delete 1-f.txt?"
        );

        view.confirm_delete().await.expect("delete");
        let snapshot = view.snapshot();
        assert!(view.pending().is_none());
        assert_eq!(snapshot.total, 2);
        assert!(snapshot.entries.iter().all(|f| f.name != "1-f.txt"));
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_closes_dialog() {
        let view = FileListView::new(Arc::new(MockSource::with_files(1)), 12);
        view.request_delete("0-f.txt").expect("request");
        view.cancel_delete();
        assert!(view.pending().is_none());
        assert_eq!(
            view.confirm_delete().await.unwrap_err(),
            ViewError::NothingPending
        );
    }

    #[tokio::test]
    async fn test_delete_failure_surfaces_message() {
        let source = MockSource::with_files(2);
        *source.fail_remove.lock().unwrap() = Some("Object not found".to_string());
        let view = FileListView::new(Arc::new(source), 12);
        view.load().await.expect("load");

        view.request_delete("0-f.txt").expect("request");
        let err = view.confirm_delete().await.unwrap_err();
        assert_eq!(err, ViewError::backend("Object not found"));
        assert_eq!(view.snapshot().error.as_deref(), Some("Object not found"));
        assert!(!view.is_deleting("0-f.txt"));
        assert!(view.pending().is_none());
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_refetch_fails() {
        let source = Arc::new(MockSource::with_files(2));
        let view = FileListView::new(Arc::clone(&source), 12);
        view.load().await.expect("load");

        *source.fail_list.lock().unwrap() = Some("list timed out".to_string());
        view.request_delete("0-f.txt").expect("request");
        view.confirm_delete().await.expect("removal went through");

        assert_eq!(*source.names.lock().unwrap(), vec!["1-f.txt".to_string()]);
        assert_eq!(view.snapshot().error.as_deref(), Some("list timed out"));
        assert!(view.pending().is_none());
        assert!(!view.is_deleting("0-f.txt"));
    }

    #[tokio::test]
    async fn test_in_flight_delete_blocks_only_that_entry() {
        let gate = Arc::new(Notify::new());
        let source = MockSource {
            gate: Some(Arc::clone(&gate)),
            ..MockSource::with_files(3)
        };
        let view = Arc::new(FileListView::new(Arc::new(source), 12));
        view.load().await.expect("load");
        view.request_delete("2-f.txt").expect("request");

        let task = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.confirm_delete().await })
        };
        while !view.is_deleting("2-f.txt") {
            tokio::task::yield_now().await;
        }

        // The dialog is running: cancel is ignored and a second request is refused.
        view.cancel_delete();
        let pending = view.pending().expect("still open");
        assert_eq!(pending.dialog().confirm_label(), "Deleting...");
        assert_eq!(
            view.request_delete("2-f.txt").unwrap_err(),
            ViewError::AlreadyDeleting("2-f.txt".to_string())
        );
        assert!(!view.is_deleting("1-f.txt"));
        assert_eq!(view.snapshot().entries.len(), 3);

        gate.notify_one();
        task.await.expect("join").expect("delete");
        assert_eq!(view.snapshot().entries.len(), 2);
        view.request_delete("1-f.txt").expect("next delete allowed");
    }

    #[tokio::test]
    async fn test_emptied_last_page_moves_back() {
        let source = Arc::new(MockSource::with_files(3));
        let view = FileListView::new(Arc::clone(&source), 2);
        view.set_page(2).await.expect("page 2");
        assert_eq!(view.snapshot().entries.len(), 1);

        view.request_delete("0-f.txt").expect("request");
        view.confirm_delete().await.expect("delete");

        let snapshot = view.snapshot();
        assert_eq!(snapshot.page, 1);
        assert_eq!(snapshot.total_pages, 1);
        assert_eq!(snapshot.entries.len(), 2);
    }
}
