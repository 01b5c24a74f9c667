//! File catalog: naming, upload, paged listing, removal, and the cached count.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use moka::sync::Cache;
use quickshare_shared::types::{PageRequest, PageResponse};
use tracing::{debug, info};

use super::error::FileError;
use super::types::StoredFile;
use crate::storage::naming::{created_at_from_name, unique_stamp};
use crate::storage::{ListOptions, ObjectEntry, StorageService};

/// Default time-to-live for the cached object count (1 minute).
const DEFAULT_COUNT_TTL_SECS: u64 = 60;

/// Batch size used when counting objects.
const COUNT_BATCH: u64 = 1000;

/// Fallback content type for uploads that declare none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Source of pages of stored files, local or remote.
pub trait FileSource: Send + Sync {
    /// Fetch one page, newest first.
    fn list_page(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = Result<PageResponse<StoredFile>, FileError>> + Send;

    /// Remove a file by name.
    fn remove(&self, name: &str) -> impl Future<Output = Result<(), FileError>> + Send;
}

/// Catalog of uploaded files in the configured folder.
#[derive(Clone)]
pub struct FileCatalog {
    storage: Arc<StorageService>,
    count_cache: Cache<String, u64>,
}

impl FileCatalog {
    /// Creates a catalog with the default count TTL.
    #[must_use]
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self::with_count_ttl(storage, DEFAULT_COUNT_TTL_SECS)
    }

    /// Creates a catalog whose cached count expires after `ttl_secs`.
    #[must_use]
    pub fn with_count_ttl(storage: Arc<StorageService>, ttl_secs: u64) -> Self {
        let count_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            storage,
            count_cache,
        }
    }

    /// Underlying storage service.
    #[must_use]
    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Store a file under a fresh server-assigned name.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was provided, the file is too large, or the
    /// backend rejects the write.
    pub async fn upload(
        &self,
        original_name: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredFile, FileError> {
        if original_name.is_empty() && body.is_empty() {
            return Err(FileError::NoFile);
        }

        let size = body.len() as u64;
        self.storage.validate_upload(size)?;

        // The object is stored with a usable type; the caller's declared one is echoed.
        let stored_type = if content_type.is_empty() {
            mime_guess::from_path(original_name)
                .first_raw()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
        } else {
            content_type
        };

        let now = unique_stamp(Utc::now());
        let name = StorageService::generate_object_name(original_name, now);
        let path = self.storage.object_path(&name);

        self.storage.upload(&path, body, stored_type).await?;
        self.invalidate_count();
        info!(path = %path, size, content_type = stored_type, "File uploaded");

        Ok(StoredFile {
            public_url: self.storage.public_url(&path),
            name,
            path,
            size,
            mime_type: content_type.to_string(),
            created_at: Some(now),
        })
    }

    /// Fetch one page of files, newest first, with public URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn page(&self, request: PageRequest) -> Result<PageResponse<StoredFile>, FileError> {
        let request = request.normalized();
        let total = self.count().await?;
        let entries = self
            .storage
            .list(ListOptions::newest_first(request.limit(), request.offset()))
            .await?;

        let files = entries
            .into_iter()
            .map(|entry| self.to_stored_file(entry))
            .collect();
        Ok(PageResponse::new(files, request.page, request.per_page, total))
    }

    /// Total number of files in the folder, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if a recount is needed and the backend call fails.
    pub async fn count(&self) -> Result<u64, FileError> {
        let key = self.storage.prefix().to_string();
        if let Some(total) = self.count_cache.get(&key) {
            return Ok(total);
        }

        let mut total = 0;
        loop {
            let batch = self
                .storage
                .list(ListOptions::newest_first(COUNT_BATCH, total))
                .await?;
            let fetched = batch.len() as u64;
            total += fetched;
            if fetched < COUNT_BATCH {
                break;
            }
        }

        debug!(prefix = %key, total, "Object count refreshed");
        self.count_cache.insert(key, total);
        Ok(total)
    }

    /// Remove a file by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, no such file exists, or the
    /// backend call fails.
    pub async fn remove(&self, name: &str) -> Result<(), FileError> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(FileError::invalid_name(name));
        }

        let path = self.storage.object_path(name);
        let removed = self.storage.delete(std::slice::from_ref(&path)).await?;
        self.invalidate_count();

        if removed.is_empty() {
            return Err(FileError::not_found(name));
        }
        info!(path = %path, "File deleted");
        Ok(())
    }

    /// Public URL for a file name.
    #[must_use]
    pub fn public_url(&self, name: &str) -> String {
        self.storage.public_url(&self.storage.object_path(name))
    }

    fn invalidate_count(&self) {
        self.count_cache.invalidate(self.storage.prefix());
    }

    fn to_stored_file(&self, entry: ObjectEntry) -> StoredFile {
        let path = self.storage.object_path(&entry.name);
        let mime_type = entry.mime_type.unwrap_or_else(|| {
            mime_guess::from_path(&entry.name)
                .first_raw()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string()
        });
        let created_at = entry.created_at.or_else(|| created_at_from_name(&entry.name));

        StoredFile {
            public_url: self.storage.public_url(&path),
            name: entry.name,
            path,
            size: entry.size,
            mime_type,
            created_at,
        }
    }
}

impl FileSource for FileCatalog {
    async fn list_page(&self, page: PageRequest) -> Result<PageResponse<StoredFile>, FileError> {
        self.page(page).await
    }

    async fn remove(&self, name: &str) -> Result<(), FileError> {
        FileCatalog::remove(self, name).await
    }
}
