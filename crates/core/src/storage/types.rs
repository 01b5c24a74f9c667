//! Object store request and listing types.

use std::future::Future;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::error::StorageError;

/// One object returned by a listing, relative to the listed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object name without the prefix.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Content type recorded at upload, if known.
    pub mime_type: Option<String>,
    /// Creation time reported by the store.
    pub created_at: Option<DateTime<Utc>>,
}

/// Options for writing an object.
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// Content type stored with the object.
    pub content_type: String,
    /// Overwrite an existing object instead of failing.
    pub upsert: bool,
}

impl PutOptions {
    /// Options for a non-overwriting write.
    #[must_use]
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
        }
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Wire name used by the REST API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Window and ordering for a listing. Ordering is always by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of entries.
    pub limit: u64,
    /// Entries to skip.
    pub offset: u64,
    /// Creation-time ordering.
    pub order: SortOrder,
}

impl ListOptions {
    /// Newest-first window.
    #[must_use]
    pub fn newest_first(limit: u64, offset: u64) -> Self {
        Self {
            limit,
            offset,
            order: SortOrder::Desc,
        }
    }
}

/// An object store addressed by bucket and path.
///
/// Implemented by each storage backend; [`super::StorageService`] dispatches to one of them.
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `path`.
    fn put(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// List the direct children of `prefix`.
    fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> impl Future<Output = Result<Vec<ObjectEntry>, StorageError>> + Send;

    /// Stable unauthenticated link to `path`.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove objects, returning the paths that actually existed.
    fn remove(
        &self,
        bucket: &str,
        paths: &[String],
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;
}

/// Sorts by creation time (then name) and applies the window.
pub(crate) fn apply_window(mut entries: Vec<ObjectEntry>, options: ListOptions) -> Vec<ObjectEntry> {
    entries.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    if options.order == SortOrder::Desc {
        entries.reverse();
    }

    let offset = usize::try_from(options.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(options.limit).unwrap_or(usize::MAX);
    entries.into_iter().skip(offset).take(limit).collect()
}
