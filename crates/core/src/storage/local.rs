//! Local filesystem backend (development only).
//!
//! Buckets are directories under the root; the API server serves the root
//! directory so public URLs resolve.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;
use super::naming::created_at_from_name;
use super::types::{ListOptions, ObjectEntry, ObjectStore, PutOptions, apply_window};

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.starts_with('.') {
            return Err(StorageError::invalid_key(bucket));
        }
        Ok(self.root.join(bucket))
    }

    /// Resolve a bucket-relative path, refusing anything that escapes the bucket.
    fn resolve(&self, bucket: &str, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::invalid_key(path));
        }
        Ok(self.bucket_dir(bucket)?.join(relative))
    }
}

impl ObjectStore for LocalStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> Result<(), StorageError> {
        let target = self.resolve(bucket, path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut open = fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = match open.open(&target).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::already_exists(path));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&body).await?;
        file.flush().await?;
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<ObjectEntry>, StorageError> {
        let dir = if prefix.is_empty() {
            self.bucket_dir(bucket)?
        } else {
            self.resolve(bucket, prefix)?
        };

        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            // A folder that was never written to lists as empty.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(item) = reader.next_entry().await? {
            let metadata = item.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = item.file_name().to_string_lossy().into_owned();
            let created_at = created_at_from_name(&name).or_else(|| {
                metadata
                    .modified()
                    .ok()
                    .map(DateTime::<Utc>::from)
            });
            let mime_type = mime_guess::from_path(&name)
                .first()
                .map(|mime| mime.essence_str().to_string());

            entries.push(ObjectEntry {
                name,
                size: metadata.len(),
                mime_type,
                created_at,
            });
        }

        Ok(apply_window(entries, options))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.public_base_url)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<Vec<String>, StorageError> {
        let mut removed = Vec::with_capacity(paths.len());
        for path in paths {
            let target = self.resolve(bucket, path)?;
            match fs::remove_file(&target).await {
                Ok(()) => removed.push(path.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}
