//! In-memory backend for tests and demos.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::error::StorageError;
use super::naming::created_at_from_name;
use super::types::{ListOptions, ObjectEntry, ObjectStore, PutOptions, apply_window};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    created_at: DateTime<Utc>,
}

/// Object store kept in process memory. Clones share contents.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    objects: Arc<Mutex<BTreeMap<(String, String), StoredObject>>>,
    public_base_url: String,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::default(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Bytes stored at `path`, if any.
    #[must_use]
    pub fn get(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), path.to_string()))
            .map(|object| object.body.clone())
    }

    /// Number of stored objects across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> Result<(), StorageError> {
        if path.is_empty() {
            return Err(StorageError::invalid_key(path));
        }

        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (bucket.to_string(), path.to_string());
        if !options.upsert && objects.contains_key(&key) {
            return Err(StorageError::already_exists(path));
        }

        let name = path.rsplit('/').next().unwrap_or(path);
        objects.insert(
            key,
            StoredObject {
                body,
                content_type: options.content_type.clone(),
                created_at: created_at_from_name(name).unwrap_or_else(Utc::now),
            },
        );
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<ObjectEntry>, StorageError> {
        let folder = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };

        let entries = self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|((b, _), _)| b == bucket)
            .filter_map(|((_, path), object)| {
                let name = path.strip_prefix(&folder)?;
                (!name.contains('/')).then(|| ObjectEntry {
                    name: name.to_string(),
                    size: object.body.len() as u64,
                    mime_type: Some(object.content_type.clone()),
                    created_at: Some(object.created_at),
                })
            })
            .collect();

        Ok(apply_window(entries, options))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.public_base_url)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<Vec<String>, StorageError> {
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(paths
            .iter()
            .filter(|path| {
                objects
                    .remove(&(bucket.to_string(), (*path).clone()))
                    .is_some()
            })
            .cloned()
            .collect())
    }
}
