//! Storage service dispatching to the configured backend.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::local::LocalStorage;
use super::memory::MemoryStorage;
use super::naming::{join_path, object_name};
use super::supabase::SupabaseStorage;
use super::types::{ListOptions, ObjectEntry, ObjectStore, PutOptions};

enum Backend {
    Supabase(SupabaseStorage),
    Local(LocalStorage),
    Memory(MemoryStorage),
}

/// Storage service for uploaded files.
///
/// Every operation is scoped to the configured bucket; listings are scoped to
/// the configured folder.
pub struct StorageService {
    backend: Backend,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::configuration("bucket must not be empty"));
        }

        let backend = match &config.provider {
            StorageProvider::Supabase {
                url,
                anon_key,
                service_role_key,
            } => {
                if url.is_empty() {
                    return Err(StorageError::configuration("supabase url must not be empty"));
                }
                Backend::Supabase(SupabaseStorage::new(url, anon_key, service_role_key))
            }
            StorageProvider::LocalFs {
                root,
                public_base_url,
            } => Backend::Local(LocalStorage::new(root, public_base_url)),
            StorageProvider::Memory { public_base_url } => {
                Backend::Memory(MemoryStorage::new(public_base_url))
            }
        };

        Ok(Self { backend, config })
    }

    /// In-memory service with default settings.
    #[must_use]
    pub fn in_memory(public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            backend: Backend::Memory(MemoryStorage::new(public_base_url.clone())),
            config: StorageConfig::new(StorageProvider::memory(public_base_url)),
        }
    }

    /// Validate an upload size against the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is larger than allowed.
    pub fn validate_upload(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }
        Ok(())
    }

    /// Generate the server-assigned name for an upload stamped `now`.
    ///
    /// Pass a stamp from [`super::naming::unique_stamp`] so concurrent uploads of the
    /// same file name get distinct names.
    #[must_use]
    pub fn generate_object_name(original: &str, now: DateTime<Utc>) -> String {
        object_name(original, now)
    }

    /// Full path of a named object inside the upload folder.
    #[must_use]
    pub fn object_path(&self, name: &str) -> String {
        join_path(&self.config.prefix, name)
    }

    /// Upload bytes to `path` without overwriting.
    ///
    /// # Errors
    ///
    /// Returns an error if the object exists or the backend call fails.
    pub async fn upload(
        &self,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let options = PutOptions::new(content_type);
        let bucket = &self.config.bucket;
        match &self.backend {
            Backend::Supabase(store) => store.put(bucket, path, body, &options).await,
            Backend::Local(store) => store.put(bucket, path, body, &options).await,
            Backend::Memory(store) => store.put(bucket, path, body, &options).await,
        }
    }

    /// List one window of the upload folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<ObjectEntry>, StorageError> {
        let bucket = &self.config.bucket;
        let prefix = &self.config.prefix;
        match &self.backend {
            Backend::Supabase(store) => store.list(bucket, prefix, options).await,
            Backend::Local(store) => store.list(bucket, prefix, options).await,
            Backend::Memory(store) => store.list(bucket, prefix, options).await,
        }
    }

    /// Public URL for an object path.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        let bucket = &self.config.bucket;
        match &self.backend {
            Backend::Supabase(store) => store.public_url(bucket, path),
            Backend::Local(store) => store.public_url(bucket, path),
            Backend::Memory(store) => store.public_url(bucket, path),
        }
    }

    /// Delete objects, returning the paths that existed.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, paths: &[String]) -> Result<Vec<String>, StorageError> {
        let bucket = &self.config.bucket;
        match &self.backend {
            Backend::Supabase(store) => store.remove(bucket, paths).await,
            Backend::Local(store) => store.remove(bucket, paths).await,
            Backend::Memory(store) => store.remove(bucket, paths).await,
        }
    }

    /// Root directory when the local backend is in use, for static serving.
    #[must_use]
    pub fn local_root(&self) -> Option<&std::path::Path> {
        match &self.backend {
            Backend::Local(store) => Some(store.root()),
            _ => None,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Get the upload folder.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}
