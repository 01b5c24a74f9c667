//! Storage configuration types.

use std::path::PathBuf;

use quickshare_shared::config::{BackendConfig, StorageKind, StorageSettings};

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Clone)]
pub enum StorageProvider {
    /// Supabase Storage over its REST API.
    Supabase {
        /// Project endpoint, e.g. `https://<project>.supabase.co`.
        url: String,
        /// Public anonymous key, used for listing.
        anon_key: String,
        /// Service-role key, used for uploads and removals.
        service_role_key: String,
    },
    /// Local filesystem (development only).
    LocalFs {
        /// Root directory; buckets are subdirectories.
        root: PathBuf,
        /// Base URL the root directory is served under.
        public_base_url: String,
    },
    /// Process memory (tests and demos).
    Memory {
        /// Base URL used when building public links.
        public_base_url: String,
    },
}

impl StorageProvider {
    /// Create a Supabase Storage provider.
    #[must_use]
    pub fn supabase(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        Self::Supabase {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create an in-memory provider.
    #[must_use]
    pub fn memory(public_base_url: impl Into<String>) -> Self {
        Self::Memory {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the provider name for logs and health output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Supabase { .. } => "supabase",
            Self::LocalFs { .. } => "local",
            Self::Memory { .. } => "memory",
        }
    }
}

impl std::fmt::Debug for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supabase { url, .. } => f
                .debug_struct("Supabase")
                .field("url", url)
                .finish_non_exhaustive(),
            Self::LocalFs {
                root,
                public_base_url,
            } => f
                .debug_struct("LocalFs")
                .field("root", root)
                .field("public_base_url", public_base_url)
                .finish(),
            Self::Memory { public_base_url } => f
                .debug_struct("Memory")
                .field("public_base_url", public_base_url)
                .finish(),
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Bucket holding uploads.
    pub bucket: String,
    /// Folder inside the bucket where uploads are written and listed.
    pub prefix: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default bucket name.
    pub const DEFAULT_BUCKET: &'static str = "quickshare-uploads";
    /// Default upload folder.
    pub const DEFAULT_PREFIX: &'static str = "user-uploads";

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            bucket: Self::DEFAULT_BUCKET.to_string(),
            prefix: Self::DEFAULT_PREFIX.to_string(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Build the storage config from application settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the Supabase backend is selected
    /// without an endpoint and both keys.
    pub fn from_settings(
        settings: &StorageSettings,
        backend: &BackendConfig,
    ) -> Result<Self, StorageError> {
        let provider = match settings.provider {
            StorageKind::Supabase => {
                if !backend.is_complete() {
                    return Err(StorageError::configuration(
                        "supabase storage requires backend url, anon_key and service_role_key",
                    ));
                }
                StorageProvider::supabase(
                    &backend.url,
                    &backend.anon_key,
                    &backend.service_role_key,
                )
            }
            StorageKind::Local => {
                StorageProvider::local_fs(&settings.local_root, &settings.public_base_url)
            }
            StorageKind::Memory => StorageProvider::memory(&settings.public_base_url),
        };

        Ok(Self::new(provider)
            .with_bucket(&settings.bucket)
            .with_prefix(&settings.prefix)
            .with_max_file_size(settings.max_file_size))
    }

    /// Set the bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the upload folder. Surrounding slashes are dropped.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_supabase() {
        let provider = StorageProvider::supabase("https://abc.supabase.co/", "anon", "service");
        assert_eq!(provider.name(), "supabase");
        match &provider {
            StorageProvider::Supabase { url, .. } => assert_eq!(url, "https://abc.supabase.co"),
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn test_storage_provider_debug_hides_keys() {
        let provider = StorageProvider::supabase("https://abc.supabase.co", "anon-key", "svc-key");
        let printed = format!("{provider:?}");
        assert!(!printed.contains("anon-key"));
        assert!(!printed.contains("svc-key"));
    }

    #[test]
    fn test_storage_provider_local() {
        let provider = StorageProvider::local_fs("./storage", "http://localhost:8080/storage");
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new(StorageProvider::memory("http://files.test"));
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.bucket, "quickshare-uploads");
        assert_eq!(config.prefix, "user-uploads");
    }

    #[test]
    fn test_with_prefix_trims_slashes() {
        let config =
            StorageConfig::new(StorageProvider::memory("http://files.test")).with_prefix("/docs/");
        assert_eq!(config.prefix, "docs");
    }

    #[test]
    fn test_from_settings_requires_complete_backend() {
        let settings = StorageSettings {
            provider: StorageKind::Supabase,
            ..StorageSettings::default()
        };
        let err = StorageConfig::from_settings(&settings, &BackendConfig::default()).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_from_settings_local() {
        let settings = StorageSettings {
            max_file_size: 42,
            ..StorageSettings::default()
        };
        let config = StorageConfig::from_settings(&settings, &BackendConfig::default())
            .expect("local backend needs no credentials");
        assert_eq!(config.provider.name(), "local");
        assert_eq!(config.max_file_size, 42);
    }
}
