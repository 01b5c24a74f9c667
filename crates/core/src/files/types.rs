//! Stored file types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file held by the object store, as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Server-assigned object name.
    pub name: String,
    /// Path inside the bucket.
    pub path: String,
    /// Unauthenticated download link.
    pub public_url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub mime_type: String,
    /// Upload time.
    pub created_at: Option<DateTime<Utc>>,
}
