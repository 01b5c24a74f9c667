//! HTTP client for the QuickShare API.
//!
//! [`ApiClient`] implements the core traits the views are written against
//! ([`UploadTransport`], [`FileSource`], and [`PostStore`]), so the same upload
//! form, file list, and post board run against a remote server.
//!
//! [`UploadTransport`]: quickshare_core::upload::UploadTransport
//! [`FileSource`]: quickshare_core::files::FileSource
//! [`PostStore`]: quickshare_core::posts::PostStore

mod client;
mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL, HealthStatus, UPLOAD_CHUNK_SIZE};
pub use error::ClientError;
