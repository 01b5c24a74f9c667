//! Typed wrapper over the REST endpoints.

use std::time::Duration;

use bytes::Bytes;
use quickshare_core::files::{DEFAULT_CONTENT_TYPE, FileError, FileSource, StoredFile};
use quickshare_core::posts::{PostError, PostInput, PostStore, TextPost};
use quickshare_core::storage::naming::created_at_from_name;
use quickshare_core::upload::{LocalFile, ProgressHandle, UploadTransport, chunked};
use quickshare_shared::types::{PageRequest, PageResponse, PostId};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;

/// Server used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Size of the body chunks progress is reported on.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    /// Service status.
    pub status: String,
    /// Server version.
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_name: String,
    file_path: String,
    public_url: String,
    size: u64,
    mimetype: String,
}

impl From<UploadResponse> for StoredFile {
    fn from(response: UploadResponse) -> Self {
        // fileName echoes the submitted name; the stored name ends the path
        let name = response
            .file_path
            .rsplit('/')
            .next()
            .unwrap_or(&response.file_name)
            .to_string();
        Self {
            created_at: created_at_from_name(&name),
            name,
            path: response.file_path,
            public_url: response.public_url,
            size: response.size,
            mime_type: response.mimetype,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Client for one QuickShare server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Server base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Check the server is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.client.get(self.build_url("/health")).send().await?;
        json(response).await
    }

    /// Upload one file as the `file` part, streaming the body in chunks and
    /// reporting each chunk through `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the file.
    pub async fn upload_file(
        &self,
        file: LocalFile,
        progress: ProgressHandle,
    ) -> Result<StoredFile, ClientError> {
        let total = file.size();
        let content_type = if file.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            file.content_type.as_str()
        };

        let reporter = progress.clone();
        let mut sent = 0_u64;
        let chunks = chunked(&file.bytes, UPLOAD_CHUNK_SIZE)
            .into_iter()
            .map(move |chunk: Bytes| {
                sent += chunk.len() as u64;
                progress.report(sent, total);
                Ok::<_, std::io::Error>(chunk)
            });
        let part = Part::stream_with_length(Body::wrap_stream(futures::stream::iter(chunks)), total)
            .file_name(file.name.clone())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        debug!(file_name = %file.name, size = total, "Uploading file");
        let response = self
            .client
            .post(self.build_url("/upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = json(response).await?;
        reporter.report(total, total);
        Ok(uploaded.into())
    }

    /// One page of files, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_files(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<StoredFile>, ClientError> {
        let response = self
            .client
            .get(self.build_url("/files"))
            .query(&[("page", page.page), ("per_page", page.per_page)])
            .send()
            .await?;
        json(response).await
    }

    /// Delete a file by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file does not exist.
    pub async fn delete_file(&self, name: &str) -> Result<(), ClientError> {
        let url = self.build_url(&format!("/files/{name}"));
        let response = self.client.delete(url).send().await?;
        check(response).await.map(drop)
    }

    /// All posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_posts(&self) -> Result<Vec<TextPost>, ClientError> {
        let response = self.client.get(self.build_url("/posts")).send().await?;
        json(response).await
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the title is rejected.
    pub async fn create_post(&self, input: &PostInput) -> Result<TextPost, ClientError> {
        let response = self
            .client
            .post(self.build_url("/posts"))
            .json(input)
            .send()
            .await?;
        json(response).await
    }

    /// Edit a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the title is rejected, or the
    /// post does not exist.
    pub async fn update_post(&self, id: PostId, input: &PostInput) -> Result<TextPost, ClientError> {
        let response = self
            .client
            .put(self.build_url(&format!("/posts/{id}")))
            .json(input)
            .send()
            .await?;
        json(response).await
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the post does not exist.
    pub async fn delete_post(&self, id: PostId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.build_url(&format!("/posts/{id}")))
            .send()
            .await?;
        check(response).await.map(drop)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = match (body.error.is_empty(), body.details) {
        (true, _) if text.is_empty() => status.to_string(),
        (true, _) => text,
        (false, Some(details)) => format!("{}: {details}", body.error),
        (false, None) => body.error,
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json().await?)
}

impl UploadTransport for ApiClient {
    async fn upload(&self, file: LocalFile, progress: ProgressHandle) -> Result<StoredFile, FileError> {
        self.upload_file(file, progress)
            .await
            .map_err(ClientError::into_file_error)
    }
}

impl FileSource for ApiClient {
    async fn list_page(&self, page: PageRequest) -> Result<PageResponse<StoredFile>, FileError> {
        self.list_files(page)
            .await
            .map_err(ClientError::into_file_error)
    }

    async fn remove(&self, name: &str) -> Result<(), FileError> {
        self.delete_file(name)
            .await
            .map_err(ClientError::into_file_error)
    }
}

impl PostStore for ApiClient {
    async fn list_posts(&self) -> Result<Vec<TextPost>, PostError> {
        Self::list_posts(self)
            .await
            .map_err(|e| e.into_post_error(None))
    }

    async fn create_post(&self, input: PostInput) -> Result<TextPost, PostError> {
        Self::create_post(self, &input)
            .await
            .map_err(|e| e.into_post_error(None))
    }

    async fn update_post(&self, id: PostId, input: PostInput) -> Result<TextPost, PostError> {
        Self::update_post(self, id, &input)
            .await
            .map_err(|e| e.into_post_error(Some(id)))
    }

    async fn delete_post(&self, id: PostId) -> Result<(), PostError> {
        Self::delete_post(self, id)
            .await
            .map_err(|e| e.into_post_error(Some(id)))
    }
}
