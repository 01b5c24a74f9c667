//! Supabase Storage backend over its REST API.
//!
//! Listing uses the anonymous key; writes and removals use the service-role key.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::types::{ListOptions, ObjectEntry, ObjectStore, PutOptions};

/// Supabase Storage client.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    url: String,
    anon_key: String,
    service_role_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u64,
    offset: u64,
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Deserialize)]
struct ListedObject {
    name: String,
    id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    metadata: Option<ListedMetadata>,
}

#[derive(Deserialize)]
struct ListedMetadata {
    size: Option<u64>,
    mimetype: Option<String>,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

#[derive(Deserialize)]
struct RemovedObject {
    name: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl SupabaseStorage {
    /// Create a client for the project at `url`.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        }
    }

    fn authorize(builder: RequestBuilder, key: &str) -> RequestBuilder {
        builder.bearer_auth(key).header("apikey", key)
    }

    /// Turns a non-success response into the backend's own message.
    async fn check(response: Response, path: &str) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        if status == reqwest::StatusCode::CONFLICT || message.contains("already exists") {
            return Err(StorageError::already_exists(path));
        }
        Err(StorageError::backend(message))
    }
}

impl ObjectStore for SupabaseStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> Result<(), StorageError> {
        let endpoint = format!("{}/storage/v1/object/{bucket}/{path}", self.url);
        let request = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, &options.content_type)
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(body);

        let response = Self::authorize(request, &self.service_role_key)
            .send()
            .await?;
        Self::check(response, path).await?;
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<ObjectEntry>, StorageError> {
        let endpoint = format!("{}/storage/v1/object/list/{bucket}", self.url);
        let body = ListRequest {
            prefix,
            limit: options.limit,
            offset: options.offset,
            sort_by: SortBy {
                column: "created_at",
                order: options.order.as_str(),
            },
        };

        let response = Self::authorize(self.client.post(endpoint), &self.anon_key)
            .json(&body)
            .send()
            .await?;
        let listed: Vec<ListedObject> = Self::check(response, prefix).await?.json().await?;

        // Folder placeholders come back without an id.
        Ok(listed
            .into_iter()
            .filter(|object| object.id.is_some())
            .map(|object| {
                let (size, mime_type) = object
                    .metadata
                    .map_or((0, None), |m| (m.size.unwrap_or(0), m.mimetype));
                ObjectEntry {
                    name: object.name,
                    size,
                    mime_type,
                    created_at: object.created_at,
                }
            })
            .collect())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.url)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<Vec<String>, StorageError> {
        let endpoint = format!("{}/storage/v1/object/{bucket}", self.url);
        let response = Self::authorize(self.client.delete(endpoint), &self.service_role_key)
            .json(&RemoveRequest { prefixes: paths })
            .send()
            .await?;

        let removed: Vec<RemovedObject> = Self::check(response, bucket).await?.json().await?;
        Ok(removed.into_iter().map(|object| object.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::SortOrder;
    use mockito::Matcher;
    use serde_json::json;

    fn storage(server: &mockito::Server) -> SupabaseStorage {
        SupabaseStorage::new(server.url(), "anon", "service")
    }

    #[tokio::test]
    async fn test_put_uses_service_role_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/object/bucket/user-uploads/1-a.txt")
            .match_header("authorization", "Bearer service")
            .match_header("apikey", "service")
            .match_header("content-type", "text/plain")
            .match_header("x-upsert", "false")
            .match_body("hello")
            .with_status(200)
            .with_body(r#"{"Key":"bucket/user-uploads/1-a.txt"}"#)
            .create_async()
            .await;

        storage(&server)
            .put(
                "bucket",
                "user-uploads/1-a.txt",
                Bytes::from_static(b"hello"),
                &PutOptions::new("text/plain"),
            )
            .await
            .expect("upload succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_surfaces_backend_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/bucket/p/x")
            .with_status(400)
            .with_body(r#"{"statusCode":"404","error":"Bucket not found","message":"Bucket not found"}"#)
            .create_async()
            .await;

        let err = storage(&server)
            .put("bucket", "p/x", Bytes::new(), &PutOptions::new("text/plain"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bucket not found");
    }

    #[tokio::test]
    async fn test_put_duplicate_maps_to_already_exists() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/bucket/p/x")
            .with_status(400)
            .with_body(r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#)
            .create_async()
            .await;

        let err = storage(&server)
            .put("bucket", "p/x", Bytes::new(), &PutOptions::new("text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_list_skips_folders_and_reads_metadata() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/object/list/bucket")
            .match_header("authorization", "Bearer anon")
            .match_body(Matcher::PartialJson(json!({
                "prefix": "user-uploads",
                "limit": 12,
                "offset": 24,
                "sortBy": {"column": "created_at", "order": "desc"}
            })))
            .with_status(200)
            .with_body(
                json!([
                    {"name": "nested", "id": null, "created_at": null, "metadata": null},
                    {
                        "name": "1700000000000-a.png",
                        "id": "b2b5",
                        "created_at": "2023-11-14T22:13:20.000Z",
                        "metadata": {"size": 512, "mimetype": "image/png", "eTag": "x"}
                    }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let entries = storage(&server)
            .list(
                "bucket",
                "user-uploads",
                ListOptions {
                    limit: 12,
                    offset: 24,
                    order: SortOrder::Desc,
                },
            )
            .await
            .expect("list succeeds");

        mock.assert_async().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "1700000000000-a.png");
        assert_eq!(entries[0].size, 512);
        assert_eq!(entries[0].mime_type.as_deref(), Some("image/png"));
        assert!(entries[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_remove_returns_removed_names() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/storage/v1/object/bucket")
            .match_header("authorization", "Bearer service")
            .match_body(Matcher::Json(json!({"prefixes": ["user-uploads/a.txt"]})))
            .with_status(200)
            .with_body(json!([{"name": "user-uploads/a.txt"}]).to_string())
            .create_async()
            .await;

        let removed = storage(&server)
            .remove("bucket", &["user-uploads/a.txt".to_string()])
            .await
            .expect("remove succeeds");
        assert_eq!(removed, vec!["user-uploads/a.txt".to_string()]);
    }

    #[test]
    fn test_public_url() {
        let storage = SupabaseStorage::new("https://abc.supabase.co/", "anon", "service");
        assert_eq!(
            storage.public_url("quickshare-uploads", "user-uploads/a.txt"),
            "https://abc.supabase.co/storage/v1/object/public/quickshare-uploads/user-uploads/a.txt"
        );
    }
}
