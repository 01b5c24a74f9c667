//! Post service implementation.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use quickshare_shared::types::PostId;
use tracing::info;

use super::error::PostError;
use super::types::{NewPost, PostChanges, PostInput, TextPost};

/// Repository trait for post persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait PostRepository: Send + Sync {
    /// All posts, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<TextPost>, PostError>> + Send;

    /// Insert a new row.
    fn insert(&self, post: NewPost) -> impl Future<Output = Result<TextPost, PostError>> + Send;

    /// Update an existing row. Fails with [`PostError::NotFound`] if it does not exist.
    fn update(
        &self,
        id: PostId,
        changes: PostChanges,
    ) -> impl Future<Output = Result<TextPost, PostError>> + Send;

    /// Delete a row, returning whether it existed.
    fn delete(&self, id: PostId) -> impl Future<Output = Result<bool, PostError>> + Send;
}

/// Post operations as seen by the board, local or remote.
pub trait PostStore: Send + Sync {
    /// All posts, newest first.
    fn list_posts(&self) -> impl Future<Output = Result<Vec<TextPost>, PostError>> + Send;

    /// Create a post.
    fn create_post(
        &self,
        input: PostInput,
    ) -> impl Future<Output = Result<TextPost, PostError>> + Send;

    /// Edit a post.
    fn update_post(
        &self,
        id: PostId,
        input: PostInput,
    ) -> impl Future<Output = Result<TextPost, PostError>> + Send;

    /// Delete a post.
    fn delete_post(&self, id: PostId) -> impl Future<Output = Result<(), PostError>> + Send;
}

/// Trimmed title, or a validation error when blank.
///
/// # Errors
///
/// Returns [`PostError::Validation`] when the title is empty after trimming.
pub fn validate_title(title: &str) -> Result<String, PostError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PostError::validation(PostError::TITLE_REQUIRED));
    }
    Ok(title.to_string())
}

/// Post service: validation and timestamps over a repository.
pub struct PostService<R: PostRepository> {
    repo: Arc<R>,
}

impl<R: PostRepository> PostService<R> {
    /// Create a new post service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// All posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository call fails.
    pub async fn list(&self) -> Result<Vec<TextPost>, PostError> {
        self.repo.list().await
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank or the insert fails.
    pub async fn create(&self, input: PostInput) -> Result<TextPost, PostError> {
        let title = validate_title(&input.title)?;
        let post = self
            .repo
            .insert(NewPost {
                id: PostId::new(),
                title,
                content: input.content,
                created_at: Utc::now(),
            })
            .await?;

        info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// Edit a post, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank, the post does not exist, or the
    /// update fails.
    pub async fn update(&self, id: PostId, input: PostInput) -> Result<TextPost, PostError> {
        let title = validate_title(&input.title)?;
        let post = self
            .repo
            .update(
                id,
                PostChanges {
                    title,
                    content: input.content,
                    updated_at: Utc::now(),
                },
            )
            .await?;

        info!(post_id = %id, "Post updated");
        Ok(post)
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the post does not exist or the delete fails.
    pub async fn delete(&self, id: PostId) -> Result<(), PostError> {
        if !self.repo.delete(id).await? {
            return Err(PostError::not_found(id));
        }
        info!(post_id = %id, "Post deleted");
        Ok(())
    }
}

impl<R: PostRepository> PostStore for PostService<R> {
    async fn list_posts(&self) -> Result<Vec<TextPost>, PostError> {
        self.list().await
    }

    async fn create_post(&self, input: PostInput) -> Result<TextPost, PostError> {
        self.create(input).await
    }

    async fn update_post(&self, id: PostId, input: PostInput) -> Result<TextPost, PostError> {
        self.update(id, input).await
    }

    async fn delete_post(&self, id: PostId) -> Result<(), PostError> {
        self.delete(id).await
    }
}
