//! Post repository for database operations.
//!
//! Implements post CRUD over the `text_posts` table using SeaORM.

use chrono::Utc;
use quickshare_core::posts::{
    NewPost, PostChanges, PostError, PostRepository as PostRepoTrait, TextPost,
};
use quickshare_shared::types::PostId;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use tracing::error;

use crate::entities::text_posts;

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn repository_error(err: DbErr) -> PostError {
    error!(error = %err, "Post query failed");
    PostError::repository(err.to_string())
}

/// Convert a row to the domain type.
#[must_use]
pub fn to_domain(model: text_posts::Model) -> TextPost {
    TextPost {
        id: PostId::from_uuid(model.id),
        title: model.title,
        content: model.content,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.map(|at| at.with_timezone(&Utc)),
    }
}

impl PostRepoTrait for PostRepository {
    async fn list(&self) -> Result<Vec<TextPost>, PostError> {
        let models = text_posts::Entity::find()
            .order_by_desc(text_posts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn insert(&self, post: NewPost) -> Result<TextPost, PostError> {
        let active_model = text_posts::ActiveModel {
            id: Set(post.id.into_inner()),
            title: Set(post.title),
            content: Set(post.content),
            created_at: Set(post.created_at.into()),
            updated_at: Set(None),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(to_domain(model))
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<TextPost, PostError> {
        let active_model = text_posts::ActiveModel {
            id: Set(id.into_inner()),
            title: Set(changes.title),
            content: Set(changes.content),
            updated_at: Set(Some(changes.updated_at.into())),
            ..Default::default()
        };

        match active_model.update(&self.db).await {
            Ok(model) => Ok(to_domain(model)),
            Err(DbErr::RecordNotUpdated) => Err(PostError::not_found(id)),
            Err(e) => Err(repository_error(e)),
        }
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostError> {
        let result = text_posts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(repository_error)?;

        Ok(result.rows_affected > 0)
    }
}
