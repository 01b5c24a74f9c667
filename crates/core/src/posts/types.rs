//! Text post types.

use chrono::{DateTime, Utc};
use quickshare_shared::types::PostId;
use serde::{Deserialize, Serialize};

/// A titled rich-text post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPost {
    /// Post ID.
    pub id: PostId,
    /// Title, never blank.
    pub title: String,
    /// Rich-text markup.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time; absent until the first edit.
    pub updated_at: Option<DateTime<Utc>>,
}

impl TextPost {
    /// Whether the post has been edited since creation.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some_and(|at| at != self.created_at)
    }
}

/// Title and content submitted from the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInput {
    /// Title.
    pub title: String,
    /// Rich-text markup.
    #[serde(default)]
    pub content: String,
}

impl PostInput {
    /// Build an input.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Row to insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post ID.
    pub id: PostId,
    /// Trimmed title.
    pub title: String,
    /// Rich-text markup.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields written by an edit.
#[derive(Debug, Clone)]
pub struct PostChanges {
    /// Trimmed title.
    pub title: String,
    /// Rich-text markup.
    pub content: String,
    /// Edit time.
    pub updated_at: DateTime<Utc>,
}
