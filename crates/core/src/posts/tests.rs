//! Post service and board tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use quickshare_shared::types::PostId;

use super::*;
use crate::view::ViewError;

/// Mock repository for testing.
#[derive(Default)]
struct MockPostRepository {
    posts: Mutex<HashMap<PostId, TextPost>>,
    fail_with: Mutex<Option<String>>,
    fail_list: Mutex<Option<String>>,
}

impl MockPostRepository {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Mutex::new(Some(message.to_string())),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), PostError> {
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(PostError::repository(message)),
            None => Ok(()),
        }
    }

    fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl PostRepository for MockPostRepository {
    async fn list(&self) -> Result<Vec<TextPost>, PostError> {
        self.check()?;
        if let Some(message) = self.fail_list.lock().unwrap().clone() {
            return Err(PostError::repository(message));
        }
        let mut posts: Vec<_> = self.posts.lock().unwrap().values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn insert(&self, post: NewPost) -> Result<TextPost, PostError> {
        self.check()?;
        let post = TextPost {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: None,
        };
        self.posts.lock().unwrap().insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<TextPost, PostError> {
        self.check()?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get_mut(&id).ok_or(PostError::NotFound(id))?;
        post.title = changes.title;
        post.content = changes.content;
        post.updated_at = Some(changes.updated_at);
        Ok(post.clone())
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostError> {
        self.check()?;
        Ok(self.posts.lock().unwrap().remove(&id).is_some())
    }
}

fn service() -> (Arc<MockPostRepository>, PostService<MockPostRepository>) {
    let repo = Arc::new(MockPostRepository::default());
    (Arc::clone(&repo), PostService::new(repo))
}

// ============================================================================
// PostService
// ============================================================================

#[tokio::test]
async fn test_create_trims_title_and_leaves_updated_at_empty() {
    let (repo, service) = service();
    let post = service
        .create(PostInput::new("  Hello  ", "<p>Body</p>"))
        .await
        .expect("create");

    assert_eq!(post.title, "Hello");
    assert_eq!(post.content, "<p>Body</p>");
    assert!(post.updated_at.is_none());
    assert!(!post.is_edited());
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_blank_title_is_rejected_before_repository() {
    let (repo, service) = service();
    let err = service
        .create(PostInput::new("   ", "body"))
        .await
        .unwrap_err();
    assert_eq!(err, PostError::validation("Title is required"));
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_update_mutates_one_row_and_sets_updated_at() {
    let (repo, service) = service();
    let first = service
        .create(PostInput::new("First", "a"))
        .await
        .expect("create");
    service
        .create(PostInput::new("Second", "b"))
        .await
        .expect("create");

    let updated = service
        .update(first.id, PostInput::new("First, edited", "a2"))
        .await
        .expect("update");

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.title, "First, edited");
    assert!(updated.updated_at.is_some());
    assert!(updated.is_edited());
    assert_eq!(repo.len(), 2);
}

#[tokio::test]
async fn test_update_and_delete_missing_post() {
    let (_, service) = service();
    let id = PostId::new();
    assert_eq!(
        service
            .update(id, PostInput::new("t", "c"))
            .await
            .unwrap_err(),
        PostError::NotFound(id)
    );
    assert_eq!(service.delete(id).await.unwrap_err(), PostError::NotFound(id));
}

#[tokio::test]
async fn test_repository_message_passes_through() {
    let service = PostService::new(Arc::new(MockPostRepository::failing(
        "relation \"text_posts\" does not exist",
    )));
    let err = service.list().await.unwrap_err();
    assert_eq!(err.to_string(), "relation \"text_posts\" does not exist");
}

#[test]
fn test_is_edited_ignores_equal_timestamps() {
    let now = Utc::now();
    let mut post = TextPost {
        id: PostId::new(),
        title: "t".to_string(),
        content: String::new(),
        created_at: now,
        updated_at: Some(now),
    };
    assert!(!post.is_edited());
    post.updated_at = Some(now + Duration::seconds(5));
    assert!(post.is_edited());
}

// ============================================================================
// PostBoard
// ============================================================================

fn board() -> (
    Arc<MockPostRepository>,
    PostBoard<PostService<MockPostRepository>>,
) {
    let (repo, service) = service();
    (repo, PostBoard::new(Arc::new(service)))
}

#[tokio::test]
async fn test_board_save_creates_and_clears_editor() {
    let (repo, board) = board();
    board.set_title("New post");
    board.set_content("<p>Hello <b>World</b></p>");

    let post = board.save().await.expect("save");
    let snapshot = board.snapshot();

    assert_eq!(repo.len(), 1);
    assert_eq!(snapshot.posts.len(), 1);
    assert!(snapshot.title.is_empty());
    assert!(snapshot.content.is_empty());
    assert!(snapshot.editing.is_none());
    assert_eq!(board.copy_plain_text(post.id).as_deref(), Some("Hello World"));
}

#[tokio::test]
async fn test_board_blank_title_never_reaches_backend() {
    let (repo, board) = board();
    board.set_content("body only");

    let err = board.save().await.unwrap_err();
    assert_eq!(err, ViewError::validation("Title is required"));
    assert_eq!(board.snapshot().error.as_deref(), Some("Title is required"));
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_board_edit_updates_in_place() {
    let (repo, board) = board();
    board.set_title("Original");
    let post = board.save().await.expect("create");

    board.begin_edit(post.id).expect("listed");
    let snapshot = board.snapshot();
    assert_eq!(snapshot.title, "Original");
    assert_eq!(snapshot.editing, Some(post.id));

    board.set_title("Renamed");
    let saved = board.save().await.expect("update");

    assert_eq!(saved.id, post.id);
    assert_eq!(repo.len(), 1);
    let snapshot = board.snapshot();
    assert_eq!(snapshot.posts[0].title, "Renamed");
    assert!(snapshot.posts[0].updated_at.is_some());
    assert!(snapshot.editing.is_none());
    assert!(snapshot.title.is_empty());
}

#[tokio::test]
async fn test_board_cancel_edit_returns_to_new_mode() {
    let (_, board) = board();
    board.set_title("Post");
    let post = board.save().await.expect("create");

    board.begin_edit(post.id).expect("listed");
    board.cancel_edit();
    let snapshot = board.snapshot();
    assert!(snapshot.editing.is_none());
    assert!(snapshot.title.is_empty());

    assert!(board.begin_edit(PostId::new()).is_err());
}

#[tokio::test]
async fn test_board_delete_with_confirmation() {
    let (repo, board) = board();
    board.set_title("Doomed");
    let post = board.save().await.expect("create");

    board.request_delete(post.id).expect("request");
    let pending = board.pending().expect("dialog open");
    assert_eq!(
        pending.dialog().message(),
        "Are you sure you want to delete this post?"
    );
    assert_eq!(*pending.candidate(), post.id);

    board.confirm_delete().await.expect("delete");
    assert!(board.pending().is_none());
    assert!(board.snapshot().posts.is_empty());
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_board_cancel_delete_keeps_post() {
    let (repo, board) = board();
    board.set_title("Kept");
    let post = board.save().await.expect("create");

    board.request_delete(post.id).expect("request");
    board.cancel_delete();
    assert_eq!(
        board.confirm_delete().await.unwrap_err(),
        ViewError::NothingPending
    );
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_board_load_failure_surfaces_message() {
    let board = PostBoard::new(Arc::new(PostService::new(Arc::new(
        MockPostRepository::failing("permission denied for table text_posts"),
    ))));

    let err = board.load().await.unwrap_err();
    assert_eq!(
        err,
        ViewError::backend("permission denied for table text_posts")
    );
    let snapshot = board.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("permission denied for table text_posts")
    );
}

#[tokio::test]
async fn test_board_save_stands_when_refetch_fails() {
    let (repo, board) = board();
    *repo.fail_list.lock().unwrap() = Some("list timed out".to_string());
    board.set_title("Once");

    board.save().await.expect("insert went through");
    let snapshot = board.snapshot();
    assert_eq!(repo.len(), 1);
    assert!(snapshot.title.is_empty());
    assert!(snapshot.editing.is_none());
    assert_eq!(snapshot.error.as_deref(), Some("list timed out"));

    // A second save has nothing to submit.
    assert!(board.save().await.is_err());
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_board_delete_stands_when_refetch_fails() {
    let (repo, board) = board();
    board.set_title("Doomed");
    let post = board.save().await.expect("create");

    *repo.fail_list.lock().unwrap() = Some("list timed out".to_string());
    board.request_delete(post.id).expect("request");
    board.confirm_delete().await.expect("delete went through");

    assert_eq!(repo.len(), 0);
    assert!(board.pending().is_none());
    assert_eq!(board.snapshot().error.as_deref(), Some("list timed out"));
}
