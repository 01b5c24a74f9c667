//! Headless controller for the post board: list, editor, and deletion.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quickshare_shared::types::PostId;
use tracing::error;

use super::error::PostError;
use super::markup::to_plain_text;
use super::service::{PostStore, validate_title};
use super::types::{PostInput, TextPost};
use crate::confirm::Confirmation;
use crate::view::ViewError;

/// Confirmation message for deleting a post.
pub const DELETE_POST_MESSAGE: &str = "Are you sure you want to delete this post?";

/// Snapshot of the board.
#[derive(Debug, Clone, Default)]
pub struct PostBoardSnapshot {
    /// All posts, newest first.
    pub posts: Vec<TextPost>,
    /// A fetch is in flight.
    pub loading: bool,
    /// A save is in flight.
    pub saving: bool,
    /// Last error message.
    pub error: Option<String>,
    /// Editor title.
    pub title: String,
    /// Editor content.
    pub content: String,
    /// Post being edited; `None` means the editor creates a new post.
    pub editing: Option<PostId>,
}

#[derive(Default)]
struct BoardState {
    posts: Vec<TextPost>,
    loading: bool,
    saving: bool,
    error: Option<String>,
    title: String,
    content: String,
    editing: Option<PostId>,
    pending: Option<Confirmation<PostId>>,
}

impl BoardState {
    fn clear_editor(&mut self) {
        self.title.clear();
        self.content.clear();
        self.editing = None;
    }
}

/// Post list with an editor for creating and editing posts.
pub struct PostBoard<S: PostStore> {
    store: Arc<S>,
    state: Mutex<BoardState>,
}

impl<S: PostStore> PostBoard<S> {
    /// Creates an empty board.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Mutex::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail(&self, err: &PostError) -> ViewError {
        let message = err.to_string();
        self.state().error = Some(message.clone());
        match err {
            PostError::Validation(_) => ViewError::Validation(message),
            _ => ViewError::Backend(message),
        }
    }

    /// Current board state.
    #[must_use]
    pub fn snapshot(&self) -> PostBoardSnapshot {
        let state = self.state();
        PostBoardSnapshot {
            posts: state.posts.clone(),
            loading: state.loading,
            saving: state.saving,
            error: state.error.clone(),
            title: state.title.clone(),
            content: state.content.clone(),
            editing: state.editing,
        }
    }

    /// Fetch every post.
    ///
    /// # Errors
    ///
    /// Returns the backend message when the fetch fails.
    pub async fn load(&self) -> Result<(), ViewError> {
        self.state().loading = true;
        let result = self.store.list_posts().await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(posts) => {
                state.posts = posts;
                Ok(())
            }
            Err(e) => {
                drop(state);
                error!(error = %e, "Failed to fetch posts");
                Err(self.fail(&e))
            }
        }
    }

    /// Set the editor title.
    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Set the editor content.
    pub fn set_content(&self, content: impl Into<String>) {
        self.state().content = content.into();
    }

    /// Load a listed post into the editor.
    ///
    /// # Errors
    ///
    /// Fails if the post is not in the list.
    pub fn begin_edit(&self, id: PostId) -> Result<(), ViewError> {
        let mut state = self.state();
        let post = state
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ViewError::validation(PostError::not_found(id).to_string()))?;
        state.title = post.title;
        state.content = post.content;
        state.editing = Some(id);
        Ok(())
    }

    /// Leave edit mode and clear the editor.
    pub fn cancel_edit(&self) {
        self.state().clear_editor();
    }

    /// Save the editor: update the edited post or create a new one, then
    /// clear the editor and re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title without calling the
    /// backend, or the backend message when saving fails.
    pub async fn save(&self) -> Result<TextPost, ViewError> {
        let (input, editing) = {
            let mut state = self.state();
            if let Err(e) = validate_title(&state.title) {
                let message = e.to_string();
                state.error = Some(message.clone());
                return Err(ViewError::Validation(message));
            }
            state.saving = true;
            state.error = None;
            (
                PostInput::new(state.title.clone(), state.content.clone()),
                state.editing,
            )
        };

        let result = match editing {
            Some(id) => self.store.update_post(id, input).await,
            None => self.store.create_post(input).await,
        };
        self.state().saving = false;

        let post = match result {
            Ok(post) => post,
            Err(e) => {
                error!(error = %e, "Failed to save post");
                return Err(self.fail(&e));
            }
        };

        self.state().clear_editor();
        // The write stands; a failed re-fetch stays in the snapshot.
        let _ = self.load().await;
        Ok(post)
    }

    /// Open the confirmation dialog for deleting a post.
    ///
    /// # Errors
    ///
    /// Fails while another deletion is running.
    pub fn request_delete(&self, id: PostId) -> Result<(), ViewError> {
        let mut state = self.state();
        if state.pending.as_ref().is_some_and(|p| p.dialog().is_loading()) {
            return Err(ViewError::Busy);
        }
        state.pending = Some(Confirmation::new(DELETE_POST_MESSAGE, id));
        Ok(())
    }

    /// Dismiss the dialog. Ignored while the deletion runs.
    pub fn cancel_delete(&self) {
        let mut state = self.state();
        if state.pending.as_ref().is_some_and(Confirmation::can_cancel) {
            state.pending = None;
        }
    }

    /// The open dialog, if any.
    #[must_use]
    pub fn pending(&self) -> Option<Confirmation<PostId>> {
        self.state().pending.clone()
    }

    /// Delete the pending post, then re-fetch the list.
    ///
    /// # Errors
    ///
    /// Fails if nothing is pending, or returns the backend message when the
    /// deletion fails. A failed re-fetch is left in the snapshot's `error`.
    pub async fn confirm_delete(&self) -> Result<(), ViewError> {
        let id = {
            let mut state = self.state();
            let pending = state.pending.as_mut().ok_or(ViewError::NothingPending)?;
            *pending.begin().ok_or(ViewError::Busy)?
        };

        let result = self.store.delete_post(id).await;
        self.state().pending = None;

        if let Err(e) = result {
            error!(error = %e, post_id = %id, "Failed to delete post");
            return Err(self.fail(&e));
        }

        {
            let mut state = self.state();
            if state.editing == Some(id) {
                state.clear_editor();
            }
        }
        let _ = self.load().await;
        Ok(())
    }

    /// Plain text of a listed post, for the clipboard.
    #[must_use]
    pub fn copy_plain_text(&self, id: PostId) -> Option<String> {
        self.state()
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| to_plain_text(&p.content))
    }
}
