//! Text posts: service over the post table, the board view, and markup conversion.

mod board;
mod error;
pub mod markup;
mod service;
mod types;

pub use board::{DELETE_POST_MESSAGE, PostBoard, PostBoardSnapshot};
pub use error::PostError;
pub use service::{PostRepository, PostService, PostStore, validate_title};
pub use types::{NewPost, PostChanges, PostInput, TextPost};

#[cfg(test)]
mod tests;
