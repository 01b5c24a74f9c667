//! Repository implementations for data access.

pub mod post;

pub use post::PostRepository;
