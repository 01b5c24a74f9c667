//! Core logic for QuickShare.
//!
//! This crate holds everything that is neither HTTP routing nor SQL: the
//! object store adapters, the file catalog, upload orchestration, the post
//! service, and the headless view controllers that drive them.
//!
//! # Modules
//!
//! - `storage` - Object store backends (Supabase Storage, local filesystem, memory)
//! - `files` - File catalog and the paged file list view
//! - `upload` - Concurrent multi-file uploads with progress
//! - `posts` - Text post service, board view, and markup-to-text
//! - `confirm` - Confirmation dialog state for destructive actions

pub mod confirm;
pub mod files;
pub mod posts;
pub mod storage;
pub mod upload;
pub mod view;

pub use view::ViewError;
