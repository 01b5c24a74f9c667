//! Object storage for uploaded files.
//!
//! Backends:
//! - Supabase Storage over its REST API (production)
//! - Local filesystem (development only, served by the API server)
//! - Process memory (tests and demos)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        StorageService                            │
//! │             (bucket + upload folder + size limit)                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ upload(path, bytes)        │ public_url(path)                    │
//! │ list(limit, offset, desc)  │ delete([paths])                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   SupabaseStorage   │    LocalStorage     │    MemoryStorage     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod local;
mod memory;
pub mod naming;
mod service;
mod supabase;
mod types;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use service::StorageService;
pub use supabase::SupabaseStorage;
pub use types::{ListOptions, ObjectEntry, ObjectStore, PutOptions, SortOrder};
