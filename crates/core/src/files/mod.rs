//! Uploaded files: catalog over the object store and the paged list view.

mod catalog;
mod error;
mod types;
mod view;

pub use catalog::{DEFAULT_CONTENT_TYPE, FileCatalog, FileSource};
pub use error::FileError;
pub use types::StoredFile;
pub use view::{FileListSnapshot, FileListView};
