//! Storage for the book catalog.
//!
//! The catalog lives in a single JSON document that is always read and
//! written in full. [`Store`] is the seam the service layer talks to;
//! [`JsonFileStore`] is the production backend and [`MemoryStore`] keeps
//! the document in memory for tests.

mod error;
mod json_file;
mod memory;
mod record;

use async_trait::async_trait;

pub use error::StorageError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::Book;

/// Full-document access to the persisted book collection.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load and parse every record, in document order.
    async fn read_all(&self) -> Result<Vec<Book>, StorageError>;

    /// Replace the whole document with `books`.
    async fn write_all(&self, books: &[Book]) -> Result<(), StorageError>;

    /// Create an empty document if none exists. Returns `true` when created.
    async fn ensure_exists(&self) -> Result<bool, StorageError>;
}
