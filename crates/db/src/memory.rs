use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Book, StorageError, Store};

/// In-memory document, used where no file should be touched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<Option<Vec<Book>>>,
}

impl MemoryStore {
    /// A store whose document already exists and holds `books`.
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(Some(books)),
        }
    }

    /// A store whose document does not exist yet.
    pub fn missing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read_all(&self) -> Result<Vec<Book>, StorageError> {
        self.books.read().await.clone().ok_or_else(|| {
            StorageError::io(
                "memory",
                std::io::Error::new(std::io::ErrorKind::NotFound, "document does not exist"),
            )
        })
    }

    async fn write_all(&self, books: &[Book]) -> Result<(), StorageError> {
        // Yield between read and write so unsynchronized callers interleave.
        tokio::task::yield_now().await;
        *self.books.write().await = Some(books.to_vec());
        Ok(())
    }

    async fn ensure_exists(&self) -> Result<bool, StorageError> {
        let mut books = self.books.write().await;
        if books.is_some() {
            return Ok(false);
        }
        *books = Some(Vec::new());
        Ok(true)
    }
}
