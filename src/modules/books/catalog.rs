//! Read-modify-write operations over the book document.
//!
//! Each mutation loads the whole collection, changes it in memory and
//! writes it back. Mutations hold `write_lock` for the whole cycle, so two
//! requests in the same process never both act on the same prior state.

use std::sync::Arc;

use libris_db::{StorageError, Store};
use thiserror::Error;
use tokio::sync::Mutex;

use super::models::{Book, NewBook};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("book {0} not found")]
    NotFound(u64),

    #[error("book {0} is already borrowed")]
    AlreadyBorrowed(u64),

    #[error("book {0} is not borrowed")]
    NotBorrowed(u64),

    /// The document already holds the largest representable id.
    #[error("no id left after {0}")]
    IdsExhausted(u64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct BookCatalog {
    store: Arc<dyn Store>,
    write_lock: Mutex<()>,
}

impl BookCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Create the document when absent. Returns `true` if it was created.
    pub async fn bootstrap(&self) -> Result<bool, CatalogError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.store.ensure_exists().await?)
    }

    pub async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.store.read_all().await?)
    }

    /// Append a record with id `max + 1` (or 1 when empty), available.
    pub async fn add(&self, new_book: NewBook) -> Result<Book, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut books = self.store.read_all().await?;

        let book = Book {
            id: next_id(&books)?,
            title: new_book.title().to_string(),
            author: new_book.author().to_string(),
            available: true,
        };
        books.push(book.clone());
        self.store.write_all(&books).await?;

        tracing::info!(book_id = book.id, "book added");
        Ok(book)
    }

    pub async fn borrow(&self, id: u64) -> Result<Book, CatalogError> {
        let book = self.set_available(id, false).await?;
        tracing::info!(book_id = id, "book borrowed");
        Ok(book)
    }

    pub async fn return_book(&self, id: u64) -> Result<Book, CatalogError> {
        let book = self.set_available(id, true).await?;
        tracing::info!(book_id = id, "book returned");
        Ok(book)
    }

    /// Remove the record with `id` and hand it back.
    pub async fn delete(&self, id: u64) -> Result<Book, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut books = self.store.read_all().await?;

        let index = books
            .iter()
            .position(|b| b.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        let removed = books.remove(index);
        self.store.write_all(&books).await?;

        tracing::info!(book_id = id, "book deleted");
        Ok(removed)
    }

    async fn set_available(&self, id: u64, available: bool) -> Result<Book, CatalogError> {
        let _guard = self.write_lock.lock().await;
        let mut books = self.store.read_all().await?;

        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        match (book.available, available) {
            (false, false) => return Err(CatalogError::AlreadyBorrowed(id)),
            (true, true) => return Err(CatalogError::NotBorrowed(id)),
            _ => book.available = available,
        }
        let updated = book.clone();

        self.store.write_all(&books).await?;
        Ok(updated)
    }
}

fn next_id(books: &[Book]) -> Result<u64, CatalogError> {
    match books.iter().map(|b| b.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(CatalogError::IdsExhausted(max)),
    }
}
