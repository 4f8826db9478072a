use serde::{Deserialize, Serialize};

/// A catalog entry as persisted in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    /// `false` while the book is lent out.
    pub available: bool,
}
