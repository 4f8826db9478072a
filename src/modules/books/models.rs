use serde::{Deserialize, Serialize};
use serde_json::json;

pub use libris_db::Book;

use super::catalog::CatalogError;

/// Body of `POST /books` as received. Presence is checked by [`NewBook::try_from`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// A validated book submission: both fields present and not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Result<Self, CatalogError> {
        Self::try_from(CreateBookRequest {
            title: Some(title.into()),
            author: Some(author.into()),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

impl TryFrom<CreateBookRequest> for NewBook {
    type Error = CatalogError;

    fn try_from(request: CreateBookRequest) -> Result<Self, Self::Error> {
        let title = present(request.title);
        let author = present(request.author);

        match (title, author) {
            (Some(title), Some(author)) => Ok(Self { title, author }),
            (title, author) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("title");
                }
                if author.is_none() {
                    missing.push("author");
                }
                Err(CatalogError::MissingFields(missing))
            }
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Response of the borrow, return and delete routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub message: String,
    pub book: Book,
}

impl BookEnvelope {
    pub fn new(message: impl Into<String>, book: Book) -> Self {
        Self {
            message: message.into(),
            book,
        }
    }
}

/// Validation details in the shape carried by error payloads.
pub fn missing_field_details(fields: &[&'static str]) -> Vec<serde_json::Value> {
    fields
        .iter()
        .map(|field| json!({"field": field, "error": "required"}))
        .collect()
}
