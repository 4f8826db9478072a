//! HTTP handlers for the catalog.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use libris_http::error::AppError;
use serde_json::json;

use super::catalog::{BookCatalog, CatalogError};
use super::models::{missing_field_details, Book, BookEnvelope, CreateBookRequest, NewBook};

const NOT_FOUND: &str = "Book not found";

pub fn router(catalog: Arc<BookCatalog>) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}/borrow", put(borrow_book))
        .route("/books/{id}/return", put(return_book))
        .route("/books/{id}", delete(delete_book))
        .with_state(catalog)
}

async fn list_books(
    State(catalog): State<Arc<BookCatalog>>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = catalog
        .list()
        .await
        .map_err(|e| to_app_error(e, "Failed to read books"))?;
    Ok(Json(books))
}

async fn create_book(
    State(catalog): State<Arc<BookCatalog>>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected book payload");
        AppError::validation(
            vec![json!({"error": rejection.body_text()})],
            "Missing fields",
        )
    })?;

    let new_book =
        NewBook::try_from(request).map_err(|e| to_app_error(e, "Failed to add book"))?;
    let book = catalog
        .add(new_book)
        .await
        .map_err(|e| to_app_error(e, "Failed to add book"))?;

    Ok((StatusCode::CREATED, Json(book)))
}

async fn borrow_book(
    State(catalog): State<Arc<BookCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let id = parse_id(&id)?;
    let book = catalog
        .borrow(id)
        .await
        .map_err(|e| to_app_error(e, "Failed to borrow book"))?;
    Ok(Json(BookEnvelope::new("Book borrowed", book)))
}

async fn return_book(
    State(catalog): State<Arc<BookCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let id = parse_id(&id)?;
    let book = catalog
        .return_book(id)
        .await
        .map_err(|e| to_app_error(e, "Failed to return book"))?;
    Ok(Json(BookEnvelope::new("Book returned", book)))
}

async fn delete_book(
    State(catalog): State<Arc<BookCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let id = parse_id(&id)?;
    let book = catalog
        .delete(id)
        .await
        .map_err(|e| to_app_error(e, "Failed to delete book"))?;
    Ok(Json(BookEnvelope::new("Book deleted", book)))
}

/// Largest integer a client holding ids as doubles can name exactly.
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_991.0;

/// Accepts any decimal spelling of a whole number (`7`, `+7`, `7.0`, ` 7`).
/// A segment that is not a book id cannot match any record.
fn parse_id(segment: &str) -> Result<u64, AppError> {
    let trimmed = segment.trim();
    if let Ok(id) = trimmed.parse::<u64>() {
        return Ok(id);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && n.fract() == 0.0 && *n >= 0.0 && *n <= MAX_EXACT_FLOAT_ID)
        .map(|n| n as u64)
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// `storage_failure` is the message sent when persistence fails.
fn to_app_error(error: CatalogError, storage_failure: &str) -> AppError {
    match error {
        CatalogError::MissingFields(fields) => {
            AppError::validation(missing_field_details(&fields), "Missing fields")
        }
        CatalogError::NotFound(_) => AppError::not_found(NOT_FOUND),
        CatalogError::AlreadyBorrowed(_) => AppError::conflict("Book already borrowed"),
        CatalogError::NotBorrowed(_) => AppError::conflict("Book is not borrowed"),
        CatalogError::Storage(e) => AppError::storage(storage_failure, e),
        e @ CatalogError::IdsExhausted(_) => AppError::storage(storage_failure, e),
    }
}
