//! Error handling for the Libris HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Body of every failed response: `{"error": "<message>"}`.
///
/// Codes, details and the error id go to the log, keyed by `error_id`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        code: String,
        message: String,
    },

    /// The request is well-formed but the resource is in the wrong state.
    #[error("conflict: {message}")]
    Conflict { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    /// Persistence failure; `message` is safe to show, `source` is only logged.
    #[error("{message}: {source}")]
    Storage {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            code: "conflict".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Storage {
            message: message.into(),
            source: source.into(),
        }
    }

    /// HTTP status this error is answered with
    pub fn status(&self) -> StatusCode {
        match self {
            // State conflicts share 400 with validation failures.
            AppError::Validation { .. } | AppError::Conflict { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Storage { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let (error_code, message, details) = match self {
            AppError::Validation {
                details,
                code,
                message,
            } => (code, message, details),
            AppError::Conflict { message, code } => (code, message, Vec::new()),
            AppError::NotFound { message, code } => (code, message, Vec::new()),
            AppError::Storage { message, source } => {
                tracing::error!(error_id = %error_id, error = ?source, "storage failure");
                ("storage_error".to_string(), message, Vec::new())
            }
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = ?e, "internal failure");
                (
                    "internal_error".to_string(),
                    "An internal server error occurred".to_string(),
                    Vec::new(),
                )
            }
        };

        tracing::error!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            details = ?details,
            "Request error"
        );

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_validation_error() {
        let details = vec![serde_json::json!({"field": "title", "error": "required"})];
        let error = AppError::validation(details.clone(), "Missing fields");

        match error {
            AppError::Validation {
                details: d,
                code,
                message,
            } => {
                assert_eq!(d, details);
                assert_eq!(code, "validation_error");
                assert_eq!(message, "Missing fields");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation(vec![], "Missing fields").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::conflict("Book already borrowed").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("Book not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::storage("Failed to read books", anyhow::anyhow!("disk")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_response_format() {
        let (status, body) = body_json(AppError::conflict("Book already borrowed")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Book already borrowed"}));
    }

    #[tokio::test]
    async fn test_validation_details_stay_out_of_body() {
        let details = vec![serde_json::json!({"field": "title", "error": "required"})];
        let (status, body) = body_json(AppError::validation(details, "Missing fields")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Missing fields"}));
    }

    #[tokio::test]
    async fn test_storage_error_hides_cause() {
        let error = AppError::storage(
            "Failed to add book",
            anyhow::anyhow!("permission denied: /srv/data/books.json"),
        );
        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Failed to add book"}));
    }
}
