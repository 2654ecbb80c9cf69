//! Error types for web handlers.
//!
//! This module defines error types that bridge between domain errors
//! and HTTP responses, implementing Axum's `IntoResponse` trait.
//!
//! Client errors answer `{code, message}`. Store failures answer
//! `{code, error}` with the backend's message, which the browser client
//! surfaces as-is.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registry_core::{RegistryError, ValidationError};
use serde::Serialize;
use std::fmt;

/// Which JSON key carries the human-readable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailField {
    Message,
    Error,
}

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<String>) -> Result<Json<Registration>, AppError> {
///     let id = Uuid::parse_str(&id).map_err(|_| AppError::not_found("Media not found"))?;
///     Ok(Json(state.registrar.find(id).await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    detail: DetailField,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            detail: DetailField::Message,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND".to_string())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 500 carrying a backend failure message under `error`.
    #[must_use]
    pub fn server_failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            detail: DetailField::Error,
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into(), code.to_string())
        }
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Backend failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        (self.status, Json(self.body())).into_response()
    }
}

impl AppError {
    fn body(&self) -> ErrorResponse {
        let text = Some(self.message.clone());
        let (message, error) = match self.detail {
            DetailField::Message => (text, None),
            DetailField::Error => (None, text),
        };
        ErrorResponse {
            code: self.code.clone(),
            message,
            error,
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        let text = err.to_string();
        match err {
            RegistryError::NotFound(_) => Self::not_found("Media not found"),
            RegistryError::Validation(e) => e.into(),
            RegistryError::CapacityExceeded { .. } => Self::server_failure("CAPACITY_EXCEEDED", text),
            RegistryError::Store(e) => Self::server_failure("STORE_FAILURE", e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text(), "BAD_REQUEST".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_core::StoreError;
    use uuid::Uuid;

    #[test]
    fn test_error_display() {
        let err = AppError::validation("fullName is required");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] fullName is required");
    }

    #[test]
    fn test_registry_error_mapping() {
        let not_found = AppError::from(RegistryError::NotFound(Uuid::nil()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "NOT_FOUND");

        let invalid = AppError::from(RegistryError::Validation(ValidationError::Missing("fullName")));
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let full = AppError::from(RegistryError::CapacityExceeded { max: 9000 });
        assert_eq!(full.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(full.code(), "CAPACITY_EXCEEDED");

        let store = AppError::from(RegistryError::Store(StoreError::Backend("connection reset".to_string())));
        assert_eq!(store.code(), "STORE_FAILURE");
        assert_eq!(store.to_string(), "[STORE_FAILURE] connection reset");
    }

    #[test]
    fn test_store_failure_uses_error_key() {
        let err = AppError::server_failure("STORE_FAILURE", "connection reset");
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body, serde_json::json!({"code": "STORE_FAILURE", "error": "connection reset"}));

        let missing = serde_json::to_value(AppError::not_found("Media not found").body()).unwrap();
        assert_eq!(missing, serde_json::json!({"code": "NOT_FOUND", "message": "Media not found"}));
    }
}
