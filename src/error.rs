//! Structured error types for store operations and HTTP responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // Not found errors
    TodoNotFound,

    // Internal errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// HTTP status used when this error reaches a handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::TodoNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Structured application error.
#[derive(Debug)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub field: Option<String>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {}", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFieldValue,
            format!("Invalid value for {}: {}", field, reason),
        )
        .with_field(field)
    }

    pub fn todo_not_found(id: i64) -> Self {
        Self::new(ErrorCode::TodoNotFound, format!("Todo not found: {}", id))
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::TodoNotFound
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app_err) => app_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(sql_err) => AppError::database(sql_err),
                Err(err) => AppError::internal(err),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "Request failed: {}", self.message);
        }
        // Internal details stay in the log; the page only says what kind of failure it was.
        let detail = match self.code {
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                "Something went wrong while talking to the todo store.".to_string()
            }
            _ => self.message.clone(),
        };
        let body = format!(
            r#"<!DOCTYPE html><html><head><title>Error</title></head>
            <body style="font-family:system-ui;padding:2rem;">
            <h1>Error</h1><p>{}</p>
            <a href="/">Back to todos</a></body></html>"#,
            crate::dashboard::html_escape(&detail)
        );
        (status, Html(body)).into_response()
    }
}

/// Result type for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::todo_not_found(3);
        assert_eq!(err.code.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Todo not found: 3");
    }

    #[test]
    fn missing_field_carries_field_name() {
        let err = AppError::missing_field("task");
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.field.as_deref(), Some("task"));
        assert_eq!(err.code.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn anyhow_roundtrip_preserves_app_error() {
        let err: anyhow::Error = AppError::todo_not_found(7).into();
        let back = AppError::from(err);
        assert!(back.is_not_found());
        assert_eq!(back.message, "Todo not found: 7");
    }

    #[test]
    fn anyhow_sqlite_error_becomes_database_error() {
        let err: anyhow::Error = rusqlite::Error::InvalidQuery.into();
        assert_eq!(AppError::from(err).code, ErrorCode::DatabaseError);
    }

    #[test]
    fn other_anyhow_errors_are_internal() {
        let err = anyhow::anyhow!("boom");
        let app = AppError::from(err);
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.code.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
