//! Application error type mapping to HTTP status codes.
//!
//! Store failures are logged with their detail and surfaced as a generic
//! 500; everything else maps to the obvious 4xx.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use despedida_types::error::{AuthError, MessageError, SessionError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session-related errors.
    Session(SessionError),
    /// Message-related errors.
    Message(MessageError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        AppError::Message(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Session(SessionError::NotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Session(SessionError::SlugConflict(id)) => (
                StatusCode::CONFLICT,
                "SESSION_CONFLICT",
                format!("Session '{id}' already exists"),
            ),
            AppError::Session(SessionError::InvalidName(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Session(SessionError::StorageError(detail)) => {
                tracing::error!(%detail, "session storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Internal server error".to_string(),
                )
            }
            AppError::Message(MessageError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Message(MessageError::EmptyText) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Message text cannot be empty".to_string(),
            ),
            AppError::Message(MessageError::StorageError(detail)) => {
                tracing::error!(%detail, "message storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Internal server error".to_string(),
                )
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "code": code,
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
