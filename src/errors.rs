//! Centralized error handling.
//!
//! Provides a unified error type for the entire application, with automatic
//! HTTP response conversion into the `{ success: false, error, message, details }`
//! envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use policy::DomainError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Set once at startup; when true, internal error details reach the client.
static EXPOSE_INTERNAL_DETAILS: OnceCell<bool> = OnceCell::new();

/// Enable or disable internal error details in responses (development mode).
/// Only the first call has an effect.
pub fn expose_internal_details(enabled: bool) {
    let _ = EXPOSE_INTERNAL_DETAILS.set(enabled);
}

fn internal_details_exposed() -> bool {
    EXPOSE_INTERNAL_DETAILS.get().copied().unwrap_or(false)
}

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Authenticated identity is blocked (suspended tenant, expired trial,
    /// deactivated account)
    #[error("{0}")]
    AccessDenied(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidFields(Vec<FieldError>),

    // Plan or platform misconfiguration
    #[error("{0}")]
    Configuration(String),

    // External service errors
    #[error("Database error")]
    Database(DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl AppError {
    /// Error kind reported to clients
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                "Unauthorized"
            }
            AppError::Forbidden | AppError::AccessDenied(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Validation(_) | AppError::InvalidFields(_) => "ValidationError",
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                "InternalError"
            }
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details outside development)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                if internal_details_exposed() {
                    e.to_string()
                } else {
                    "A database error occurred".to_string()
                }
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                if internal_details_exposed() {
                    msg.clone()
                } else {
                    "An internal error occurred".to_string()
                }
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                msg.clone()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            error: self.kind(),
            message: self.user_message(),
            details: match self {
                AppError::InvalidFields(fields) => Some(fields),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            tracing::debug!("Unique constraint violation: {}", detail);
            return AppError::Conflict(
                "A record with the same unique value already exists".to_string(),
            );
        }
        AppError::Database(err)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::CapacityExceeded { .. } | DomainError::InvalidTransition(_) => {
                AppError::Conflict(err.to_string())
            }
            DomainError::MissingLimit(_) => AppError::Configuration(err.to_string()),
            DomainError::Password(msg) | DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T> {
        self.ok_or(AppError::NotFound(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        AppError::AccessDenied(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_is_conflict() {
        let err: AppError = DomainError::CapacityExceeded {
            resource: "Table",
            plural: "tables",
            plan: "Free Trial".into(),
            limit: 5,
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "Conflict");
        assert!(err.to_string().contains("allows 5 tables"));
    }

    #[test]
    fn test_missing_limit_is_internal() {
        let err: AppError = DomainError::MissingLimit("maxUsers").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "InternalError");
    }

    #[test]
    fn test_access_denied_is_forbidden() {
        let err = AppError::access_denied("Your account has been suspended");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        assert!(matches!(missing.ok_or_not_found("Product"), Err(AppError::NotFound("Product"))));
    }
}
