//! Domain-level errors.
//!
//! These errors represent business rule violations. They are independent of
//! HTTP and persistence concerns.

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("{0}")]
    Validation(String),

    /// Password-related errors
    #[error("Password error: {0}")]
    Password(String),

    /// A plan limit would be exceeded by creating one more resource
    #[error("{resource} limit reached. Your {plan} allows {limit} {plural}. Please upgrade your plan.")]
    CapacityExceeded {
        resource: &'static str,
        plural: &'static str,
        plan: String,
        limit: u64,
    },

    /// Plan features define no value for a limit that an operation needs
    #[error("Plan configuration error: limit '{0}' is not defined")]
    MissingLimit(&'static str),

    /// Tenant status does not permit the requested transition
    #[error("{0}")]
    InvalidTransition(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
