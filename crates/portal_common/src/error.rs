// --- File: crates/portal_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The shared error taxonomy of the portal.
///
/// Crate-level errors (relay, record store) convert into this type, and the
/// HTTP layer turns it into the public `{error, message}` body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortalError {
    /// A required server setting is missing. Needs an operator, never retried.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed client input.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The provider rejected our credentials.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The slot was taken between read and write.
    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Network or availability hiccup talking to a collaborator.
    #[error("Transient error: {0}")]
    TransientError(String),

    /// A collaborator answered with a failure status of its own.
    #[error("External service error: {status_code} - {message}")]
    ExternalServiceError { status_code: u16, message: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PortalError {
    fn status_code(&self) -> u16 {
        match self {
            PortalError::ConfigError(_) => 500,
            PortalError::ValidationError(_) => 400,
            PortalError::AuthError(_) => 401,
            PortalError::ConflictError(_) => 422,
            PortalError::NotFoundError(_) => 404,
            PortalError::TransientError(_) => 500,
            PortalError::ExternalServiceError { status_code, .. } => *status_code,
            PortalError::InternalError(_) => 500,
        }
    }
}

impl PortalError {
    /// The bare message, without the category prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            PortalError::ConfigError(m)
            | PortalError::ValidationError(m)
            | PortalError::AuthError(m)
            | PortalError::ConflictError(m)
            | PortalError::NotFoundError(m)
            | PortalError::TransientError(m)
            | PortalError::InternalError(m) => m,
            PortalError::ExternalServiceError { message, .. } => message,
        }
    }

    /// Default `error` title of the public body for this category.
    pub fn title(&self) -> &'static str {
        match self {
            PortalError::ConfigError(_) => "Server configuration error",
            PortalError::ValidationError(_) => "Invalid request",
            PortalError::AuthError(_) => "Authentication failed",
            PortalError::ConflictError(_) => "Conflict",
            PortalError::NotFoundError(_) => "Not found",
            PortalError::TransientError(_) => "Service unavailable",
            PortalError::ExternalServiceError { .. } => "External service error",
            PortalError::InternalError(_) => "Internal server error",
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        PortalError::TransientError(err.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> PortalError {
    PortalError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> PortalError {
    PortalError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> PortalError {
    PortalError::NotFoundError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> PortalError {
    PortalError::InternalError(message.to_string())
}
