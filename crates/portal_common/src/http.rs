// --- File: crates/portal_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use tracing::error;

use crate::error::{HttpStatusCode, PortalError};
use crate::models::ApiErrorBody;

pub mod client;

/// A failed request as the client sees it: a status and the `{error, message}` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: String,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            error: error.into(),
            message: message.into(),
        }
    }

    /// Replaces the `error` title, keeping status and message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, "Internal server error", message)
    }

    pub fn body(&self) -> ApiErrorBody {
        ApiErrorBody {
            error: self.error.clone(),
            message: self.message.clone(),
        }
    }
}

impl From<PortalError> for ApiFailure {
    fn from(err: PortalError) -> Self {
        ApiFailure::new(err.status_code(), err.title(), err.message())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = Json(self.body());
        (self.status, body).into_response()
    }
}

/// Implement IntoResponse for PortalError to make it easier to use in Axum handlers.
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        ApiFailure::from(self).into_response()
    }
}

/// Response for a panic caught by `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("handler panicked: {}", detail);
    ApiFailure::internal("An unexpected error occurred").into_response()
}
