// --- File: crates/portal_common/src/lib.rs ---

pub mod error; // Error taxonomy
pub mod http; // HTTP error bodies and the shared client
pub mod logging; // Logging setup
pub mod models; // Wire types
pub mod validation; // Input rules

// Re-export error types and utilities for easier access
pub use error::{
    config_error, internal_error, not_found, validation_error, HttpStatusCode, PortalError,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, HTTP_CLIENT},
    panic_response, ApiFailure,
};
