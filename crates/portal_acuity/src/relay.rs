// --- File: crates/portal_acuity/src/relay.rs ---
//! Authenticated pass-through to the Acuity Scheduling REST API.
//!
//! Every provider failure, whatever its cause, leaves here as a [`RelayError`]
//! carrying a status code and a single human-readable message.

use async_trait::async_trait;
use portal_common::{HttpStatusCode, PortalError, HTTP_CLIENT};
use portal_config::AcuityConfig;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tracing::{error, info};

pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Acuity credentials not configured. Set ACUITY_USER_ID and ACUITY_API_KEY.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl RelayMethod {
    fn as_method(self) -> Method {
        match self {
            RelayMethod::Get => Method::GET,
            RelayMethod::Post => Method::POST,
            RelayMethod::Put => Method::PUT,
            RelayMethod::Delete => Method::DELETE,
        }
    }

    /// Only POST and PUT send a JSON body.
    fn carries_body(self) -> bool {
        matches!(self, RelayMethod::Post | RelayMethod::Put)
    }
}

impl fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// One outbound call: method, query parameters and an optional JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayRequest {
    pub method: RelayMethod,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RelayRequest {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: RelayMethod::Post,
            params: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds a query parameter; the value is sent in its string form.
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    #[error("{}", MISSING_CREDENTIALS_MESSAGE)]
    MissingCredentials,

    /// The provider answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status_code: u16,
        message: String,
        /// The provider's parsed error body, or the synthesized one.
        error: Value,
    },

    /// DNS, connection reset, timeout or an unreadable body.
    #[error("{message}")]
    Transport { message: String },
}

impl HttpStatusCode for RelayError {
    fn status_code(&self) -> u16 {
        match self {
            RelayError::MissingCredentials => 500,
            RelayError::Api { status_code, .. } => *status_code,
            RelayError::Transport { .. } => 500,
        }
    }
}

impl From<RelayError> for PortalError {
    fn from(err: RelayError) -> Self {
        let message = err.to_string();
        match err {
            RelayError::MissingCredentials => PortalError::ConfigError(message),
            RelayError::Transport { .. } => PortalError::TransientError(message),
            RelayError::Api { status_code, .. } => match status_code {
                400 => PortalError::ValidationError(message),
                401 => PortalError::AuthError(message),
                404 => PortalError::NotFoundError(message),
                422 => PortalError::ConflictError(message),
                _ => PortalError::ExternalServiceError {
                    status_code,
                    message,
                },
            },
        }
    }
}

/// The seam between the booking handlers and the provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Relay: Send + Sync {
    /// Sends `request` to `endpoint` (a path such as `/availability/dates`)
    /// and returns the provider's JSON payload.
    async fn send(&self, endpoint: &str, request: RelayRequest) -> Result<Value, RelayError>;
}

/// [`Relay`] over HTTPS with Basic authentication.
#[derive(Clone)]
pub struct AcuityRelay {
    base_url: String,
    credentials: Option<(String, String)>,
    client: Client,
}

impl fmt::Debug for AcuityRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcuityRelay")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AcuityRelay {
    pub fn new(config: &AcuityConfig) -> Self {
        Self::with_client(config, HTTP_CLIENT.clone())
    }

    pub fn with_client(config: &AcuityConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config
                .credentials()
                .map(|(user, key)| (user.to_string(), key.to_string())),
            client,
        }
    }

    fn fail(&self, endpoint: &str, err: RelayError) -> RelayError {
        error!(
            endpoint = endpoint,
            status = err.status_code(),
            "Acuity request failed: {}",
            err
        );
        err
    }
}

/// Picks the most specific message out of a provider error body.
pub fn provider_error_message(data: &Value, status: StatusCode) -> String {
    let field = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    field("message").or_else(|| field("error")).unwrap_or_else(|| {
        format!(
            "Acuity API error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    })
}

#[async_trait]
impl Relay for AcuityRelay {
    async fn send(&self, endpoint: &str, request: RelayRequest) -> Result<Value, RelayError> {
        let Some((user_id, api_key)) = self.credentials.as_ref() else {
            return Err(self.fail(endpoint, RelayError::MissingCredentials));
        };

        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self
            .client
            .request(request.method.as_method(), &url)
            .basic_auth(user_id, Some(api_key))
            .header(CONTENT_TYPE, "application/json");

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if request.method.carries_body() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await.map_err(|e| {
            self.fail(
                endpoint,
                RelayError::Transport {
                    message: format!("Failed to connect to Acuity Scheduling API: {}", e),
                },
            )
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            self.fail(
                endpoint,
                RelayError::Transport {
                    message: format!("Failed to read Acuity response: {}", e),
                },
            )
        })?;
        let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();

        if status.is_success() {
            return Ok(parsed.unwrap_or(Value::Null));
        }

        let data = parsed.unwrap_or_else(|| {
            json!({
                "error": format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
            })
        });
        let message = provider_error_message(&data, status);

        Err(self.fail(
            endpoint,
            RelayError::Api {
                status_code: status.as_u16(),
                message,
                error: data,
            },
        ))
    }
}

/// Checks the credentials against `GET /me`.
pub async fn validate_credentials(relay: &dyn Relay) -> bool {
    match relay.send("/me", RelayRequest::get()).await {
        Ok(_) => {
            info!("Acuity credentials validated successfully");
            true
        }
        Err(err) => {
            error!(
                status = err.status_code(),
                "Acuity credential validation failed: {}", err
            );
            false
        }
    }
}
