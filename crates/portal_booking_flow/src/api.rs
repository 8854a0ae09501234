// --- File: crates/portal_booking_flow/src/api.rs ---
use crate::api_log::ApiLog;
use async_trait::async_trait;
use portal_common::models::{
    AppointmentDetails, AppointmentType, AvailabilityDate, AvailabilityDatesResponse,
    AvailabilityTimesResponse, BookingConfirmation, BookingRequest, CheckAvailabilityRequest,
    CheckAvailabilityResponse, TimeSlot,
};
use portal_common::HTTP_CLIENT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

pub const DATES_FALLBACK: &str = "Failed to fetch available dates";
pub const TIMES_FALLBACK: &str = "Failed to fetch available times";
pub const BOOKING_FALLBACK: &str = "Failed to create appointment";
pub const APPOINTMENT_TYPE_FALLBACK: &str = "Failed to fetch appointment type";
pub const APPOINTMENT_FALLBACK: &str = "Failed to fetch appointment";
pub const CHECK_FALLBACK: &str = "Availability check failed";

/// Failure of one call against the booking API, as the user should read it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The server answered with a failure status; `message` is its body's
    /// `message` or the call's generic fallback.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// No answer (connection refused, timeout).
    #[error("{0}")]
    Transport(String),

    /// A success status with a body that does not match the contract.
    #[error("{0}")]
    Decode(String),
}

impl ClientError {
    /// Transport failures and server-side 5xx may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Status { status, .. } => !matches!(status, 400 | 401 | 404 | 422),
            ClientError::Transport(_) => true,
            ClientError::Decode(_) => false,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Status { message, .. } => message,
            ClientError::Transport(m) | ClientError::Decode(m) => m,
        }
    }
}

/// The booking endpoints as seen from the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn appointment_type(&self) -> Result<AppointmentType, ClientError>;

    async fn available_dates(&self, month: &str) -> Result<Vec<AvailabilityDate>, ClientError>;

    async fn available_times(&self, date: &str) -> Result<Vec<TimeSlot>, ClientError>;

    /// Never retried by callers.
    async fn create_appointment(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, ClientError>;

    async fn appointment(&self, id: &str) -> Result<AppointmentDetails, ClientError>;

    async fn check_availability(
        &self,
        datetime: Option<String>,
    ) -> Result<CheckAvailabilityResponse, ClientError>;
}

/// `BookingApi` over HTTP. Every call is recorded in the shared [`ApiLog`].
#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    base_url: String,
    client: Client,
    log: ApiLog,
}

fn elapsed_ms(started: Instant) -> Option<u64> {
    Some(started.elapsed().as_millis() as u64)
}

impl HttpBookingApi {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>, log: ApiLog) -> Self {
        Self::with_client(base_url, HTTP_CLIENT.clone(), log)
    }

    pub fn with_client(base_url: impl Into<String>, client: Client, log: ApiLog) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            log,
        }
    }

    pub fn log(&self) -> &ApiLog {
        &self.log
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            if let Ok(qs) = serde_urlencoded::to_string(query) {
                url.push('?');
                url.push_str(&qs);
            }
        }
        url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(path, query);
        let log_id = self.log.log_request(method.as_str(), &url, body.clone());
        let started = Instant::now();

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("{} unreachable: {}", url, err);
                self.log
                    .log_error(&log_id, &err.to_string(), elapsed_ms(started));
                return Err(ClientError::Transport(fallback.to_string()));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                self.log
                    .log_error(&log_id, &err.to_string(), elapsed_ms(started));
                return Err(ClientError::Transport(fallback.to_string()));
            }
        };
        let payload: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        self.log.log_response(
            &log_id,
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            Some(payload.clone()),
            elapsed_ms(started),
        );

        if !status.is_success() {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string();
            debug!("{} failed with {}: {}", url, status.as_u16(), message);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_value(payload).map_err(|e| {
            warn!("{} returned an unexpected body: {}", url, e);
            ClientError::Decode(fallback.to_string())
        })
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn appointment_type(&self) -> Result<AppointmentType, ClientError> {
        self.call(
            Method::GET,
            "/booking/appointment-type-details",
            &[],
            None,
            APPOINTMENT_TYPE_FALLBACK,
        )
        .await
    }

    async fn available_dates(&self, month: &str) -> Result<Vec<AvailabilityDate>, ClientError> {
        let response: AvailabilityDatesResponse = self
            .call(
                Method::GET,
                "/booking/availability/dates",
                &[("month", month)],
                None,
                DATES_FALLBACK,
            )
            .await?;
        Ok(response.dates)
    }

    async fn available_times(&self, date: &str) -> Result<Vec<TimeSlot>, ClientError> {
        let response: AvailabilityTimesResponse = self
            .call(
                Method::GET,
                "/booking/availability/times",
                &[("date", date)],
                None,
                TIMES_FALLBACK,
            )
            .await?;
        Ok(response.times)
    }

    async fn create_appointment(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, ClientError> {
        let body = serde_json::to_value(&request)
            .map_err(|_| ClientError::Decode(BOOKING_FALLBACK.to_string()))?;
        self.call(
            Method::POST,
            "/booking/appointments",
            &[],
            Some(body),
            BOOKING_FALLBACK,
        )
        .await
    }

    async fn appointment(&self, id: &str) -> Result<AppointmentDetails, ClientError> {
        let path = format!("/booking/appointments/{}", id);
        self.call(Method::GET, &path, &[], None, APPOINTMENT_FALLBACK)
            .await
    }

    async fn check_availability(
        &self,
        datetime: Option<String>,
    ) -> Result<CheckAvailabilityResponse, ClientError> {
        let body = serde_json::to_value(CheckAvailabilityRequest { datetime })
            .map_err(|_| ClientError::Decode(CHECK_FALLBACK.to_string()))?;
        self.call(
            Method::POST,
            "/booking/check-availability",
            &[],
            Some(body),
            CHECK_FALLBACK,
        )
        .await
    }
}
