// File: crates/portal_acuity/src/handlers.rs
use crate::logic::{
    check_times_verdict, normalize_dates, normalize_times, provider_booking_body,
    provider_check_body, select_appointment_type, DateQuery, MonthQuery, ProviderAppointment,
    INCOMPLETE_CONFIG_MESSAGE,
};
use crate::relay::{Relay, RelayError, RelayRequest};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use chrono::{SecondsFormat, Utc};
use portal_common::models::{
    AppointmentDetails, AppointmentType, AvailabilityDatesResponse, AvailabilityTimesResponse,
    BookingConfirmation, BookingRequest, CheckAvailabilityRequest, CheckAvailabilityResponse,
};
use portal_common::validation::{
    validate_appointment_id, validate_booking_request, validate_date, validate_datetime,
    validate_month,
};
use portal_common::{ApiFailure, HttpStatusCode, PortalError};
use portal_config::AppConfig;
use std::sync::Arc;
use tracing::{info, warn};

// Shared state of the booking handlers
#[derive(Clone)]
pub struct AcuityState {
    pub config: Arc<AppConfig>,
    pub relay: Arc<dyn Relay>,
}

fn query_failure(rejection: QueryRejection) -> ApiFailure {
    warn!("Rejected query string: {}", rejection.body_text());
    ApiFailure::new(400, "Invalid request", rejection.body_text())
}

fn incomplete_config() -> ApiFailure {
    ApiFailure::new(500, "Server configuration error", INCOMPLETE_CONFIG_MESSAGE)
}

/// Maps a relay failure to the public body; `fallback` titles anything not handled specially.
fn relay_failure(err: RelayError, fallback: &str) -> ApiFailure {
    if err.status_code() == 401 {
        return ApiFailure::new(
            401,
            "Authentication failed",
            "Unable to authenticate with Acuity API",
        );
    }
    ApiFailure::from(PortalError::from(err)).with_error(fallback)
}

/// Handler to get the configured appointment type.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/appointment-type-details",
    responses(
        (status = 200, description = "Appointment type metadata", body = AppointmentType),
        (status = 404, description = "Configured type not found at the provider", body = portal_common::models::ApiErrorBody),
        (status = 500, description = "Configuration or provider failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Booking"
))]
pub async fn appointment_type_details_handler(
    State(state): State<Arc<AcuityState>>,
) -> Result<Json<AppointmentType>, ApiFailure> {
    let Some(type_id) = state.config.acuity.appointment_type_id() else {
        return Err(ApiFailure::new(
            500,
            "Server configuration error",
            "Appointment type not configured",
        ));
    };

    let payload = state
        .relay
        .send("/appointment-types", RelayRequest::get())
        .await
        .map_err(|e| relay_failure(e, "Failed to fetch appointment type"))?;

    let found = select_appointment_type(payload, type_id)
        .map_err(|e| ApiFailure::from(e).with_error("Failed to fetch appointment type"))?;

    match found {
        Some(appointment_type) => Ok(Json(appointment_type)),
        None => Err(ApiFailure::new(
            404,
            "Appointment type not found",
            format!("Appointment type {} not found in Acuity", type_id),
        )),
    }
}

/// Handler to get the available dates of a month.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/availability/dates",
    params(MonthQuery),
    responses(
        (status = 200, description = "Available dates", body = AvailabilityDatesResponse),
        (status = 400, description = "Malformed month", body = portal_common::models::ApiErrorBody),
        (status = 401, description = "Provider rejected credentials", body = portal_common::models::ApiErrorBody),
        (status = 500, description = "Configuration or provider failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Booking"
))]
pub async fn availability_dates_handler(
    State(state): State<Arc<AcuityState>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<AvailabilityDatesResponse>, ApiFailure> {
    let Query(query) = query.map_err(query_failure)?;
    let month = query.month.unwrap_or_default();
    validate_month(&month)?;

    let Some((type_id, calendar_id, timezone)) = state.config.acuity.booking_settings() else {
        return Err(incomplete_config());
    };

    let request = RelayRequest::get()
        .param("appointmentTypeID", type_id)
        .param("month", &month)
        .param("timezone", timezone)
        .param("calendarID", calendar_id);

    let payload = state
        .relay
        .send("/availability/dates", request)
        .await
        .map_err(|e| match e.status_code() {
            400 => relay_failure(e, "Invalid request"),
            _ => relay_failure(e, "Failed to fetch available dates"),
        })?;

    let dates = normalize_dates(payload)
        .map_err(|e| ApiFailure::from(e).with_error("Failed to fetch available dates"))?;
    info!("{} available dates for {}", dates.len(), month);
    Ok(Json(AvailabilityDatesResponse { dates }))
}

/// Handler to get the available time slots of a date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/availability/times",
    params(DateQuery),
    responses(
        (status = 200, description = "Available time slots", body = AvailabilityTimesResponse),
        (status = 400, description = "Malformed date", body = portal_common::models::ApiErrorBody),
        (status = 401, description = "Provider rejected credentials", body = portal_common::models::ApiErrorBody),
        (status = 500, description = "Configuration or provider failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Booking"
))]
pub async fn availability_times_handler(
    State(state): State<Arc<AcuityState>>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<AvailabilityTimesResponse>, ApiFailure> {
    let Query(query) = query.map_err(query_failure)?;
    let date = query.date.unwrap_or_default();
    validate_date(&date)?;

    let Some((type_id, calendar_id, timezone)) = state.config.acuity.booking_settings() else {
        return Err(incomplete_config());
    };

    let request = RelayRequest::get()
        .param("appointmentTypeID", type_id)
        .param("date", &date)
        .param("timezone", timezone)
        .param("calendarID", calendar_id);

    let payload = state
        .relay
        .send("/availability/times", request)
        .await
        .map_err(|e| match e.status_code() {
            400 => relay_failure(e, "Invalid request"),
            _ => relay_failure(e, "Failed to fetch available times"),
        })?;

    let times = normalize_times(payload)
        .map_err(|e| ApiFailure::from(e).with_error("Failed to fetch available times"))?;
    Ok(Json(AvailabilityTimesResponse { times }))
}

/// Handler to book an appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/appointments",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Appointment booked", body = BookingConfirmation),
        (status = 400, description = "Invalid booking request", body = portal_common::models::ApiErrorBody),
        (status = 401, description = "Provider rejected credentials", body = portal_common::models::ApiErrorBody),
        (status = 422, description = "Time slot no longer available", body = portal_common::models::ApiErrorBody),
        (status = 500, description = "Configuration or provider failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Booking"
))]
pub async fn create_appointment_handler(
    State(state): State<Arc<AcuityState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingConfirmation>), ApiFailure> {
    let Json(booking) = payload.map_err(|rejection| {
        warn!("Rejected booking body: {}", rejection.body_text());
        ApiFailure::new(400, "Invalid booking request", "Invalid request data")
    })?;

    validate_booking_request(&booking)
        .map_err(|e| ApiFailure::from(e).with_error("Invalid booking request"))?;

    let (Some(type_id), Some(calendar_id)) = (
        state.config.acuity.appointment_type_id(),
        state.config.acuity.calendar_id(),
    ) else {
        return Err(incomplete_config());
    };

    let body = provider_booking_body(&booking, type_id, calendar_id)?;

    let created = state
        .relay
        .send("/appointments", RelayRequest::post(body))
        .await
        .map_err(|e| match e.status_code() {
            400 => relay_failure(e, "Invalid booking request"),
            422 => relay_failure(e, "Time slot unavailable"),
            _ => relay_failure(e, "Failed to create appointment"),
        })?;

    let confirmation = ProviderAppointment::parse(created)
        .map_err(|e| ApiFailure::from(e).with_error("Failed to create appointment"))?
        .into_confirmation();
    info!("Booked appointment {}", confirmation.appointment_id);

    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// Handler to fetch a booked appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id, digits only")),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentDetails),
        (status = 400, description = "Id is not a digit string", body = portal_common::models::ApiErrorBody),
        (status = 404, description = "No such appointment", body = portal_common::models::ApiErrorBody),
        (status = 500, description = "Provider failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Booking"
))]
pub async fn appointment_details_handler(
    State(state): State<Arc<AcuityState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetails>, ApiFailure> {
    let id = validate_appointment_id(&id)?;

    let record = state
        .relay
        .send(&format!("/appointments/{}", id), RelayRequest::get())
        .await
        .map_err(|e| match e.status_code() {
            404 => ApiFailure::new(
                404,
                "Appointment not found",
                "The requested appointment could not be found",
            ),
            _ => relay_failure(e, "Failed to fetch appointment"),
        })?;

    let details = ProviderAppointment::parse(record)
        .map_err(|e| ApiFailure::from(e).with_error("Failed to fetch appointment"))?
        .into_details();
    Ok(Json(details))
}

/// Diagnostic probe: credentials only, or a concrete slot when `datetime` is given.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/check-availability",
    request_body = CheckAvailabilityRequest,
    responses(
        (status = 200, description = "Probe result", body = CheckAvailabilityResponse),
        (status = 400, description = "Malformed datetime", body = portal_common::models::ApiErrorBody),
        (status = 401, description = "Provider rejected credentials", body = portal_common::models::ApiErrorBody),
        (status = 500, description = "Configuration or provider failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Booking"
))]
pub async fn check_availability_handler(
    State(state): State<Arc<AcuityState>>,
    payload: Result<Json<CheckAvailabilityRequest>, JsonRejection>,
) -> Result<Json<CheckAvailabilityResponse>, ApiFailure> {
    let probe = match payload {
        Ok(Json(probe)) => probe,
        Err(JsonRejection::MissingJsonContentType(_)) => CheckAvailabilityRequest::default(),
        Err(rejection) => {
            return Err(ApiFailure::new(
                400,
                "Invalid request",
                rejection.body_text(),
            ))
        }
    };

    let Some(datetime) = probe.datetime.filter(|d| !d.is_empty()) else {
        state
            .relay
            .send("/me", RelayRequest::get())
            .await
            .map_err(|e| relay_failure(e, "Availability check failed"))?;
        return Ok(Json(CheckAvailabilityResponse {
            ok: true,
            provider: Some("acuity".to_string()),
            checked_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            datetime: None,
            valid: None,
        }));
    };

    validate_datetime(&datetime)?;

    let (Some(type_id), Some(calendar_id)) = (
        state.config.acuity.appointment_type_id(),
        state.config.acuity.calendar_id(),
    ) else {
        return Err(incomplete_config());
    };

    let body = provider_check_body(&datetime, type_id, calendar_id)?;
    let verdict = state
        .relay
        .send("/availability/check-times", RelayRequest::post(body))
        .await
        .map_err(|e| relay_failure(e, "Availability check failed"))?;

    Ok(Json(CheckAvailabilityResponse {
        ok: true,
        provider: None,
        checked_at: None,
        valid: Some(check_times_verdict(&verdict)),
        datetime: Some(datetime),
    }))
}
