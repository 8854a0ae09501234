// File: crates/portal_acuity/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use portal_common::models::{
    ApiErrorBody, AppointmentDetails, AppointmentType, AvailabilityDate,
    AvailabilityDatesResponse, AvailabilityTimesResponse, BookingConfirmation, BookingRequest,
    CheckAvailabilityRequest, CheckAvailabilityResponse, TimeSlot,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::appointment_type_details_handler,
        crate::handlers::availability_dates_handler,
        crate::handlers::availability_times_handler,
        crate::handlers::create_appointment_handler,
        crate::handlers::appointment_details_handler,
        crate::handlers::check_availability_handler
    ),
    components(
        schemas(
            ApiErrorBody,
            AppointmentType,
            AvailabilityDate,
            AvailabilityDatesResponse,
            TimeSlot,
            AvailabilityTimesResponse,
            BookingRequest,
            BookingConfirmation,
            AppointmentDetails,
            CheckAvailabilityRequest,
            CheckAvailabilityResponse
        )
    ),
    tags(
        (name = "Booking", description = "Acuity Scheduling booking API")
    ),
    servers(
        (url = "/api", description = "Booking API server")
    )
)]
pub struct BookingApiDoc;
