// --- File: crates/portal_acuity/src/routes.rs ---

use crate::handlers::{
    appointment_details_handler, appointment_type_details_handler, availability_dates_handler,
    availability_times_handler, check_availability_handler, create_appointment_handler,
    AcuityState,
};
use crate::relay::Relay;
use axum::{
    routing::{get, post},
    Router,
};
use portal_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all booking routes, relative to `/api`.
pub fn routes(config: Arc<AppConfig>, relay: Arc<dyn Relay>) -> Router {
    let state = Arc::new(AcuityState { config, relay });

    Router::new()
        .route(
            "/booking/appointment-type-details",
            get(appointment_type_details_handler),
        )
        .route("/booking/availability/dates", get(availability_dates_handler))
        .route("/booking/availability/times", get(availability_times_handler))
        .route("/booking/appointments", post(create_appointment_handler))
        .route("/booking/appointments/{id}", get(appointment_details_handler))
        .route("/booking/check-availability", post(check_availability_handler))
        .with_state(state)
}
