// File: crates/services/portal_backend/src/doc.rs

#![cfg(feature = "openapi")]
use portal_acuity::doc::BookingApiDoc;
use portal_common::models::PingResponse;
use portal_records::doc::RecordsApiDoc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Portal API",
        version = "0.1.0",
        description = "Booking relay and customer portal API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(crate::router::ping_handler),
    components(schemas(PingResponse)),
    tags( (name = "Portal", description = "Core service endpoints")),
    servers( (url = "/api", description = "Main API Prefix")),
)]
pub struct ApiDoc;

/// The merged document served at `/api/docs/openapi.json`.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(BookingApiDoc::openapi());
    doc.merge(RecordsApiDoc::openapi());
    doc
}
