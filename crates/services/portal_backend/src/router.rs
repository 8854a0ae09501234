// --- File: crates/services/portal_backend/src/router.rs ---
use crate::app_state::AppState;
use axum::{extract::State, response::Json, routing::get, Router};
use portal_common::models::PingResponse;
use portal_common::panic_response;
use portal_config::AppConfig;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const DEFAULT_PING_MESSAGE: &str = "ping";

/// Liveness check.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Server is up", body = PingResponse)
    ),
    tag = "Portal"
))]
pub async fn ping_handler(State(config): State<Arc<AppConfig>>) -> Json<PingResponse> {
    let message = config
        .ping_message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_PING_MESSAGE.to_string());
    Json(PingResponse { message })
}

/// Every API route under `/api`, with CORS, request tracing and panic recovery.
pub fn app(state: &AppState) -> Router {
    let config = state.config.clone();
    let factory = &state.service_factory;

    let api_router = Router::new()
        .route("/ping", get(ping_handler))
        .with_state(config.clone())
        .merge(portal_acuity::routes(config.clone(), factory.relay()))
        .merge(portal_records::routes(config, factory.record_store()));

    Router::new()
        .nest("/api", api_router)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
