// File: crates/services/portal_backend/src/main.rs
use portal_acuity::validate_credentials;
use portal_backend::{app, AppState};
use portal_common::logging;
use portal_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config()?);
    let _log_guard = logging::init(&config.logging);

    for warning in config.startup_warnings() {
        warn!("{}", warning);
    }

    let state = AppState::new(config.clone());

    if config.acuity.credentials().is_some() {
        let relay = state.service_factory.relay();
        tokio::spawn(async move {
            validate_credentials(relay.as_ref()).await;
        });
    }

    #[allow(unused_mut)]
    let mut router = app(&state);

    #[cfg(feature = "openapi")]
    {
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui = SwaggerUi::new("/api/docs")
            .url("/api/docs/openapi.json", portal_backend::doc::openapi());
        router = router.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
