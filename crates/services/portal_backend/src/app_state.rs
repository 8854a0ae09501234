// --- File: crates/services/portal_backend/src/app_state.rs ---
use crate::service_factory::{PortalServiceFactory, ServiceFactory};
use portal_config::AppConfig;
use std::sync::Arc;

/// Application state shared by every router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
}

impl AppState {
    /// Builds the services described by `config`.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let service_factory = Arc::new(PortalServiceFactory::new(&config));
        Self::with_factory(config, service_factory)
    }

    pub fn with_factory(config: Arc<AppConfig>, service_factory: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config,
            service_factory,
        }
    }
}
