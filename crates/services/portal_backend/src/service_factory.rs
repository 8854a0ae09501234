// --- File: crates/services/portal_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the provider relay and the record store once at startup; handlers
//! receive them through their router state.
use portal_acuity::{AcuityRelay, Relay};
use portal_config::AppConfig;
use portal_records::{RecordStore, RecordStoreFactory};
use std::sync::Arc;
use tracing::{info, warn};

/// Access to the services the routers depend on.
pub trait ServiceFactory: Send + Sync {
    fn relay(&self) -> Arc<dyn Relay>;

    fn record_store(&self) -> Arc<dyn RecordStore>;
}

/// The services described by the application configuration.
pub struct PortalServiceFactory {
    relay: Arc<dyn Relay>,
    record_store: Arc<dyn RecordStore>,
}

impl PortalServiceFactory {
    pub fn new(config: &AppConfig) -> Self {
        if config.acuity.credentials().is_some() {
            info!("Acuity relay configured for {}", config.acuity.base_url);
        } else {
            warn!("Acuity credentials missing; booking endpoints will answer 500");
        }
        let relay: Arc<dyn Relay> = Arc::new(AcuityRelay::new(&config.acuity));
        let record_store = RecordStoreFactory::new().from_app_config(config);
        info!("Record store: {}", record_store.name());

        Self {
            relay,
            record_store,
        }
    }

    /// Uses the given services as they are.
    pub fn from_parts(relay: Arc<dyn Relay>, record_store: Arc<dyn RecordStore>) -> Self {
        Self {
            relay,
            record_store,
        }
    }
}

impl ServiceFactory for PortalServiceFactory {
    fn relay(&self) -> Arc<dyn Relay> {
        self.relay.clone()
    }

    fn record_store(&self) -> Arc<dyn RecordStore> {
        self.record_store.clone()
    }
}
