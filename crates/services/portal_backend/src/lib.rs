// --- File: crates/services/portal_backend/src/lib.rs ---
pub mod app_state;
pub mod doc;
pub mod router;
pub mod service_factory;

pub use app_state::AppState;
pub use router::app;
pub use service_factory::{PortalServiceFactory, ServiceFactory};
