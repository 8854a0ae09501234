//! Factory for creating record stores
//!
//! Picks the Supabase store when it is enabled and fully configured, and the
//! seeded in-memory store otherwise.

use crate::memory::InMemoryRecordStore;
use crate::store::RecordStore;
use crate::supabase::SupabaseRecordStore;
use portal_config::AppConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Factory for creating record stores
#[derive(Debug, Clone, Default)]
pub struct RecordStoreFactory;

impl RecordStoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create the record store described by the application configuration.
    ///
    /// Never fails: an incomplete database setup falls back to the in-memory
    /// store with a warning.
    pub fn from_app_config(&self, config: &AppConfig) -> Arc<dyn RecordStore> {
        if let Some(store) = config.supabase_settings().and_then(SupabaseRecordStore::new) {
            info!("Using Supabase record store");
            return Arc::new(store);
        }
        if config.use_supabase {
            warn!("Supabase enabled but not fully configured; using in-memory records");
        } else {
            info!("Using in-memory record store");
        }
        Arc::new(InMemoryRecordStore::seeded())
    }
}
