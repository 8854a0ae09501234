// --- File: crates/portal_records/src/lib.rs ---
pub mod doc;
pub mod factory;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod memory;
pub mod models;
pub mod routes;
pub mod store;
pub mod supabase;

pub use factory::RecordStoreFactory;
pub use memory::InMemoryRecordStore;
pub use routes::routes;
pub use store::{RecordStore, RecordStoreError};
pub use supabase::SupabaseRecordStore;
