// --- File: crates/portal_acuity/src/lib.rs ---
pub mod doc;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod relay;
pub mod routes;

pub use relay::{validate_credentials, AcuityRelay, Relay, RelayError, RelayRequest};
pub use routes::routes;
