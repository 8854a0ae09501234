// --- File: crates/portal_booking_flow/src/lib.rs ---
//! Client side of the booking page: the calendar widgets, the booking
//! wizard, and the instrumented API client feeding the debug log.

pub mod api;
pub mod api_log;
pub mod calendar;
pub mod dual;
pub mod retry;
pub mod selection;
pub mod submission;
#[cfg(test)]
mod submission_test;

pub use api::{BookingApi, ClientError, HttpBookingApi};
pub use api_log::{ApiLog, ApiLogEntry};
pub use calendar::CalendarMonth;
pub use dual::DualSelection;
pub use retry::RetryPolicy;
pub use selection::{FetchState, SelectionError, SelectionFlow};
pub use submission::{BookingStep, ContactForm, SubmissionError, SubmissionFlow};
