// --- File: crates/portal_booking_flow/src/submission.rs ---
use crate::api::BookingApi;
use portal_common::models::{BookingConfirmation, BookingRequest};
use portal_common::validation::{
    is_valid_email, is_valid_phone, FIRST_NAME_MESSAGE, LAST_NAME_MESSAGE, PHONE_MESSAGE,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Zone sent with every booking made through the portal.
pub const BOOKING_TIMEZONE: &str = "America/Chicago";
pub const NO_SELECTION_MESSAGE: &str = "Please select a date and time before submitting";
pub const FORM_EMAIL_MESSAGE: &str = "Please enter a valid email address";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingStep {
    #[default]
    Select,
    Form,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
}

/// A form field that failed its check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Checks the form the way the server will, reporting every failing field
/// in form order.
pub fn validate_form(form: &ContactForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.first_name.is_empty() {
        errors.push(FieldError {
            field: "firstName",
            message: FIRST_NAME_MESSAGE,
        });
    }
    if form.last_name.is_empty() {
        errors.push(FieldError {
            field: "lastName",
            message: LAST_NAME_MESSAGE,
        });
    }
    if !is_valid_email(&form.email) {
        errors.push(FieldError {
            field: "email",
            message: FORM_EMAIL_MESSAGE,
        });
    }
    if !is_valid_phone(&form.phone) {
        errors.push(FieldError {
            field: "phone",
            message: PHONE_MESSAGE,
        });
    }
    errors
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("{}", NO_SELECTION_MESSAGE)]
    NoSelection,

    #[error("{}", .0.first().map_or("Invalid form", |e| e.message))]
    InvalidForm(Vec<FieldError>),

    /// The server's message, shown as is.
    #[error("{0}")]
    Rejected(String),

    #[error("A booking is already being submitted")]
    InProgress,

    #[error("Nothing to submit at this step")]
    WrongStep,
}

/// Holds the submitting flag for the duration of one booking call. The flag
/// drops back when the call ends or its future is abandoned.
struct Busy<'a>(&'a mut bool);

impl<'a> Busy<'a> {
    fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Busy(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// How the wizard was left through "close".
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedBooking {
    pub confirmation: Option<BookingConfirmation>,
}

/// The Select → Form → Confirm booking wizard.
///
/// A failed booking is never retried automatically; the form keeps its
/// values so the user can submit again.
pub struct SubmissionFlow {
    api: Arc<dyn BookingApi>,
    step: BookingStep,
    selected_datetime: Option<String>,
    launch_datetime: Option<String>,
    form: ContactForm,
    submitting: bool,
    error: Option<String>,
    confirmation: Option<BookingConfirmation>,
}

impl std::fmt::Debug for SubmissionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionFlow")
            .field("step", &self.step)
            .field("selected_datetime", &self.selected_datetime)
            .field("launch_datetime", &self.launch_datetime)
            .field("submitting", &self.submitting)
            .field("error", &self.error)
            .finish()
    }
}

impl SubmissionFlow {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self {
            api,
            step: BookingStep::Select,
            selected_datetime: None,
            launch_datetime: None,
            form: ContactForm::default(),
            submitting: false,
            error: None,
            confirmation: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn selected_datetime(&self) -> Option<&str> {
        self.selected_datetime.as_deref()
    }

    /// The launch meeting picked in the two-meeting flow. Kept for display,
    /// not booked.
    pub fn launch_datetime(&self) -> Option<&str> {
        self.launch_datetime.as_deref()
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    /// While true the form is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    pub fn can_go_back(&self) -> bool {
        self.step == BookingStep::Form && self.selected_datetime.is_some()
    }

    pub fn choose_datetime(&mut self, datetime: impl Into<String>) {
        self.selected_datetime = Some(datetime.into());
        self.step = BookingStep::Form;
        self.error = None;
    }

    pub fn choose_meetings(&mut self, design: impl Into<String>, launch: impl Into<String>) {
        self.launch_datetime = Some(launch.into());
        self.choose_datetime(design);
    }

    /// From the form back to date selection; the chosen slot is dropped.
    pub fn back(&mut self) {
        if self.step == BookingStep::Form {
            self.step = BookingStep::Select;
            self.selected_datetime = None;
            self.launch_datetime = None;
        }
    }

    pub async fn submit(
        &mut self,
        form: ContactForm,
    ) -> Result<&BookingConfirmation, SubmissionError> {
        if self.submitting {
            return Err(SubmissionError::InProgress);
        }
        if self.step == BookingStep::Confirm {
            return Err(SubmissionError::WrongStep);
        }
        self.form = form;

        let Some(datetime) = self.selected_datetime.clone() else {
            self.error = Some(NO_SELECTION_MESSAGE.to_string());
            return Err(SubmissionError::NoSelection);
        };

        let field_errors = validate_form(&self.form);
        if !field_errors.is_empty() {
            return Err(SubmissionError::InvalidForm(field_errors));
        }

        let request = BookingRequest {
            datetime,
            first_name: self.form.first_name.clone(),
            last_name: self.form.last_name.clone(),
            email: self.form.email.clone(),
            phone: self.form.phone.clone(),
            timezone: BOOKING_TIMEZONE.to_string(),
            notes: self.form.notes.clone().filter(|n| !n.is_empty()),
        };

        let api = self.api.clone();
        let result = {
            let _busy = Busy::set(&mut self.submitting);
            api.create_appointment(request).await
        };

        match result {
            Ok(confirmation) => {
                info!("Booked appointment {}", confirmation.appointment_id);
                self.error = None;
                self.step = BookingStep::Confirm;
                Ok(self.confirmation.insert(confirmation))
            }
            Err(err) => {
                warn!("Booking failed: {}", err);
                let message = err.message().to_string();
                self.error = Some(message.clone());
                Err(SubmissionError::Rejected(message))
            }
        }
    }

    /// "Schedule another": back to an empty wizard.
    pub fn schedule_another(&mut self) {
        self.step = BookingStep::Select;
        self.selected_datetime = None;
        self.launch_datetime = None;
        self.form = ContactForm::default();
        self.submitting = false;
        self.error = None;
        self.confirmation = None;
    }

    /// "Close": leaves the wizard.
    pub fn close(self) -> ClosedBooking {
        ClosedBooking {
            confirmation: self.confirmation,
        }
    }
}
