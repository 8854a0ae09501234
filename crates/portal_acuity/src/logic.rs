// --- File: crates/portal_acuity/src/logic.rs ---
//! Reshaping between the provider's payloads and the portal's wire types.

use portal_common::models::{
    AppointmentDetails, AppointmentType, AvailabilityDate, BookingConfirmation, BookingRequest,
    TimeSlot, BOOKING_CONFIRMED_MESSAGE,
};
use portal_common::{config_error, internal_error, PortalError};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

#[cfg(feature = "openapi")]
use utoipa::IntoParams;

pub const INCOMPLETE_CONFIG_MESSAGE: &str = "Acuity configuration incomplete";

// --- Query parameters ---

#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[derive(Debug, Deserialize, Default)]
pub struct MonthQuery {
    /// Month in YYYY-MM format
    pub month: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[derive(Debug, Deserialize, Default)]
pub struct DateQuery {
    /// Date in YYYY-MM-DD format
    pub date: Option<String>,
}

// --- Provider payload shapes ---

/// A date as the provider may list it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DateEntry {
    Bare(String),
    Object { date: String },
}

/// A slot as the provider may list it. Acuity itself sends `{time, slotsAvailable}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TimeEntry {
    Bare(String),
    Object {
        #[serde(alias = "time")]
        datetime: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DatesPayload {
    List(Vec<DateEntry>),
    Wrapped {
        #[serde(alias = "data")]
        dates: Vec<DateEntry>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TimesPayload {
    List(Vec<TimeEntry>),
    Wrapped {
        #[serde(alias = "data")]
        times: Vec<TimeEntry>,
    },
}

impl From<DateEntry> for String {
    fn from(entry: DateEntry) -> Self {
        match entry {
            DateEntry::Bare(date) | DateEntry::Object { date } => date,
        }
    }
}

impl From<TimeEntry> for String {
    fn from(entry: TimeEntry) -> Self {
        match entry {
            TimeEntry::Bare(datetime) | TimeEntry::Object { datetime } => datetime,
        }
    }
}

fn unexpected_shape(what: &str, err: serde_json::Error) -> PortalError {
    internal_error(format!("Unexpected {} payload from Acuity: {}", what, err))
}

/// Canonical available dates, in provider order, first occurrence kept.
///
/// Every listed date is available; a date the provider leaves out is not.
pub fn normalize_dates(payload: Value) -> Result<Vec<AvailabilityDate>, PortalError> {
    let decoded: Option<DatesPayload> =
        serde_json::from_value(payload).map_err(|e| unexpected_shape("dates", e))?;
    let entries = match decoded {
        None => Vec::new(),
        Some(DatesPayload::List(entries)) | Some(DatesPayload::Wrapped { dates: entries }) => {
            entries
        }
    };

    let mut seen = HashSet::new();
    Ok(entries
        .into_iter()
        .map(String::from)
        .filter(|date| seen.insert(date.clone()))
        .map(|date| AvailabilityDate {
            date,
            available: true,
        })
        .collect())
}

/// Canonical time slots, in provider order.
pub fn normalize_times(payload: Value) -> Result<Vec<TimeSlot>, PortalError> {
    let decoded: Option<TimesPayload> =
        serde_json::from_value(payload).map_err(|e| unexpected_shape("times", e))?;
    let entries = match decoded {
        None => Vec::new(),
        Some(TimesPayload::List(entries)) | Some(TimesPayload::Wrapped { times: entries }) => {
            entries
        }
    };
    Ok(entries
        .into_iter()
        .map(|entry| TimeSlot {
            datetime: String::from(entry),
        })
        .collect())
}

/// Finds the configured appointment type in the provider's list.
///
/// `Ok(None)` when the list has no entry with that id.
pub fn select_appointment_type(
    payload: Value,
    configured_id: &str,
) -> Result<Option<AppointmentType>, PortalError> {
    let Ok(wanted) = configured_id.parse::<i64>() else {
        return Ok(None);
    };
    let entries: Vec<Value> = match payload {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(internal_error(format!(
                "Unexpected appointment types payload from Acuity: {}",
                other
            )))
        }
    };

    entries
        .into_iter()
        .find(|entry| entry.get("id").and_then(Value::as_i64) == Some(wanted))
        .map(|entry| {
            serde_json::from_value::<AppointmentType>(entry)
                .map_err(|e| unexpected_shape("appointment type", e))
        })
        .transpose()
}

fn numeric_setting(value: &str, name: &str) -> Result<i64, PortalError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| config_error(format!("{} must be a number", name)))
}

/// Provider body for appointment creation; ids go out as integers.
pub fn provider_booking_body(
    req: &BookingRequest,
    appointment_type_id: &str,
    calendar_id: &str,
) -> Result<Value, PortalError> {
    let mut body = Map::new();
    body.insert("datetime".into(), json!(req.datetime));
    body.insert(
        "appointmentTypeID".into(),
        json!(numeric_setting(appointment_type_id, "ACUITY_APPOINTMENT_TYPE_ID")?),
    );
    body.insert(
        "calendarID".into(),
        json!(numeric_setting(calendar_id, "ACUITY_CALENDAR_ID")?),
    );
    body.insert("firstName".into(), json!(req.first_name));
    body.insert("lastName".into(), json!(req.last_name));
    body.insert("email".into(), json!(req.email));
    body.insert("phone".into(), json!(req.phone));
    body.insert("timezone".into(), json!(req.timezone));
    if let Some(notes) = req.notes.as_deref().filter(|n| !n.is_empty()) {
        body.insert("notes".into(), json!(notes));
    }
    Ok(Value::Object(body))
}

/// Provider body for `/availability/check-times`.
pub fn provider_check_body(
    datetime: &str,
    appointment_type_id: &str,
    calendar_id: &str,
) -> Result<Value, PortalError> {
    Ok(json!({
        "datetime": datetime,
        "appointmentTypeID": numeric_setting(appointment_type_id, "ACUITY_APPOINTMENT_TYPE_ID")?,
        "calendarID": numeric_setting(calendar_id, "ACUITY_CALENDAR_ID")?,
    }))
}

/// Reads the provider's verdict from a check-times answer (object or one-element list).
pub fn check_times_verdict(payload: &Value) -> bool {
    let record = match payload {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    record
        .and_then(|r| r.get("valid"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// An appointment record as the provider returns it.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderAppointment {
    pub id: i64,
    pub datetime: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub timezone: String,
    pub appointment_type_name: Option<String>,
    /// Acuity's own name for the appointment type.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub status: Option<String>,
}

impl ProviderAppointment {
    pub fn parse(payload: Value) -> Result<Self, PortalError> {
        serde_json::from_value(payload).map_err(|e| unexpected_shape("appointment", e))
    }

    pub fn into_confirmation(self) -> BookingConfirmation {
        BookingConfirmation {
            appointment_id: self.id,
            datetime: self.datetime,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            message: BOOKING_CONFIRMED_MESSAGE.to_string(),
        }
    }

    pub fn into_details(self) -> AppointmentDetails {
        AppointmentDetails {
            id: self.id,
            datetime: self.datetime,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            timezone: self.timezone,
            appointment_type_name: self.appointment_type_name.or(self.type_name),
            status: self.status,
        }
    }
}
