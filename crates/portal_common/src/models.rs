// --- File: crates/portal_common/src/models.rs ---
//! Wire types shared by the booking endpoints and the booking client.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Confirmation text returned with every successful booking.
pub const BOOKING_CONFIRMED_MESSAGE: &str =
    "Your appointment has been scheduled successfully. A confirmation email will be sent to you shortly.";

/// Accepts a JSON string or number and yields its text form.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A service offering configured at the provider.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentType {
    pub id: i64,
    pub name: String,
    /// Minutes.
    pub duration: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityDate {
    /// YYYY-MM-DD
    pub date: String,
    pub available: bool,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AvailabilityDatesResponse {
    pub dates: Vec<AvailabilityDate>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    /// ISO-8601 timestamp with offset, as the provider reports it.
    pub datetime: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AvailabilityTimesResponse {
    pub times: Vec<TimeSlot>,
}

/// Body of `POST /api/booking/appointments`.
///
/// Missing fields deserialize as empty so that validation, not JSON
/// decoding, reports them.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub appointment_id: i64,
    pub datetime: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    pub id: i64,
    pub datetime: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub timezone: String,
    pub appointment_type_name: Option<String>,
    pub status: Option<String>,
}

/// Body of `POST /api/booking/check-availability`.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CheckAvailabilityRequest {
    #[serde(default)]
    pub datetime: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

/// Error body of every endpoint.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub error: String,
    pub message: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_request_uses_camel_case_and_omits_empty_notes() {
        let req = BookingRequest {
            datetime: "2024-03-05T09:00:00-0600".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5551234567".into(),
            timezone: "America/Chicago".into(),
            notes: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["firstName"], "Ada");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn missing_booking_fields_become_empty() {
        let req: BookingRequest = serde_json::from_value(json!({"email": "a@b.co"})).unwrap();
        assert_eq!(req.first_name, "");
        assert_eq!(req.email, "a@b.co");
    }

    #[test]
    fn appointment_type_price_accepts_string_or_number() {
        let from_string: AppointmentType = serde_json::from_value(
            json!({"id": 1, "name": "Design", "duration": 60, "price": "150.00"}),
        )
        .unwrap();
        let from_number: AppointmentType =
            serde_json::from_value(json!({"id": 1, "name": "Design", "duration": 60, "price": 150}))
                .unwrap();
        assert_eq!(from_string.price.as_deref(), Some("150.00"));
        assert_eq!(from_number.price.as_deref(), Some("150"));
        assert_eq!(from_number.description, None);
    }
}
