// --- File: crates/portal_common/src/validation.rs ---
//! Input rules shared by the booking endpoints and the contact form.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{validation_error, PortalError};
use crate::models::BookingRequest;

pub const MONTH_FORMAT_MESSAGE: &str = "Month must be YYYY-MM format";
pub const DATE_FORMAT_MESSAGE: &str = "Date must be YYYY-MM-DD format";
pub const DATETIME_FORMAT_MESSAGE: &str = "Invalid datetime format";
pub const FIRST_NAME_MESSAGE: &str = "First name is required";
pub const LAST_NAME_MESSAGE: &str = "Last name is required";
pub const EMAIL_MESSAGE: &str = "Invalid email address";
pub const PHONE_MESSAGE: &str = "Phone must be at least 10 digits";
pub const TIMEZONE_MESSAGE: &str = "Timezone is required";
pub const APPOINTMENT_ID_MESSAGE: &str = "Appointment ID must be a number";

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10,}$").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_'+\-.]*[a-zA-Z0-9_+\-]@([a-zA-Z0-9][a-zA-Z0-9\-]*\.)+[a-zA-Z]{2,}$")
        .unwrap()
});

pub fn validate_month(month: &str) -> Result<(), PortalError> {
    if MONTH_RE.is_match(month) {
        Ok(())
    } else {
        Err(validation_error(MONTH_FORMAT_MESSAGE))
    }
}

pub fn validate_date(date: &str) -> Result<(), PortalError> {
    if DATE_RE.is_match(date) {
        Ok(())
    } else {
        Err(validation_error(DATE_FORMAT_MESSAGE))
    }
}

/// ISO-8601 with a zone: `2024-03-05T09:00:00Z`, `...-06:00` or the
/// provider's `...-0600`.
pub fn is_iso_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z").is_ok()
        || DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z").is_ok()
}

pub fn validate_datetime(value: &str) -> Result<(), PortalError> {
    if is_iso_datetime(value) {
        Ok(())
    } else {
        Err(validation_error(DATETIME_FORMAT_MESSAGE))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254
        && !email.starts_with('.')
        && !email.contains("..")
        && EMAIL_RE.is_match(email)
}

/// Ten or more digits and nothing else.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Checks that an appointment id is a plain digit string. Its length is not
/// bounded; the provider decides whether it exists.
pub fn validate_appointment_id(id: &str) -> Result<&str, PortalError> {
    if DIGITS_RE.is_match(id) {
        Ok(id)
    } else {
        Err(validation_error(APPOINTMENT_ID_MESSAGE))
    }
}

/// Contact fields in form order; the first failure wins.
pub fn validate_contact(
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: &str,
) -> Result<(), PortalError> {
    if first_name.is_empty() {
        return Err(validation_error(FIRST_NAME_MESSAGE));
    }
    if last_name.is_empty() {
        return Err(validation_error(LAST_NAME_MESSAGE));
    }
    if !is_valid_email(email) {
        return Err(validation_error(EMAIL_MESSAGE));
    }
    if !is_valid_phone(phone) {
        return Err(validation_error(PHONE_MESSAGE));
    }
    Ok(())
}

/// Full booking check, reporting the first failing field.
pub fn validate_booking_request(req: &BookingRequest) -> Result<(), PortalError> {
    validate_datetime(&req.datetime)?;
    validate_contact(&req.first_name, &req.last_name, &req.email, &req.phone)?;
    if req.timezone.is_empty() {
        return Err(validation_error(TIMEZONE_MESSAGE));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_request() -> BookingRequest {
        BookingRequest {
            datetime: "2024-03-05T09:00:00-0600".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5551234567".into(),
            timezone: "America/Chicago".into(),
            notes: Some("Bring sketches".into()),
        }
    }

    #[test]
    fn month_and_date_formats() {
        assert!(validate_month("2024-03").is_ok());
        for bad in ["2024-1", "abcd-ef", "2024-03-01", "", "24-03"] {
            assert_eq!(
                validate_month(bad).unwrap_err().message(),
                MONTH_FORMAT_MESSAGE
            );
        }
        assert!(validate_date("2024-03-05").is_ok());
        assert!(validate_date("2024-3-5").is_err());
    }

    #[test]
    fn datetime_accepts_provider_and_rfc3339_forms() {
        assert!(is_iso_datetime("2024-03-05T09:00:00-0600"));
        assert!(is_iso_datetime("2024-03-05T09:00:00-06:00"));
        assert!(is_iso_datetime("2024-03-05T15:00:00Z"));
        assert!(is_iso_datetime("2024-03-05T15:00:00.000Z"));
        assert!(!is_iso_datetime("2024-03-05 09:00"));
        assert!(!is_iso_datetime("2024-03-05"));
    }

    #[test]
    fn booking_request_reports_first_failure() {
        assert!(validate_booking_request(&valid_request()).is_ok());

        let mut req = valid_request();
        req.phone = "555-1234".into();
        req.email = "not-an-email".into();
        assert_eq!(
            validate_booking_request(&req).unwrap_err().message(),
            EMAIL_MESSAGE
        );

        let mut req = valid_request();
        req.phone = "555-1234".into();
        assert_eq!(
            validate_booking_request(&req).unwrap_err().message(),
            PHONE_MESSAGE
        );

        let mut req = valid_request();
        req.timezone.clear();
        assert_eq!(
            validate_booking_request(&req).unwrap_err().message(),
            TIMEZONE_MESSAGE
        );
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("demo@astrobot.design"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email(".lead@example.com"));
        assert!(!is_valid_email("a..b@example.com"));
        assert!(!is_valid_email("user@localhost"));
    }

    #[test]
    fn appointment_ids_are_digits_only() {
        assert_eq!(validate_appointment_id("12345").unwrap(), "12345");
        assert_eq!(
            validate_appointment_id("99999999999999999999999").unwrap(),
            "99999999999999999999999"
        );
        for bad in ["12a", "-1", "", "1.0", " 42"] {
            assert_eq!(
                validate_appointment_id(bad).unwrap_err().message(),
                APPOINTMENT_ID_MESSAGE
            );
        }
    }

    proptest! {
        #[test]
        fn short_phones_are_rejected(digits in "[0-9]{0,9}") {
            prop_assert!(!is_valid_phone(&digits));
        }

        #[test]
        fn phones_with_formatting_are_rejected(
            head in "[0-9]{3,6}",
            sep in "[- ().+]",
            tail in "[0-9]{4,8}",
        ) {
            let phone = format!("{}{}{}", head, sep, tail);
            prop_assert!(!is_valid_phone(&phone));
        }

        #[test]
        fn long_digit_strings_are_valid_phones(digits in "[0-9]{10,15}") {
            prop_assert!(is_valid_phone(&digits));
        }

        #[test]
        fn well_formed_months_pass(year in 1000u32..9999, month in 1u32..=12) {
            let formatted = format!("{:04}-{:02}", year, month);
            prop_assert!(validate_month(&formatted).is_ok());
        }
    }
}
