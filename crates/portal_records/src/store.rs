// --- File: crates/portal_records/src/store.rs ---
use crate::models::{
    AccountProfile, ChangeCategory, ChangePriority, ChangeRequest, ChangeRequestInput,
    NewChangeRequest, ProfileUpdate, Project, ProjectDetail, Subscription,
};
use async_trait::async_trait;
use portal_common::{HttpStatusCode, PortalError};
use thiserror::Error;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordStoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// The backing database could not be reached.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// The backing database answered with a failure status.
    #[error("Record store error: {status_code} - {message}")]
    Upstream { status_code: u16, message: String },

    #[error("Unexpected record data: {0}")]
    Decode(String),
}

impl HttpStatusCode for RecordStoreError {
    fn status_code(&self) -> u16 {
        match self {
            RecordStoreError::Validation(_) => 400,
            RecordStoreError::NotFound(_) => 404,
            RecordStoreError::Unavailable(_) => 503,
            RecordStoreError::Upstream { .. } | RecordStoreError::Decode(_) => 500,
        }
    }
}

impl From<RecordStoreError> for PortalError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::Validation(m) => PortalError::ValidationError(m),
            RecordStoreError::NotFound(m) => PortalError::NotFoundError(m),
            RecordStoreError::Unavailable(m) => PortalError::TransientError(m),
            RecordStoreError::Upstream { message, .. } => PortalError::ExternalServiceError {
                status_code: 500,
                message,
            },
            RecordStoreError::Decode(m) => PortalError::InternalError(m),
        }
    }
}

impl From<reqwest::Error> for RecordStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RecordStoreError::Decode(err.to_string())
        } else {
            RecordStoreError::Unavailable(err.to_string())
        }
    }
}

/// Persistence of projects, change requests and accounts.
///
/// `Ok(None)` means the record does not exist; errors are reserved for the
/// store itself failing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn fetch_projects(&self, user_id: &str) -> Result<Vec<Project>, RecordStoreError>;

    async fn fetch_project_by_id(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectDetail>, RecordStoreError>;

    async fn submit_change_request(
        &self,
        request: NewChangeRequest,
    ) -> Result<ChangeRequest, RecordStoreError>;

    /// All change requests, newest first.
    async fn fetch_change_requests(&self) -> Result<Vec<ChangeRequest>, RecordStoreError>;

    async fn fetch_profile(&self, user_id: &str)
        -> Result<Option<AccountProfile>, RecordStoreError>;

    async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<AccountProfile>, RecordStoreError>;

    async fn fetch_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, RecordStoreError>;
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Checks a change request body. The four required fields must be present
/// and non-empty; priority defaults to medium.
pub fn validate_change_request(
    input: ChangeRequestInput,
) -> Result<NewChangeRequest, RecordStoreError> {
    let missing = || RecordStoreError::Validation(MISSING_FIELDS_MESSAGE.to_string());
    let project_id = required(input.project_id).ok_or_else(missing)?;
    let title = required(input.title).ok_or_else(missing)?;
    let description = required(input.description).ok_or_else(missing)?;
    let category = required(input.category).ok_or_else(missing)?;

    let category = parse_lowercase::<ChangeCategory>(&category)
        .ok_or_else(|| RecordStoreError::Validation(format!("Unknown category: {}", category)))?;
    let priority = match required(input.priority) {
        None => ChangePriority::default(),
        Some(p) => parse_lowercase::<ChangePriority>(&p)
            .ok_or_else(|| RecordStoreError::Validation(format!("Unknown priority: {}", p)))?,
    };

    Ok(NewChangeRequest {
        project_id,
        title,
        description,
        category,
        priority,
    })
}

fn parse_lowercase<T: serde::de::DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(category: &str, priority: Option<&str>) -> ChangeRequestInput {
        ChangeRequestInput {
            project_id: Some("1".into()),
            title: Some("Update hero copy".into()),
            description: Some("New tagline on the homepage".into()),
            category: Some(category.into()),
            priority: priority.map(str::to_string),
        }
    }

    #[test]
    fn priority_defaults_to_medium() {
        let valid = validate_change_request(input("content", None)).unwrap();
        assert_eq!(valid.priority, ChangePriority::Medium);
        assert_eq!(valid.category, ChangeCategory::Content);

        let valid = validate_change_request(input("Bug", Some("HIGH"))).unwrap();
        assert_eq!(valid.priority, ChangePriority::High);
        assert_eq!(valid.category, ChangeCategory::Bug);
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let mut body = input("design", None);
        body.title = Some("   ".into());
        assert_eq!(
            validate_change_request(body).unwrap_err(),
            RecordStoreError::Validation(MISSING_FIELDS_MESSAGE.into())
        );
        assert_eq!(
            validate_change_request(ChangeRequestInput::default())
                .unwrap_err()
                .status_code(),
            400
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = validate_change_request(input("marketing", None)).unwrap_err();
        assert_eq!(err.to_string(), "Unknown category: marketing");
    }

    #[test]
    fn store_errors_map_to_portal_errors() {
        let err: PortalError = RecordStoreError::NotFound("project 9".into()).into();
        assert_eq!(err.status_code(), 404);
        let err: PortalError = RecordStoreError::Unavailable("refused".into()).into();
        assert!(matches!(err, PortalError::TransientError(_)));
    }
}
