// File: crates/portal_records/src/handlers.rs
use crate::models::{
    AccountProfile, ChangeRequest, ChangeRequestInput, ProfileUpdate, Project, ProjectDetail,
    Subscription,
};
use crate::store::{
    validate_change_request, RecordStore, RecordStoreError, MISSING_FIELDS_MESSAGE,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use portal_common::{ApiFailure, PortalError};
use portal_config::AppConfig;
use std::sync::Arc;
use tracing::info;

// Shared state of the record handlers
#[derive(Clone)]
pub struct RecordsState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
}

impl RecordsState {
    /// The account the portal acts for.
    fn user_id(&self) -> &str {
        &self.config.records.default_user_id
    }
}

fn store_failure(err: RecordStoreError, title: &str) -> ApiFailure {
    ApiFailure::from(PortalError::from(err)).with_error(title)
}

fn account_not_found() -> ApiFailure {
    ApiFailure::new(404, "Account not found", "No account matches the portal user")
}

/// Handler to list the projects of the portal user.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/projects",
    responses(
        (status = 200, description = "Projects of the portal user", body = [Project]),
        (status = 500, description = "Record store failure", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Records"
))]
pub async fn list_projects_handler(
    State(state): State<Arc<RecordsState>>,
) -> Result<Json<Vec<Project>>, ApiFailure> {
    let projects = state
        .store
        .fetch_projects(state.user_id())
        .await
        .map_err(|e| store_failure(e, "Failed to fetch projects"))?;
    Ok(Json(projects))
}

/// Handler to get one project with its timeline.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetail),
        (status = 404, description = "Unknown project", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Records"
))]
pub async fn project_detail_handler(
    State(state): State<Arc<RecordsState>>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectDetail>, ApiFailure> {
    let found = state
        .store
        .fetch_project_by_id(&project_id)
        .await
        .map_err(|e| store_failure(e, "Failed to fetch project"))?;
    found.map(Json).ok_or_else(|| {
        ApiFailure::new(
            404,
            "Project not found",
            format!("No project with id {}", project_id),
        )
    })
}

/// Handler to submit a change request.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/changes",
    request_body = ChangeRequestInput,
    responses(
        (status = 201, description = "Change request stored", body = ChangeRequest),
        (status = 400, description = "Missing required fields", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Records"
))]
pub async fn submit_change_handler(
    State(state): State<Arc<RecordsState>>,
    payload: Result<Json<ChangeRequestInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ChangeRequest>), ApiFailure> {
    let Json(input) = payload.map_err(|rejection| {
        ApiFailure::new(400, MISSING_FIELDS_MESSAGE, rejection.body_text())
    })?;

    let request = validate_change_request(input).map_err(|e| match e {
        RecordStoreError::Validation(message) if message == MISSING_FIELDS_MESSAGE => {
            ApiFailure::new(
                400,
                MISSING_FIELDS_MESSAGE,
                "projectId, title, description and category are required",
            )
        }
        other => store_failure(other, "Invalid change request"),
    })?;

    let created = state
        .store
        .submit_change_request(request)
        .await
        .map_err(|e| store_failure(e, "Failed to submit change request"))?;
    info!(
        "Change request {} submitted for project {}",
        created.id, created.project_id
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler to list change requests, newest first.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/changes",
    responses(
        (status = 200, description = "Change requests", body = [ChangeRequest])
    ),
    tag = "Records"
))]
pub async fn list_changes_handler(
    State(state): State<Arc<RecordsState>>,
) -> Result<Json<Vec<ChangeRequest>>, ApiFailure> {
    let changes = state
        .store
        .fetch_change_requests()
        .await
        .map_err(|e| store_failure(e, "Failed to fetch change requests"))?;
    Ok(Json(changes))
}

/// Handler to get the portal user's profile.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/account/profile",
    responses(
        (status = 200, description = "Account profile", body = AccountProfile),
        (status = 404, description = "No such account", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Records"
))]
pub async fn get_profile_handler(
    State(state): State<Arc<RecordsState>>,
) -> Result<Json<AccountProfile>, ApiFailure> {
    state
        .store
        .fetch_profile(state.user_id())
        .await
        .map_err(|e| store_failure(e, "Failed to fetch profile"))?
        .map(Json)
        .ok_or_else(account_not_found)
}

/// Handler to update the portal user's profile. Empty fields are ignored.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/account/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = AccountProfile),
        (status = 400, description = "Unreadable body", body = portal_common::models::ApiErrorBody),
        (status = 404, description = "No such account", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Records"
))]
pub async fn update_profile_handler(
    State(state): State<Arc<RecordsState>>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<AccountProfile>, ApiFailure> {
    let Json(update) = payload.map_err(|rejection| {
        ApiFailure::new(400, "Invalid profile update", rejection.body_text())
    })?;

    state
        .store
        .update_profile(state.user_id(), update)
        .await
        .map_err(|e| store_failure(e, "Failed to update profile"))?
        .map(Json)
        .ok_or_else(account_not_found)
}

/// Handler to get the portal user's subscription.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/account/subscription",
    responses(
        (status = 200, description = "Subscription", body = Subscription),
        (status = 404, description = "No subscription", body = portal_common::models::ApiErrorBody)
    ),
    tag = "Records"
))]
pub async fn subscription_handler(
    State(state): State<Arc<RecordsState>>,
) -> Result<Json<Subscription>, ApiFailure> {
    state
        .store
        .fetch_subscription(state.user_id())
        .await
        .map_err(|e| store_failure(e, "Failed to fetch subscription"))?
        .map(Json)
        .ok_or_else(|| {
            ApiFailure::new(404, "Subscription not found", "The account has no subscription")
        })
}
