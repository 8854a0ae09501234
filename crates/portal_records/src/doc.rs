// File: crates/portal_records/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::models::{
    AccountProfile, ChangeCategory, ChangePriority, ChangeRequest, ChangeRequestInput,
    ChangeStatus, ProfileUpdate, Project, ProjectDetail, ProjectStatus, SslStatus, Subscription,
    SubscriptionStatus, TimelinePhase,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_projects_handler,
        crate::handlers::project_detail_handler,
        crate::handlers::submit_change_handler,
        crate::handlers::list_changes_handler,
        crate::handlers::get_profile_handler,
        crate::handlers::update_profile_handler,
        crate::handlers::subscription_handler
    ),
    components(
        schemas(
            Project,
            ProjectStatus,
            ProjectDetail,
            SslStatus,
            TimelinePhase,
            ChangeRequest,
            ChangeRequestInput,
            ChangeCategory,
            ChangePriority,
            ChangeStatus,
            AccountProfile,
            ProfileUpdate,
            Subscription,
            SubscriptionStatus
        )
    ),
    tags(
        (name = "Records", description = "Projects, change requests and account")
    ),
    servers(
        (url = "/api", description = "Portal API server")
    )
)]
pub struct RecordsApiDoc;
