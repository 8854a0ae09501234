// --- File: crates/portal_records/src/routes.rs ---

use crate::handlers::{
    get_profile_handler, list_changes_handler, list_projects_handler, project_detail_handler,
    submit_change_handler, subscription_handler, update_profile_handler, RecordsState,
};
use crate::store::RecordStore;
use axum::{routing::get, Router};
use portal_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing the project, change and account routes, relative to `/api`.
pub fn routes(config: Arc<AppConfig>, store: Arc<dyn RecordStore>) -> Router {
    let state = Arc::new(RecordsState { config, store });

    Router::new()
        .route("/projects", get(list_projects_handler))
        .route("/projects/{id}", get(project_detail_handler))
        .route(
            "/changes",
            get(list_changes_handler).post(submit_change_handler),
        )
        .route(
            "/account/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/account/subscription", get(subscription_handler))
        .with_state(state)
}
