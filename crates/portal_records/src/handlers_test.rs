#[cfg(test)]
mod tests {
    use crate::memory::InMemoryRecordStore;
    use crate::routes::routes;
    use crate::store::{MockRecordStore, RecordStore, RecordStoreError};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use portal_config::AppConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(store: Arc<dyn RecordStore>) -> Router {
        routes(Arc::new(AppConfig::default()), store)
    }

    fn demo_app() -> Router {
        app_with(Arc::new(InMemoryRecordStore::seeded()))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn lists_demo_projects() {
        let (status, body) = call(demo_app(), get("/projects")).await;
        assert_eq!(status, StatusCode::OK);
        let projects = body.as_array().unwrap();
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0]["name"], "TechStart Ventures");
        assert_eq!(projects[0]["status"], "development");
        assert_eq!(projects[0]["startDate"], "2024-01-01");
        assert_eq!(projects[1].get("launchDate"), None);
        assert!(projects[0].get("timeline").is_none());
    }

    #[tokio::test]
    async fn project_detail_carries_timeline() {
        let (status, body) = call(demo_app(), get("/projects/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["websiteUrl"], "https://www.stripe.com");
        assert_eq!(
            body["timeline"][1],
            json!({"phase": "Development", "completed": true, "date": "2024-02-01"})
        );
        assert_eq!(
            body["timeline"][3],
            json!({"phase": "Launch", "completed": false})
        );
    }

    #[tokio::test]
    async fn unknown_project_is_404() {
        let (status, body) = call(demo_app(), get("/projects/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Project not found");
    }

    #[tokio::test]
    async fn submitted_change_is_listed() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::seeded());
        let (status, created) = call(
            app_with(store.clone()),
            json_request(
                "POST",
                "/changes",
                json!({
                    "projectId": "2",
                    "title": "Swap hero image",
                    "description": "Use the new brand photo",
                    "category": "design"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["priority"], "medium");
        assert_eq!(created["status"], "submitted");
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let (status, listed) = call(app_with(store), get("/changes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn change_without_title_is_rejected() {
        let (status, body) = call(
            demo_app(),
            json_request(
                "POST",
                "/changes",
                json!({"projectId": "1", "description": "d", "category": "bug"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn profile_update_ignores_empty_fields() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::seeded());
        let (status, body) = call(
            app_with(store.clone()),
            json_request(
                "PUT",
                "/account/profile",
                json!({"name": "", "company": "Launchpad LLC"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Demo User");
        assert_eq!(body["company"], "Launchpad LLC");

        let (_, profile) = call(app_with(store), get("/account/profile")).await;
        assert_eq!(profile["company"], "Launchpad LLC");
        assert_eq!(profile["email"], "demo@astrobot.design");
    }

    #[tokio::test]
    async fn subscription_is_professional() {
        let (status, body) = call(demo_app(), get("/account/subscription")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["plan"], "Professional");
        assert_eq!(body["status"], "active");
        assert!(body["renewalDate"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn missing_account_is_404() {
        let app = app_with(Arc::new(InMemoryRecordStore::empty()));
        let (status, body) = call(app, get("/account/profile")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Account not found");
    }

    #[tokio::test]
    async fn store_outage_is_reported() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch_projects()
            .times(1)
            .returning(|_| Err(RecordStoreError::Unavailable("connection refused".into())));
        let (status, body) = call(app_with(Arc::new(store)), get("/projects")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch projects");
        assert_eq!(body["message"], "connection refused");
    }
}
