// --- File: crates/portal_records/src/supabase.rs ---
use crate::models::{
    AccountProfile, ChangeCategory, ChangePriority, ChangeRequest, ChangeStatus, NewChangeRequest,
    ProfileUpdate, Project, ProjectDetail, ProjectStatus, SslStatus, Subscription,
    SubscriptionStatus, TimelinePhase,
};
use crate::store::{RecordStore, RecordStoreError};
use async_trait::async_trait;
use portal_common::models::string_or_number;
use portal_common::HTTP_CLIENT;
use portal_config::SupabaseConfig;
use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

/// Record store backed by the Supabase PostgREST interface.
///
/// Tables: `projects`, `project_timeline`, `change_requests`, `accounts`,
/// `subscriptions`. Columns are snake_case.
#[derive(Clone)]
pub struct SupabaseRecordStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl std::fmt::Debug for SupabaseRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseRecordStore")
            .field("base_url", &self.base_url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    name: String,
    status: ProjectStatus,
    #[serde(default)]
    progress: u8,
    #[serde(default)]
    description: String,
    start_date: String,
    #[serde(default)]
    launch_date: Option<String>,
    user_id: String,
    #[serde(default)]
    website_url: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    ssl_status: Option<SslStatus>,
    #[serde(default)]
    uptime: Option<f64>,
    #[serde(default)]
    page_load_time: Option<u32>,
    #[serde(default)]
    hosting_region: Option<String>,
}

impl ProjectRow {
    fn into_project(self) -> Project {
        Project {
            id: self.id.unwrap_or_default(),
            name: self.name,
            status: self.status,
            progress: self.progress.min(100),
            description: self.description,
            start_date: self.start_date,
            launch_date: self.launch_date,
            user_id: self.user_id,
            website_url: self.website_url,
        }
    }

    fn into_detail(mut self, timeline: Vec<TimelinePhase>) -> ProjectDetail {
        let domain = self.domain.take();
        let hosting_region = self.hosting_region.take();
        let (ssl_status, uptime, page_load_time) =
            (self.ssl_status, self.uptime, self.page_load_time);
        ProjectDetail {
            project: self.into_project(),
            domain,
            ssl_status,
            uptime,
            page_load_time,
            hosting_region,
            timeline,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelineRow {
    phase: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChangeRequestRow {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    project_id: Option<String>,
    title: String,
    description: String,
    category: ChangeCategory,
    #[serde(default)]
    priority: ChangePriority,
    #[serde(default)]
    status: ChangeStatus,
    created_at: String,
    updated_at: String,
}

impl From<ChangeRequestRow> for ChangeRequest {
    fn from(row: ChangeRequestRow) -> Self {
        ChangeRequest {
            id: row.id.unwrap_or_default(),
            project_id: row.project_id.unwrap_or_default(),
            title: row.title,
            description: row.description,
            category: row.category,
            priority: row.priority,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChangeRequestInsert<'a> {
    project_id: &'a str,
    title: &'a str,
    description: &'a str,
    category: ChangeCategory,
    priority: ChangePriority,
    status: ChangeStatus,
}

#[derive(Debug, Deserialize)]
struct SubscriptionRow {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    plan: String,
    status: SubscriptionStatus,
    renewal_date: String,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id.unwrap_or_default(),
            plan: row.plan,
            status: row.status,
            renewal_date: row.renewal_date,
        }
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl SupabaseRecordStore {
    /// Returns `None` when the URL or service key is missing.
    pub fn new(config: &SupabaseConfig) -> Option<Self> {
        Self::with_client(config, HTTP_CLIENT.clone())
    }

    pub fn with_client(config: &SupabaseConfig, client: Client) -> Option<Self> {
        let service_key = config.service_key()?.to_string();
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return None;
        }
        Some(Self {
            client,
            base_url,
            service_key,
        })
    }

    fn headers(&self) -> Result<HeaderMap, RecordStoreError> {
        let invalid = |_: InvalidHeaderValue| {
            RecordStoreError::Unavailable("Invalid Supabase service key".into())
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.service_key).map_err(invalid)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key)).map_err(invalid)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Sends one PostgREST request against `/rest/v1/<table>`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, RecordStoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        debug!("Supabase {} {}", method, url);

        let mut req = self
            .client
            .request(method.clone(), &url)
            .headers(self.headers()?)
            .query(query);
        if let Some(body) = body {
            // Writes echo the affected rows back.
            req = req.header("Prefer", "return=representation").json(&body);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(table, status = status.as_u16(), "Supabase error: {}", text);
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(match status.as_u16() {
                404 => RecordStoreError::NotFound(message),
                code => RecordStoreError::Upstream {
                    status_code: code,
                    message,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RecordStoreError::Decode(e.to_string()))
    }

    async fn first<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Option<T>, RecordStoreError> {
        let rows: Vec<T> = self.request(method, table, query, body).await?;
        Ok(rows.into_iter().next())
    }

    async fn account_row(&self, user_id: &str) -> Result<Option<AccountProfile>, RecordStoreError> {
        self.first(
            Method::GET,
            "accounts",
            &[("id", eq(user_id)), ("select", "id,name,email,company".into())],
            None,
        )
        .await
    }
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn fetch_projects(&self, user_id: &str) -> Result<Vec<Project>, RecordStoreError> {
        let rows: Vec<ProjectRow> = self
            .request(
                Method::GET,
                "projects",
                &[
                    ("user_id", eq(user_id)),
                    ("select", "*".into()),
                    ("order", "start_date.desc".into()),
                ],
                None,
            )
            .await?;
        Ok(rows.into_iter().map(ProjectRow::into_project).collect())
    }

    async fn fetch_project_by_id(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectDetail>, RecordStoreError> {
        let Some(row) = self
            .first::<ProjectRow>(
                Method::GET,
                "projects",
                &[("id", eq(project_id)), ("select", "*".into())],
                None,
            )
            .await?
        else {
            return Ok(None);
        };

        let phases: Vec<TimelineRow> = self
            .request(
                Method::GET,
                "project_timeline",
                &[
                    ("project_id", eq(project_id)),
                    ("select", "phase,completed,date".into()),
                    ("order", "position.asc".into()),
                ],
                None,
            )
            .await?;
        let timeline = phases
            .into_iter()
            .map(|p| TimelinePhase {
                phase: p.phase,
                completed: p.completed,
                date: p.date,
            })
            .collect();

        Ok(Some(row.into_detail(timeline)))
    }

    async fn submit_change_request(
        &self,
        request: NewChangeRequest,
    ) -> Result<ChangeRequest, RecordStoreError> {
        let insert = ChangeRequestInsert {
            project_id: &request.project_id,
            title: &request.title,
            description: &request.description,
            category: request.category,
            priority: request.priority,
            status: ChangeStatus::Submitted,
        };
        let body = serde_json::to_value(&insert)
            .map_err(|e| RecordStoreError::Decode(e.to_string()))?;
        let created: Option<ChangeRequestRow> = self
            .first(Method::POST, "change_requests", &[], Some(body))
            .await?;
        created
            .map(ChangeRequest::from)
            .ok_or_else(|| RecordStoreError::Decode("Insert returned no row".into()))
    }

    async fn fetch_change_requests(&self) -> Result<Vec<ChangeRequest>, RecordStoreError> {
        let rows: Vec<ChangeRequestRow> = self
            .request(
                Method::GET,
                "change_requests",
                &[("select", "*".into()), ("order", "created_at.desc".into())],
                None,
            )
            .await?;
        Ok(rows.into_iter().map(ChangeRequest::from).collect())
    }

    async fn fetch_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<AccountProfile>, RecordStoreError> {
        self.account_row(user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<AccountProfile>, RecordStoreError> {
        let update = update.normalized();
        if update.is_empty() {
            return self.account_row(user_id).await;
        }
        let body = json!(update);
        self.first(
            Method::PATCH,
            "accounts",
            &[("id", eq(user_id)), ("select", "id,name,email,company".into())],
            Some(body),
        )
        .await
    }

    async fn fetch_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, RecordStoreError> {
        let row: Option<SubscriptionRow> = self
            .first(
                Method::GET,
                "subscriptions",
                &[
                    ("user_id", eq(user_id)),
                    ("select", "id,plan,status,renewal_date".into()),
                    ("limit", "1".into()),
                ],
                None,
            )
            .await?;
        Ok(row.map(Subscription::from))
    }
}
