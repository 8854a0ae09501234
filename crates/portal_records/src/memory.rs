// --- File: crates/portal_records/src/memory.rs ---
use crate::models::{
    AccountProfile, ChangeRequest, ChangeStatus, NewChangeRequest, ProfileUpdate, Project,
    ProjectDetail, ProjectStatus, Subscription, SubscriptionStatus, TimelinePhase,
};
use crate::store::{RecordStore, RecordStoreError};
use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use portal_config::DEFAULT_RECORDS_USER_ID;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local record store used when no database is configured.
///
/// Projects are fixed; change requests and profile edits live until restart.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    projects: Vec<ProjectDetail>,
    changes: RwLock<Vec<ChangeRequest>>,
    profiles: RwLock<HashMap<String, AccountProfile>>,
    subscriptions: HashMap<String, Subscription>,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn phase(name: &str, date: Option<&str>) -> TimelinePhase {
    TimelinePhase {
        phase: name.to_string(),
        completed: date.is_some(),
        date: date.map(str::to_string),
    }
}

#[allow(clippy::too_many_arguments)]
fn project(
    id: &str,
    name: &str,
    status: ProjectStatus,
    progress: u8,
    description: &str,
    start_date: &str,
    launch_date: Option<&str>,
    website_url: &str,
    timeline: Vec<TimelinePhase>,
) -> ProjectDetail {
    ProjectDetail {
        project: Project {
            id: id.to_string(),
            name: name.to_string(),
            status,
            progress,
            description: description.to_string(),
            start_date: start_date.to_string(),
            launch_date: launch_date.map(str::to_string),
            user_id: DEFAULT_RECORDS_USER_ID.to_string(),
            website_url: Some(website_url.to_string()),
        },
        domain: None,
        ssl_status: None,
        uptime: None,
        page_load_time: None,
        hosting_region: None,
        timeline,
    }
}

impl InMemoryRecordStore {
    /// An empty store: no projects, accounts or subscriptions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The demo portfolio: three projects and one account on the Professional plan.
    pub fn seeded() -> Self {
        let projects = vec![
            project(
                "1",
                "TechStart Ventures",
                ProjectStatus::Development,
                65,
                "A modern marketing website for a tech startup",
                "2024-01-01",
                Some("2024-02-15"),
                "https://www.stripe.com",
                vec![
                    phase("Design Phase", Some("2024-01-15")),
                    phase("Development", Some("2024-02-01")),
                    phase("Review & Testing", None),
                    phase("Launch", None),
                ],
            ),
            project(
                "2",
                "Digital Design Co",
                ProjectStatus::Design,
                30,
                "Portfolio website for a design agency",
                "2024-01-10",
                None,
                "https://www.dribbble.com",
                vec![
                    phase("Discovery & Planning", Some("2024-01-10")),
                    phase("Design Phase", None),
                    phase("Development", None),
                    phase("Launch", None),
                ],
            ),
            project(
                "3",
                "E-Commerce Plus",
                ProjectStatus::Review,
                90,
                "Full e-commerce platform for online retail",
                "2023-11-01",
                Some("2024-01-20"),
                "https://www.shopify.com",
                vec![
                    phase("Design Phase", Some("2023-11-15")),
                    phase("Development", Some("2023-12-15")),
                    phase("Review & Testing", Some("2024-01-10")),
                    phase("Launch", None),
                ],
            ),
        ];

        let profile = AccountProfile {
            id: DEFAULT_RECORDS_USER_ID.to_string(),
            name: "Demo User".to_string(),
            email: DEFAULT_RECORDS_USER_ID.to_string(),
            company: Some("Tech Ventures".to_string()),
        };
        let subscription = Subscription {
            id: "sub-001".to_string(),
            plan: "Professional".to_string(),
            status: SubscriptionStatus::Active,
            renewal_date: (Utc::now() + Duration::days(30))
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        Self {
            projects,
            changes: RwLock::new(Vec::new()),
            profiles: RwLock::new(HashMap::from([(profile.id.clone(), profile)])),
            subscriptions: HashMap::from([(DEFAULT_RECORDS_USER_ID.to_string(), subscription)]),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_projects(&self, user_id: &str) -> Result<Vec<Project>, RecordStoreError> {
        Ok(self
            .projects
            .iter()
            .filter(|p| p.project.user_id == user_id)
            .map(|p| p.project.clone())
            .collect())
    }

    async fn fetch_project_by_id(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectDetail>, RecordStoreError> {
        Ok(self
            .projects
            .iter()
            .find(|p| p.project.id == project_id)
            .cloned())
    }

    async fn submit_change_request(
        &self,
        request: NewChangeRequest,
    ) -> Result<ChangeRequest, RecordStoreError> {
        let now = now_iso();
        let change = ChangeRequest {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: request.project_id,
            title: request.title,
            description: request.description,
            category: request.category,
            priority: request.priority,
            status: ChangeStatus::Submitted,
            created_at: now.clone(),
            updated_at: now,
        };
        self.changes.write().await.push(change.clone());
        debug!("Stored change request {} in memory", change.id);
        Ok(change)
    }

    async fn fetch_change_requests(&self) -> Result<Vec<ChangeRequest>, RecordStoreError> {
        // Appended in submission order
        Ok(self.changes.read().await.iter().rev().cloned().collect())
    }

    async fn fetch_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<AccountProfile>, RecordStoreError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<AccountProfile>, RecordStoreError> {
        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.get_mut(user_id) else {
            return Ok(None);
        };
        update.normalized().apply_to(profile);
        Ok(Some(profile.clone()))
    }

    async fn fetch_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, RecordStoreError> {
        Ok(self.subscriptions.get(user_id).cloned())
    }
}
