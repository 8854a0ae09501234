// --- File: crates/portal_booking_flow/src/api_log.rs ---
//! Session log of outbound API calls, backing the booking debug panel.
//!
//! One `ApiLog` is created by the composition root and cloned into every
//! component that issues requests. Observers registered with
//! [`ApiLog::subscribe`] receive the full snapshot after every change.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiLogEntry {
    pub id: String,
    /// Dispatch time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds from dispatch to settle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    pub completed: bool,
}

pub type Listener = Arc<dyn Fn(&[ApiLogEntry]) + Send + Sync>;

/// Handle returned by [`ApiLog::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
    entries: Vec<ApiLogEntry>,
    listeners: BTreeMap<SubscriptionId, Listener>,
    next_listener: u64,
}

#[derive(Clone, Default)]
pub struct ApiLog {
    inner: Arc<RwLock<Inner>>,
}

impl std::fmt::Debug for ApiLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiLog")
            .field("entries", &self.entries().len())
            .finish()
    }
}

impl ApiLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an observer. It is not called until the next change.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&[ApiLogEntry]) + Send + Sync + 'static,
    {
        let mut inner = self.write();
        let id = SubscriptionId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.insert(id, Arc::new(listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.write().listeners.remove(&id).is_some()
    }

    /// Current snapshot, oldest first.
    pub fn entries(&self) -> Vec<ApiLogEntry> {
        self.read().entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<ApiLogEntry> {
        self.read().entries.iter().find(|e| e.id == id).cloned()
    }

    // Listeners run outside the lock so they may read the log again.
    fn notify(&self) {
        let (snapshot, listeners): (Vec<ApiLogEntry>, Vec<Listener>) = {
            let inner = self.read();
            (
                inner.entries.clone(),
                inner.listeners.values().cloned().collect(),
            )
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Records a dispatched request and returns its entry id.
    pub fn log_request(&self, method: &str, url: &str, request_body: Option<Value>) -> String {
        let now = Utc::now().timestamp_millis();
        let id = format!("{}-{}", now, uuid::Uuid::new_v4().simple());
        self.write().entries.push(ApiLogEntry {
            id: id.clone(),
            timestamp: now,
            method: method.to_uppercase(),
            url: url.to_string(),
            status: None,
            status_text: None,
            request_body,
            response_body: None,
            error: None,
            duration: None,
            completed: false,
        });
        self.notify();
        id
    }

    /// Applies `settle` to the pending entry `id`. Unknown or already
    /// completed ids are ignored.
    fn settle(&self, id: &str, settle: impl FnOnce(&mut ApiLogEntry)) -> bool {
        let changed = {
            let mut inner = self.write();
            match inner
                .entries
                .iter_mut()
                .find(|e| e.id == id && !e.completed)
            {
                Some(entry) => {
                    settle(entry);
                    entry.completed = true;
                    true
                }
                None => false,
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    pub fn log_response(
        &self,
        id: &str,
        status: u16,
        status_text: &str,
        response_body: Option<Value>,
        duration: Option<u64>,
    ) -> bool {
        self.settle(id, |entry| {
            entry.status = Some(status);
            entry.status_text = Some(status_text.to_string());
            entry.response_body = response_body;
            entry.duration = duration;
        })
    }

    pub fn log_error(&self, id: &str, message: &str, duration: Option<u64>) -> bool {
        self.settle(id, |entry| {
            entry.error = Some(message.to_string());
            entry.duration = duration;
        })
    }

    pub fn clear_logs(&self) {
        self.write().entries.clear();
        self.notify();
    }
}
