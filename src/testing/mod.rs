//! Fakes for unit tests: a scripted backend and recording collaborators.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ListRequest, PagedResult, ResourceBackend};
use crate::error::ClientError;
use crate::grid::{Confirmer, Navigator, Notification, Notifier};
use crate::permission::{Permission, PermissionSet};
use crate::types::{Action, EntityId};

type Responder = Arc<dyn Fn(&ListRequest) -> Result<PagedResult, ClientError> + Send + Sync>;

/// One page of synthetic rows. Every row records the page it came from.
pub fn rows(page: u32, size: u32, total: u64) -> PagedResult {
    let start = u64::from(page) * u64::from(size);
    let items = (start..(start + u64::from(size)).min(total))
        .map(|i| json!({"id": i + 1, "name": format!("Student {}", i + 1), "page": page}))
        .collect();
    PagedResult { items, total_count: total }
}

/// Grants `actions` on each entity
pub fn permissions(grants: &[(&str, &[Action])]) -> PermissionSet {
    grants
        .iter()
        .map(|(entity, actions)| actions.iter().fold(Permission::new(*entity), |p, a| p.grant(*a)))
        .collect()
}

/// In-memory [`ResourceBackend`] with per-page latency and scripted failures
pub struct MockBackend {
    responder: Mutex<Responder>,
    delays: Mutex<HashMap<u32, Duration>>,
    fail_deletes: Mutex<bool>,
    requests: Mutex<Vec<ListRequest>>,
    deletes: Mutex<Vec<(String, EntityId)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responder: Mutex::new(Arc::new(|_| Ok(PagedResult::default()))),
            delays: Mutex::new(HashMap::new()),
            fail_deletes: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_with<F>(&self, f: F)
    where
        F: Fn(&ListRequest) -> Result<PagedResult, ClientError> + Send + Sync + 'static,
    {
        *self.responder.lock().unwrap() = Arc::new(f);
    }

    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.delays.lock().unwrap().insert(page, delay);
    }

    pub fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap() = fail;
    }

    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<(String, EntityId)> {
        self.deletes.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceBackend for MockBackend {
    async fn list(&self, request: &ListRequest) -> Result<PagedResult, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self.delays.lock().unwrap().get(&request.pagination.page_index).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let responder = Arc::clone(&self.responder.lock().unwrap());
        responder(request)
    }

    async fn delete(&self, endpoint: &str, id: &EntityId) -> Result<(), ClientError> {
        self.deletes.lock().unwrap().push((endpoint.to_string(), id.clone()));
        if *self.fail_deletes.lock().unwrap() {
            return Err(ClientError::from_response(500, r#"{"message":"constraint violation"}"#));
        }
        Ok(())
    }
}

/// Answers every prompt the same way and remembers what was asked
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self { answer, prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}
