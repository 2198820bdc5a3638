//! Server-paged list controller shared by every entity list screen.
//!
//! ```text
//! Idle -> (mount | set_pagination | set_filters | refetch) -> Fetching
//! Fetching -> success -> Idle { rows updated }
//! Fetching -> failure -> Idle { rows unchanged, error logged }
//! Idle -> delete_row (confirmed, ok)     -> Fetching
//! Idle -> delete_row (confirmed, failed) -> Idle { error notified }
//! Idle -> delete_row (declined)          -> Idle
//! ```
//!
//! Several fetches may be in flight at once. Each takes a generation number
//! when it starts; a result is applied only if no newer fetch has started
//! since, so the last request initiated always wins regardless of the order
//! responses arrive in.

use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{ListMethod, ListRequest, ResourceBackend};
use crate::config::{FilterResetPolicy, GridConfig};
use crate::grid::collaborators::{Confirmer, Navigator, Notification, Notifier};
use crate::grid::columns::{ActionColumn, ActionConfig, ColumnSpec, RowAction};
use crate::grid::filters::FilterSet;
use crate::grid::pagination::{PaginationState, SortSpec};
use crate::types::EntityId;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";
pub const DELETE_SUCCESS: &str = "Item deleted successfully!";
pub const DELETE_FAILURE: &str = "Failed to delete item.";

/// Construction inputs for one list screen
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub fetch_endpoint: String,
    pub delete_endpoint: Option<String>,
    pub columns: Vec<ColumnSpec>,
    pub filters: FilterSet,
    pub method: ListMethod,
    pub actions: ActionConfig,
    pub sort: Option<SortSpec>,
    pub search: String,
}

impl ResourceConfig {
    pub fn new(fetch_endpoint: impl Into<String>) -> Self {
        Self {
            fetch_endpoint: fetch_endpoint.into(),
            delete_endpoint: None,
            columns: Vec::new(),
            filters: FilterSet::new(),
            method: ListMethod::Post,
            actions: ActionConfig::default(),
            sort: None,
            search: String::new(),
        }
    }

    pub fn delete_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.delete_endpoint = Some(endpoint.into());
        self
    }

    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn use_get_method(mut self, use_get: bool) -> Self {
        self.method = if use_get { ListMethod::Get } else { ListMethod::Post };
        self
    }

    pub fn actions(mut self, actions: ActionConfig) -> Self {
        self.actions = actions;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { rows: usize, total_count: u64 },
    /// A newer fetch started before this one resolved
    Superseded,
    /// Previous rows were kept
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    /// Carries the outcome of the reload that follows a delete
    Deleted { refetch: FetchOutcome },
    Failed(String),
    /// No delete endpoint configured
    Unavailable,
}

/// Point-in-time copy of the controller state
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub rows: Vec<Value>,
    pub total_count: u64,
    pub loading: bool,
    pub pagination: PaginationState,
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub search: String,
}

#[derive(Debug)]
struct GridState {
    rows: Vec<Value>,
    total_count: u64,
    loading: bool,
    pagination: PaginationState,
    filters: FilterSet,
    sort: SortSpec,
    search: String,
    action_column: Arc<ActionColumn>,
}

pub struct ServerPagedResource {
    fetch_endpoint: String,
    delete_endpoint: Option<String>,
    method: ListMethod,
    columns: Vec<ColumnSpec>,
    filter_reset: FilterResetPolicy,
    page_size_options: Vec<u32>,
    backend: Arc<dyn ResourceBackend>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    generation: AtomicU64,
    state: Mutex<GridState>,
}

impl ServerPagedResource {
    pub fn new(
        config: ResourceConfig,
        backend: Arc<dyn ResourceBackend>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
        grid: &GridConfig,
    ) -> Self {
        let mut actions = config.actions;
        actions.delete_url = config.delete_endpoint.clone();

        let sort = config
            .sort
            .unwrap_or_else(|| SortSpec::new(grid.default_sort_by.clone(), grid.default_sort_dir));

        Self {
            fetch_endpoint: config.fetch_endpoint,
            delete_endpoint: config.delete_endpoint,
            method: config.method,
            columns: config.columns,
            filter_reset: grid.filter_reset,
            page_size_options: grid.page_size_options.clone(),
            backend,
            confirmer,
            notifier,
            generation: AtomicU64::new(0),
            state: Mutex::new(GridState {
                rows: Vec::new(),
                total_count: 0,
                loading: false,
                pagination: PaginationState::first(grid.default_page_size),
                filters: config.filters,
                sort,
                search: config.search,
                action_column: Arc::new(ActionColumn::build(&actions)),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GridState> {
        // State is plain data; a panic elsewhere cannot leave it half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- state accessors -------------------------------------------------

    pub fn rows(&self) -> Vec<Value> {
        self.lock().rows.clone()
    }

    pub fn total_count(&self) -> u64 {
        self.lock().total_count
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn pagination(&self) -> PaginationState {
        self.lock().pagination
    }

    pub fn filters(&self) -> FilterSet {
        self.lock().filters.clone()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        let state = self.lock();
        GridSnapshot {
            rows: state.rows.clone(),
            total_count: state.total_count,
            loading: state.loading,
            pagination: state.pagination,
            filters: state.filters.clone(),
            sort: state.sort.clone(),
            search: state.search.clone(),
        }
    }

    pub fn page_size_options(&self) -> &[u32] {
        &self.page_size_options
    }

    /// Configured columns followed by the `actions` column
    pub fn columns(&self) -> Vec<ColumnSpec> {
        let actions = self.action_column();
        let mut columns = self.columns.clone();
        columns.push(actions.column().clone());
        columns
    }

    /// Shared across calls until the action configuration itself changes
    pub fn action_column(&self) -> Arc<ActionColumn> {
        Arc::clone(&self.lock().action_column)
    }

    /// Replace the button flags and URL templates. The column is rebuilt
    /// only when they actually differ.
    pub fn set_action_config(&self, mut actions: ActionConfig) {
        actions.delete_url = self.delete_endpoint.clone();
        let mut state = self.lock();
        if state.action_column.config() != &actions {
            state.action_column = Arc::new(ActionColumn::build(&actions));
        }
    }

    // ---- operations ------------------------------------------------------

    /// Initial load when the screen opens
    pub async fn mount(&self) -> FetchOutcome {
        self.fetch().await
    }

    pub async fn refetch(&self) -> FetchOutcome {
        self.fetch().await
    }

    pub async fn set_pagination(&self, next: PaginationState) -> FetchOutcome {
        let next = PaginationState::new(next.page_index, next.page_size);
        if !self.page_size_options.contains(&next.page_size) {
            tracing::debug!("Page size {} is not one of {:?}", next.page_size, self.page_size_options);
        }
        self.lock().pagination = next;
        self.fetch().await
    }

    pub async fn set_filters(&self, next: FilterSet) -> FetchOutcome {
        {
            let mut state = self.lock();
            state.filters = next;
            self.apply_reset_policy(&mut state);
        }
        self.fetch().await
    }

    pub async fn set_search(&self, search: impl Into<String>) -> FetchOutcome {
        {
            let mut state = self.lock();
            state.search = search.into();
            self.apply_reset_policy(&mut state);
        }
        self.fetch().await
    }

    pub async fn set_sort(&self, sort: SortSpec) -> FetchOutcome {
        {
            let mut state = self.lock();
            state.sort = sort;
            self.apply_reset_policy(&mut state);
        }
        self.fetch().await
    }

    fn apply_reset_policy(&self, state: &mut GridState) {
        if self.filter_reset == FilterResetPolicy::ResetToFirstPage {
            state.pagination = state.pagination.with_page(0);
        }
    }

    fn request_for(&self, state: &GridState) -> ListRequest {
        ListRequest {
            endpoint: self.fetch_endpoint.clone(),
            method: self.method,
            pagination: state.pagination,
            sort: state.sort.clone(),
            search: state.search.clone(),
            filters: state.filters.clone(),
        }
    }

    async fn fetch(&self) -> FetchOutcome {
        let (generation, request) = {
            let mut state = self.lock();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            (generation, self.request_for(&state))
        };

        tracing::debug!(
            "Fetching {} page {} (size {}) [generation {}]",
            request.endpoint,
            request.pagination.page_index,
            request.pagination.page_size,
            generation
        );

        let in_flight = InFlight { resource: self, generation, settled: false };
        let result = self.backend.list(&request).await;
        in_flight.settle();

        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                "Discarding stale response for {} page {} [generation {}]",
                request.endpoint,
                request.pagination.page_index,
                generation
            );
            return FetchOutcome::Superseded;
        }

        state.loading = false;
        match result {
            Ok(page) => {
                let rows = page.items.len();
                state.rows = page.items;
                state.total_count = page.total_count;
                FetchOutcome::Applied { rows, total_count: state.total_count }
            }
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", request.endpoint, e);
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Confirm, delete on the server, then reload the current page. Rows are
    /// never removed locally; they disappear only through the refetch.
    pub async fn delete_row(&self, id: &EntityId) -> DeleteOutcome {
        let Some(endpoint) = self.delete_endpoint.as_deref() else {
            tracing::warn!("Delete requested for {} but no delete endpoint is configured", id);
            return DeleteOutcome::Unavailable;
        };

        if !self.confirmer.confirm(DELETE_PROMPT).await {
            tracing::debug!("Delete of {} declined", id);
            return DeleteOutcome::Declined;
        }

        match self.backend.delete(endpoint, id).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(DELETE_SUCCESS));
                let refetch = self.refetch().await;
                DeleteOutcome::Deleted { refetch }
            }
            Err(e) => {
                tracing::error!("Failed to delete {} via {}: {}", id, endpoint, e);
                self.notifier.notify(Notification::error(DELETE_FAILURE));
                DeleteOutcome::Failed(e.to_string())
            }
        }
    }

    /// Carry out a row button: navigation goes to `navigator`, delete runs
    /// the delete cycle
    pub async fn activate(&self, action: &RowAction, navigator: &dyn Navigator) -> Option<DeleteOutcome> {
        match action {
            RowAction::Navigate { path, .. } => {
                navigator.navigate(path);
                None
            }
            RowAction::Delete { id } => Some(self.delete_row(id).await),
        }
    }
}

/// Clears `loading` when a fetch future is dropped before its response
/// arrives, unless a newer fetch has taken over.
struct InFlight<'a> {
    resource: &'a ServerPagedResource,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.resource.lock();
        if self.resource.generation.load(Ordering::SeqCst) == self.generation {
            tracing::debug!("Fetch [generation {}] dropped before completion", self.generation);
            state.loading = false;
        }
    }
}
