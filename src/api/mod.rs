pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{ListMethod, ListRequest, PagedResult, SaveMode};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::EntityId;

/// The two calls a paged list screen makes against the backend
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    async fn list(&self, request: &ListRequest) -> Result<PagedResult, ClientError>;

    async fn delete(&self, endpoint: &str, id: &EntityId) -> Result<(), ClientError>;
}
