//! Base repository trait for entity tables.

use uuid::Uuid;

use crate::db::{
    engine::{Page, PageRequest},
    errors::Result,
};

/// Base repository trait providing common database operations
///
/// A repository is the data access layer for one entity table. It owns the SQL for that table and
/// converts rows into response types, so storage errors and stored enum values are classified
/// before they reach callers. Ids accepted and returned here are always external ids.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for partial updates
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Insert a new entity inside its own transaction
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by external id
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<Self::Response>>;

    /// One page of entities matching the filter, newest first
    async fn list(&mut self, filter: &Self::Filter, page: &PageRequest) -> Result<Page<Self::Response>>;

    /// Apply a field-mask update and return the entity as stored afterwards
    async fn update(&mut self, id: Uuid, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// Soft delete: move the entity to its terminal status
    async fn delete(&mut self, id: Uuid) -> Result<()>;
}
