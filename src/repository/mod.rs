use crate::{
    error::StoreError,
    models::{Location, NewLocation, NewSurvey, Survey, User},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The record store contract. Handlers only ever see `Arc<dyn Repository>`, so the
/// Postgres and in-memory backends are interchangeable.
///
/// Every write runs the schema checks from `models` and reports violations as
/// `StoreError::Validation`. Reads of surveys always return the `createdBy`
/// reference populated with the creator's names.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Used by the `AuthUser` extractor on every authenticated request.
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    // --- Surveys ---
    async fn create_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError>;
    // Newest first by `created_on`.
    async fn list_surveys(&self) -> Result<Vec<Survey>, StoreError>;
    async fn list_surveys_by_location(&self, location_id: Uuid) -> Result<Vec<Survey>, StoreError>;
    async fn find_survey(&self, id: Uuid) -> Result<Option<Survey>, StoreError>;
    // Persists only `title` and `content` of the given survey.
    async fn update_survey(&self, survey: &Survey) -> Result<Survey, StoreError>;
    async fn delete_survey(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Locations ---
    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError>;
    async fn list_locations(&self) -> Result<Vec<Location>, StoreError>;
    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError>;
    // Persists only `name` and `description` of the given location.
    async fn update_location(&self, location: &Location) -> Result<Location, StoreError>;
    async fn delete_location(&self, id: Uuid) -> Result<(), StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
