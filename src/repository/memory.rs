use crate::{
    error::StoreError,
    models::{
        self, Creator, Location, NewLocation, NewSurvey, Survey, User, validate_location,
        validate_survey,
    },
    repository::Repository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A survey as held in memory: the creator is kept as a bare id and populated on read.
#[derive(Debug, Clone)]
struct StoredSurvey {
    id: Uuid,
    title: String,
    content: String,
    location_id: Option<Uuid>,
    created_by: Uuid,
    created_on: DateTime<Utc>,
}

/// MemoryRepository
///
/// A `Repository` held entirely in process memory. Used by the `memory` store backend for
/// local development and by the test suites, so handler behaviour can be checked without
/// a database. Applies the same schema checks as `PostgresRepository`.
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<HashMap<Uuid, User>>,
    // Insertion order is kept so equal timestamps list in a stable order.
    surveys: RwLock<Vec<StoredSurvey>>,
    locations: RwLock<Vec<Location>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-seeded with the given users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(users),
            ..Self::default()
        }
    }

    fn populate(stored: &StoredSurvey, users: &HashMap<Uuid, User>) -> Survey {
        let created_by = users
            .get(&stored.created_by)
            .map(Creator::from)
            .unwrap_or_else(|| Creator::unresolved(stored.created_by));
        Survey {
            id: stored.id,
            title: stored.title.clone(),
            content: stored.content.clone(),
            location_id: stored.location_id,
            created_by,
            created_on: stored.created_on,
        }
    }

    async fn surveys_where(&self, keep: impl Fn(&StoredSurvey) -> bool) -> Vec<Survey> {
        let surveys = self.surveys.read().await;
        let users = self.users.read().await;
        let mut found: Vec<Survey> = surveys
            .iter()
            .filter(|s| keep(*s))
            .map(|s| Self::populate(s, &users))
            .collect();
        found.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        found
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn create_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError> {
        validate_survey(&survey.title).map_err(StoreError::Validation)?;

        // Lock order: locations, surveys, users. Same as `delete_location`.
        let locations = self.locations.read().await;
        let mut surveys = self.surveys.write().await;
        let users = self.users.read().await;

        if let Some(location_id) = survey.location_id {
            if !locations.iter().any(|l| l.id == location_id) {
                return Err(StoreError::Validation(vec![models::missing_location()]));
            }
        }
        if !users.contains_key(&survey.created_by) {
            return Err(StoreError::Validation(vec![models::missing_creator()]));
        }

        let stored = StoredSurvey {
            id: Uuid::new_v4(),
            title: survey.title,
            content: survey.content,
            location_id: survey.location_id,
            created_by: survey.created_by,
            created_on: survey.created_on,
        };
        surveys.push(stored.clone());

        Ok(Self::populate(&stored, &users))
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>, StoreError> {
        Ok(self.surveys_where(|_| true).await)
    }

    async fn list_surveys_by_location(&self, location_id: Uuid) -> Result<Vec<Survey>, StoreError> {
        Ok(self
            .surveys_where(|s| s.location_id == Some(location_id))
            .await)
    }

    async fn find_survey(&self, id: Uuid) -> Result<Option<Survey>, StoreError> {
        Ok(self.surveys_where(|s| s.id == id).await.into_iter().next())
    }

    async fn update_survey(&self, survey: &Survey) -> Result<Survey, StoreError> {
        validate_survey(&survey.title).map_err(StoreError::Validation)?;

        let mut surveys = self.surveys.write().await;
        let stored = surveys
            .iter_mut()
            .find(|s| s.id == survey.id)
            .ok_or(StoreError::NotFound)?;
        stored.title = survey.title.clone();
        stored.content = survey.content.clone();
        let stored = stored.clone();
        drop(surveys);

        let users = self.users.read().await;
        Ok(Self::populate(&stored, &users))
    }

    async fn delete_survey(&self, id: Uuid) -> Result<(), StoreError> {
        let mut surveys = self.surveys.write().await;
        let before = surveys.len();
        surveys.retain(|s| s.id != id);
        if surveys.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        validate_location(&location.name).map_err(StoreError::Validation)?;

        let created = Location {
            id: Uuid::new_v4(),
            name: location.name,
            description: location.description,
            created_by: location.created_by,
            created_on: location.created_on,
        };
        self.locations.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        let mut locations = self.locations.read().await.clone();
        locations.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(locations)
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        Ok(self
            .locations
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn update_location(&self, location: &Location) -> Result<Location, StoreError> {
        validate_location(&location.name).map_err(StoreError::Validation)?;

        let mut locations = self.locations.write().await;
        let stored = locations
            .iter_mut()
            .find(|l| l.id == location.id)
            .ok_or(StoreError::NotFound)?;
        stored.name = location.name.clone();
        stored.description = location.description.clone();
        Ok(stored.clone())
    }

    /// delete_location
    ///
    /// Surveys pointing at the removed location keep existing with `location_id` cleared,
    /// matching the `ON DELETE SET NULL` constraint of the SQL schema.
    async fn delete_location(&self, id: Uuid) -> Result<(), StoreError> {
        let mut locations = self.locations.write().await;
        let before = locations.len();
        locations.retain(|l| l.id != id);
        if locations.len() == before {
            return Err(StoreError::NotFound);
        }
        for survey in self.surveys.write().await.iter_mut() {
            if survey.location_id == Some(id) {
                survey.location_id = None;
            }
        }
        Ok(())
    }
}
