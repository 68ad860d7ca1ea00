use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::FieldError;

// --- Core Records (Mapped to Database) ---

/// User
///
/// The caller identity stored in the `users` table. Surveys reference it through `createdBy`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    // The RBAC field: 'admin' or any other role.
    pub role: String,
}

pub const ADMIN_ROLE: &str = "admin";

/// Creator
///
/// The populated form of a `createdBy` reference: only the name fields leave the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Creator {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl Creator {
    pub fn new(id: Uuid, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let full_name = format!("{} {}", first_name, last_name).trim().to_string();
        Self {
            id,
            first_name,
            last_name,
            full_name,
        }
    }

    /// A reference whose user row is gone; the id survives, the names do not.
    pub fn unresolved(id: Uuid) -> Self {
        Self::new(id, "", "")
    }
}

impl From<&User> for Creator {
    fn from(user: &User) -> Self {
        Creator::new(user.id, user.first_name.clone(), user.last_name.clone())
    }
}

/// Survey
///
/// A survey with its `createdBy` reference populated.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Survey {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub location_id: Option<Uuid>,
    pub created_by: Creator,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
}

/// SurveyRow
///
/// Flat row shape returned by the survey queries (survey columns joined with the creator's names).
#[derive(Debug, Clone, FromRow)]
pub struct SurveyRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub location_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_on: DateTime<Utc>,
    pub creator_first_name: Option<String>,
    pub creator_last_name: Option<String>,
}

impl From<SurveyRow> for Survey {
    fn from(row: SurveyRow) -> Self {
        Survey {
            id: row.id,
            title: row.title,
            content: row.content,
            location_id: row.location_id,
            created_by: Creator::new(
                row.created_by,
                row.creator_first_name.unwrap_or_default(),
                row.creator_last_name.unwrap_or_default(),
            ),
            created_on: row.created_on,
        }
    }
}

/// NewSurvey
///
/// A survey ready to be persisted. `created_by` and `created_on` are always stamped by the server.
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub title: String,
    pub content: String,
    pub location_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_on: DateTime<Utc>,
}

/// Location
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    // Absent when the location was created anonymously.
    pub created_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_on: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateSurveyRequest
///
/// Input payload for POST /api/surveys. Any `createdBy`/`createdOn` keys sent by the client
/// are not part of this schema and are dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSurveyRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub location_id: Option<Uuid>,
}

/// UpdateSurveyRequest
///
/// Input payload for PUT /api/surveys/{surveyId}. Only these two fields are ever written;
/// a missing field is applied as an empty value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSurveyRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// LocationRequest
///
/// Input payload for both POST /api/locations and PUT /api/locations/{locationId}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LocationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// --- Response Envelopes ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ListState {
    Success,
    Failure,
}

/// SurveysByLocation
///
/// Tagged result of GET /api/locations/{locationId}/surveys.
/// `surveys` is serialized as `null` on failure; `message` is only present on failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct SurveysByLocation {
    pub state: ListState,
    pub surveys: Option<Vec<Survey>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const NO_SURVEY_FOUND: &str = "No survey found";

impl SurveysByLocation {
    pub fn from_surveys(surveys: Vec<Survey>) -> Self {
        if surveys.is_empty() {
            Self {
                state: ListState::Failure,
                surveys: None,
                message: Some(NO_SURVEY_FOUND.to_string()),
            }
        } else {
            Self {
                state: ListState::Success,
                surveys: Some(surveys),
                message: None,
            }
        }
    }
}

// --- Schema Checks ---

/// Field checks applied by every repository before a survey write.
pub fn validate_survey(title: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title cannot be blank"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_location(name: &str) -> Result<(), Vec<FieldError>> {
    if name.trim().is_empty() {
        return Err(vec![FieldError::new("name", "Name cannot be blank")]);
    }
    Ok(())
}

pub fn missing_location() -> FieldError {
    FieldError::new("locationId", "Location does not exist")
}

pub fn missing_creator() -> FieldError {
    FieldError::new("createdBy", "User does not exist")
}
