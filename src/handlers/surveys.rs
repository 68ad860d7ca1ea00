use crate::{
    AppState,
    handlers::ApiJson,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{CreateSurveyRequest, NewSurvey, Survey, SurveysByLocation, UpdateSurveyRequest},
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{FromRef, FromRequestParts, Path, State},
    http::request::Parts,
};
use chrono::Utc;
use uuid::Uuid;

// --- Parameter Resolution ---

/// LoadedSurvey
///
/// The survey named by the `{surveyId}` path segment, loaded with its creator populated.
/// Runs before the handler body, so a handler taking `LoadedSurvey` only executes for an
/// existing record.
///
/// Rejection: 404 `Failed to load survey <id>` for malformed or unknown ids.
pub struct LoadedSurvey(pub Survey);

impl<S> FromRequestParts<S> for LoadedSurvey
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Failed to load survey".to_string()))?;
        let repo = RepositoryState::from_ref(state);
        survey_by_id(&repo, &raw_id).await.map(LoadedSurvey)
    }
}

/// survey_by_id
///
/// Looks a survey up by its textual id. Never yields a silent miss: both a malformed id
/// and an unknown id fail with the id in the message.
pub async fn survey_by_id(repo: &RepositoryState, raw_id: &str) -> Result<Survey, ApiError> {
    let not_found = || ApiError::NotFound(format!("Failed to load survey {}", raw_id));
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    repo.find_survey(id).await?.ok_or_else(not_found)
}

// --- Handlers ---

/// create
///
/// Persists a new survey. `createdBy` is always the caller and `createdOn` the server
/// clock, whatever the payload says.
#[utoipa::path(
    post,
    path = "/api/surveys",
    operation_id = "create_survey",
    request_body = CreateSurveyRequest,
    responses(
        (status = 200, description = "Created", body = Survey),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
pub async fn create(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSurveyRequest>,
) -> Result<Json<Survey>, ApiError> {
    state
        .config
        .policies
        .survey_create
        .evaluate(Some(&caller), None)?;

    let survey = NewSurvey {
        title: payload.title,
        content: payload.content,
        location_id: payload.location_id,
        created_by: caller.id,
        created_on: Utc::now(),
    };
    let created = state.repo.create_survey(survey).await?;

    tracing::info!(survey_id = %created.id, user_id = %caller.id, "survey created");
    Ok(Json(created))
}

/// list
///
/// All surveys, newest first, each with its creator's names.
#[utoipa::path(
    get,
    path = "/api/surveys",
    operation_id = "list_surveys",
    responses(
        (status = 200, description = "Surveys, newest first", body = [Survey]),
        (status = 400, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Survey>>, ApiError> {
    Ok(Json(state.repo.list_surveys().await?))
}

/// list_by_location
///
/// Surveys attached to one location, wrapped in the `state`/`surveys`/`message` envelope.
/// An id that is not a UUID cannot match any survey and yields the failure envelope.
#[utoipa::path(
    get,
    path = "/api/locations/{locationId}/surveys",
    operation_id = "list_surveys_by_location",
    params(("locationId" = String, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Tagged survey list", body = SurveysByLocation),
        (status = 400, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_by_location(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
) -> Result<Json<SurveysByLocation>, ApiError> {
    let surveys = match Uuid::parse_str(&location_id) {
        Ok(id) => state.repo.list_surveys_by_location(id).await?,
        Err(_) => Vec::new(),
    };
    Ok(Json(SurveysByLocation::from_surveys(surveys)))
}

#[utoipa::path(
    get,
    path = "/api/surveys/{surveyId}",
    operation_id = "read_survey",
    params(("surveyId" = String, Path, description = "Survey ID")),
    responses(
        (status = 200, description = "Found", body = Survey),
        (status = 404, description = "Failed to load survey", body = ErrorResponse)
    )
)]
pub async fn read(LoadedSurvey(survey): LoadedSurvey) -> Json<Survey> {
    Json(survey)
}

/// update
///
/// Overwrites `title` and `content` of the loaded survey. No other field is taken from
/// the payload.
#[utoipa::path(
    put,
    path = "/api/surveys/{surveyId}",
    operation_id = "update_survey",
    params(("surveyId" = String, Path, description = "Survey ID")),
    request_body = UpdateSurveyRequest,
    responses(
        (status = 200, description = "Updated", body = Survey),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "User is not authorized", body = ErrorResponse),
        (status = 404, description = "Failed to load survey", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    LoadedSurvey(mut survey): LoadedSurvey,
    caller: Option<AuthUser>,
    ApiJson(payload): ApiJson<UpdateSurveyRequest>,
) -> Result<Json<Survey>, ApiError> {
    state
        .config
        .policies
        .survey_update
        .evaluate(caller.as_ref(), Some(survey.created_by.id))?;

    survey.title = payload.title;
    survey.content = payload.content;
    let updated = state.repo.update_survey(&survey).await?;
    Ok(Json(updated))
}

/// delete
///
/// Removes the loaded survey and echoes its last-known representation.
#[utoipa::path(
    delete,
    path = "/api/surveys/{surveyId}",
    operation_id = "delete_survey",
    params(("surveyId" = String, Path, description = "Survey ID")),
    responses(
        (status = 200, description = "Deleted", body = Survey),
        (status = 403, description = "User is not authorized", body = ErrorResponse),
        (status = 404, description = "Failed to load survey", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    LoadedSurvey(survey): LoadedSurvey,
    caller: Option<AuthUser>,
) -> Result<Json<Survey>, ApiError> {
    state
        .config
        .policies
        .survey_delete
        .evaluate(caller.as_ref(), Some(survey.created_by.id))?;

    state.repo.delete_survey(survey.id).await?;
    tracing::info!(survey_id = %survey.id, "survey deleted");
    Ok(Json(survey))
}
