use crate::{
    AppState,
    handlers::ApiJson,
    auth::AuthUser,
    error::{ApiError, ErrorResponse},
    models::{Location, LocationRequest, NewLocation},
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{FromRef, FromRequestParts, Path, State},
    http::request::Parts,
};
use chrono::Utc;
use uuid::Uuid;

/// LoadedLocation
///
/// The location named by the `{locationId}` path segment.
/// Rejection: 404 `Failed to load location <id>`.
pub struct LoadedLocation(pub Location);

impl<S> FromRequestParts<S> for LoadedLocation
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Failed to load location".to_string()))?;
        let repo = RepositoryState::from_ref(state);
        location_by_id(&repo, &raw_id).await.map(LoadedLocation)
    }
}

pub async fn location_by_id(repo: &RepositoryState, raw_id: &str) -> Result<Location, ApiError> {
    let not_found = || ApiError::NotFound(format!("Failed to load location {}", raw_id));
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    repo.find_location(id).await?.ok_or_else(not_found)
}

#[utoipa::path(
    get,
    path = "/api/locations",
    operation_id = "list_locations",
    responses(
        (status = 200, description = "Locations, newest first", body = [Location]),
        (status = 400, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.repo.list_locations().await?))
}

/// create
///
/// Open to anonymous callers under the default policy; `createdBy` is recorded only when
/// a caller is known.
#[utoipa::path(
    post,
    path = "/api/locations",
    operation_id = "create_location",
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Created", body = Location),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    ApiJson(payload): ApiJson<LocationRequest>,
) -> Result<Json<Location>, ApiError> {
    state
        .config
        .policies
        .location_create
        .evaluate(caller.as_ref(), None)?;

    let location = NewLocation {
        name: payload.name,
        description: payload.description,
        created_by: caller.map(|c| c.id),
        created_on: Utc::now(),
    };
    let created = state.repo.create_location(location).await?;

    tracing::info!(location_id = %created.id, "location created");
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/api/locations/{locationId}",
    operation_id = "read_location",
    params(("locationId" = String, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Found", body = Location),
        (status = 404, description = "Failed to load location", body = ErrorResponse)
    )
)]
pub async fn read(LoadedLocation(location): LoadedLocation) -> Json<Location> {
    Json(location)
}

#[utoipa::path(
    put,
    path = "/api/locations/{locationId}",
    operation_id = "update_location",
    params(("locationId" = String, Path, description = "Location ID")),
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Updated", body = Location),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Failed to load location", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    LoadedLocation(mut location): LoadedLocation,
    caller: Option<AuthUser>,
    ApiJson(payload): ApiJson<LocationRequest>,
) -> Result<Json<Location>, ApiError> {
    state
        .config
        .policies
        .location_update
        .evaluate(caller.as_ref(), location.created_by)?;

    location.name = payload.name;
    location.description = payload.description;
    Ok(Json(state.repo.update_location(&location).await?))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{locationId}",
    operation_id = "delete_location",
    params(("locationId" = String, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Deleted", body = Location),
        (status = 401, description = "User is not logged in", body = ErrorResponse),
        (status = 403, description = "User is not authorized", body = ErrorResponse),
        (status = 404, description = "Failed to load location", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    LoadedLocation(location): LoadedLocation,
    caller: Option<AuthUser>,
) -> Result<Json<Location>, ApiError> {
    state
        .config
        .policies
        .location_delete
        .evaluate(caller.as_ref(), location.created_by)?;

    state.repo.delete_location(location.id).await?;
    tracing::info!(location_id = %location.id, "location deleted");
    Ok(Json(location))
}
