use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Message returned when a persistence failure carries no field-level detail.
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// FieldError
///
/// A single schema violation reported by the record store, e.g. a blank required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// StoreError
///
/// Failures surfaced by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("record not found")]
    NotFound,
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

/// ApiError
///
/// The single error channel of every handler and extractor. Each variant maps to one
/// HTTP status and is rendered as `{ "message": ... }`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Schema constraint violated; carries the first field message.
    #[error("{0}")]
    Validation(String),
    /// Persistence failure without structured detail.
    #[error("Unknown server error")]
    UnknownServer,
    /// A path identifier could not be resolved into a record.
    #[error("{0}")]
    NotFound(String),
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("User is not authorized")]
    Forbidden,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UnknownServer => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => errors
                .into_iter()
                .map(|e| e.message)
                .find(|m| !m.is_empty())
                .map(ApiError::Validation)
                .unwrap_or(ApiError::UnknownServer),
            StoreError::NotFound => ApiError::NotFound("Record not found".to_string()),
            other => {
                tracing::error!("record store failure: {:?}", other);
                ApiError::UnknownServer
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        ApiError::Validation(rejection.body_text())
    }
}

/// ErrorResponse
///
/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
