//! Resource controllers. Each submodule owns the handlers of one resource kind and the
//! extractor that resolves that resource from its path identifier.

use axum::{extract::FromRequest, http::Uri};

use crate::error::ApiError;

pub mod locations;
pub mod surveys;

/// ApiJson
///
/// `axum::Json` with its rejection routed through `ApiError`, so a body that is not JSON,
/// lacks the JSON content type or does not fit the payload schema answers 400 `{ "message": ... }`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Fallback for unmatched paths, answered through the same `{ "message": ... }` envelope.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
