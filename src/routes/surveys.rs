use crate::{AppState, handlers::surveys};
use axum::{Router, routing::get};

pub fn survey_routes() -> Router<AppState> {
    Router::new()
        // GET  /api/surveys  -> newest first, creator populated
        // POST /api/surveys  -> createdBy/createdOn stamped by the server
        .route("/api/surveys", get(surveys::list).post(surveys::create))
        // Item routes. `LoadedSurvey` resolves {surveyId} before any of these handlers run.
        .route(
            "/api/surveys/{surveyId}",
            get(surveys::read)
                .put(surveys::update)
                .delete(surveys::delete),
        )
}
