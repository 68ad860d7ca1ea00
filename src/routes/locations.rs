use crate::{
    AppState,
    handlers::{locations, surveys},
};
use axum::{Router, routing::get};

pub fn location_routes() -> Router<AppState> {
    Router::new()
        // GET  /api/locations
        // POST /api/locations  (policy: location_create, public by default)
        .route("/api/locations", get(locations::list).post(locations::create))
        // GET    /api/locations/{locationId}
        // PUT    /api/locations/{locationId}  (policy: location_update, public by default)
        // DELETE /api/locations/{locationId}  (policy: location_delete, admin by default)
        .route(
            "/api/locations/{locationId}",
            get(locations::read)
                .put(locations::update)
                .delete(locations::delete),
        )
        // GET /api/locations/{locationId}/surveys
        .route(
            "/api/locations/{locationId}/surveys",
            get(surveys::list_by_location),
        )
}
