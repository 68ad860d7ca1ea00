use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;

// Route binders, one per resource.
pub mod routes;
use routes::{locations::location_routes, surveys::survey_routes};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::surveys::create, handlers::surveys::list, handlers::surveys::list_by_location,
        handlers::surveys::read, handlers::surveys::update, handlers::surveys::delete,
        handlers::locations::list, handlers::locations::create, handlers::locations::read,
        handlers::locations::update, handlers::locations::delete,
    ),
    components(
        schemas(
            models::Survey, models::Creator, models::Location, models::CreateSurveyRequest,
            models::UpdateSurveyRequest, models::LocationRequest, models::SurveysByLocation,
            models::ListState, error::ErrorResponse,
        )
    ),
    tags(
        (name = "survey-portal", description = "Survey and Location API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The shared, cloneable container of everything a handler may need. The record store is
/// injected here rather than looked up globally.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Extractors (`AuthUser`, `LoadedSurvey`, `LoadedLocation`) only depend on these slices.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the resource routers, the docs UI, the JSON 404 fallback and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .merge(survey_routes())
        .merge(location_routes())
        .fallback(handlers::not_found)
        .with_state(state);

    // Request id is generated first so the trace span can record it, then echoed back.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span: method, uri and the `x-request-id` header, so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
