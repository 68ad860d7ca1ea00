use survey_portal::{
    AppState,
    config::{AppConfig, Env, StoreBackend},
    create_router,
    models::{ADMIN_ROLE, User},
    repository::{MemoryRepository, PostgresRepository, Repository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Fixed id of the administrator seeded into the memory store, usable with `x-user-id`.
const DEV_ADMIN_ID: Uuid = Uuid::from_u128(1);

#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing or invalid values)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "survey_portal=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    tracing::info!(policies = ?config.policies, "route access policies");

    // 3. Record store
    let repo: RepositoryState = match config.store {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            let repo = PostgresRepository::new(pool);
            repo.migrate()
                .await
                .expect("FATAL: Failed to run database migrations.");
            Arc::new(repo)
        }
        StoreBackend::Memory => {
            let repo = MemoryRepository::new();
            // LOCAL-ONLY: an administrator to drive the API with the `x-user-id` header.
            repo.create_user(User {
                id: DEV_ADMIN_ID,
                email: "admin@localhost".to_string(),
                first_name: "Local".to_string(),
                last_name: "Admin".to_string(),
                role: ADMIN_ROLE.to_string(),
            })
            .await
            .expect("FATAL: Failed to seed the memory store.");
            tracing::warn!(admin_id = %DEV_ADMIN_ID, "using the in-memory store; data is not persisted");
            Arc::new(repo)
        }
    };

    // 4. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
