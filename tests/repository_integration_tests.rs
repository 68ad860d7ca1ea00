//! PostgresRepository against a live database.
//!
//! Ignored by default; run with `DATABASE_URL=... cargo test -- --ignored`.

use chrono::{Duration, Utc};
use survey_portal::{
    error::StoreError,
    models::{NewLocation, NewSurvey, Survey, User},
    repository::{PostgresRepository, Repository},
};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        PostgresRepository::new(pool.clone())
            .migrate()
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

async fn create_test_user(repo: &PostgresRepository, role: &str) -> User {
    let id = Uuid::new_v4();
    repo.create_user(User {
        id,
        email: format!("{}@test.com", id),
        first_name: "Test".to_string(),
        last_name: role.to_string(),
        role: role.to_string(),
    })
    .await
    .expect("Failed to create test user")
}

fn new_survey(title: &str, created_by: Uuid) -> NewSurvey {
    NewSurvey {
        title: title.to_string(),
        content: "body".to_string(),
        location_id: None,
        created_by,
        created_on: Utc::now(),
    }
}

// --- Tests ---

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_populates_creator() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, "admin").await;

    let created = repo.create_survey(new_survey("Populated", user.id)).await.unwrap();
    assert_eq!(created.created_by.id, user.id);
    assert_eq!(created.created_by.full_name, "Test admin");

    let found = repo.find_survey(created.id).await.unwrap().unwrap();
    assert_eq!(found.title, "Populated");
    assert_eq!(found.created_by, created.created_by);
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_orders_by_created_on_desc() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, "user").await;

    let base = Utc::now() + Duration::days(365);
    let mut older = new_survey("older", user.id);
    older.created_on = base;
    let mut newer = new_survey("newer", user.id);
    newer.created_on = base + Duration::seconds(1);
    repo.create_survey(older).await.unwrap();
    repo.create_survey(newer).await.unwrap();

    let listed = repo.list_surveys().await.unwrap();
    assert!(listed.windows(2).all(|w| w[0].created_on >= w[1].created_on));
    let mine: Vec<&Survey> = listed.iter().filter(|s| s.created_by.id == user.id).collect();
    assert_eq!(mine[0].title, "newer");
    assert_eq!(mine[1].title, "older");
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_writes_only_title_and_content() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, "user").await;
    let original = repo.create_survey(new_survey("Before", user.id)).await.unwrap();

    let mut changed = original.clone();
    changed.title = "After".to_string();
    changed.content = "new body".to_string();
    changed.created_on = Utc::now() - Duration::days(30);
    changed.location_id = Some(Uuid::new_v4());

    let updated = repo.update_survey(&changed).await.unwrap();
    assert_eq!(updated.title, "After");
    assert_eq!(updated.content, "new body");
    assert_eq!(updated.created_on, original.created_on);
    assert_eq!(updated.location_id, None);
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_twice_reports_not_found() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, "user").await;
    let survey = repo.create_survey(new_survey("Gone", user.id)).await.unwrap();

    repo.delete_survey(survey.id).await.unwrap();
    assert!(matches!(repo.delete_survey(survey.id).await, Err(StoreError::NotFound)));
    assert!(repo.find_survey(survey.id).await.unwrap().is_none());
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_location_is_a_validation_error() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, "user").await;

    let mut survey = new_survey("Lost", user.id);
    survey.location_id = Some(Uuid::new_v4());

    match repo.create_survey(survey).await {
        Err(StoreError::Validation(errors)) => {
            assert_eq!(errors[0].message, "Location does not exist")
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_surveys_by_location() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let user = create_test_user(&repo, "user").await;
    let location = repo
        .create_location(NewLocation {
            name: "Hall".to_string(),
            description: String::new(),
            created_by: Some(user.id),
            created_on: Utc::now(),
        })
        .await
        .unwrap();

    let mut survey = new_survey("Here", user.id);
    survey.location_id = Some(location.id);
    repo.create_survey(survey).await.unwrap();

    let found = repo.list_surveys_by_location(location.id).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Here");

    repo.delete_location(location.id).await.unwrap();
    assert!(repo.list_surveys_by_location(location.id).await.unwrap().is_empty());
}
