use crate::{
    error::StoreError,
    models::{
        self, Location, NewLocation, NewSurvey, Survey, SurveyRow, User, validate_location,
        validate_survey,
    },
    repository::Repository,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Columns of `SurveyRow`, read from a survey relation aliased `s` joined to `users u`.
const SURVEY_COLUMNS: &str = r#"
    s.id, s.title, s.content, s.location_id, s.created_by, s.created_on,
    u.first_name AS creator_first_name, u.last_name AS creator_last_name
"#;

const LOCATION_COLUMNS: &str = "id, name, description, created_by, created_on";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are checked at runtime
/// (`query_as::<_, T>`) so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded migrations under `./migrations`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// map_write_error
///
/// Turns foreign key violations into field errors so they surface like schema checks.
/// Everything else is an opaque database failure.
fn map_write_error(err: sqlx::Error) -> StoreError {
    let field_error = match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => match db.constraint() {
            Some("surveys_location_id_fkey") => Some(models::missing_location()),
            Some("surveys_created_by_fkey") => Some(models::missing_creator()),
            _ => None,
        },
        _ => None,
    };
    if let Some(field_error) = field_error {
        return StoreError::Validation(vec![field_error]);
    }
    tracing::error!("write error: {:?}", err);
    StoreError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, first_name, last_name, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user error: {:?}", e);
            None
        })
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, first_name, last_name, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, email, first_name, last_name, role"#,
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// create_survey
    ///
    /// Inserts the survey and joins the creator in the same statement, so the returned
    /// record is already populated.
    async fn create_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError> {
        validate_survey(&survey.title).map_err(StoreError::Validation)?;

        let query = format!(
            r#"
            WITH s AS (
                INSERT INTO surveys (id, title, content, location_id, created_by, created_on)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, title, content, location_id, created_by, created_on
            )
            SELECT {SURVEY_COLUMNS}
            FROM s LEFT JOIN users u ON s.created_by = u.id
            "#
        );

        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(Uuid::new_v4())
            .bind(survey.title)
            .bind(survey.content)
            .bind(survey.location_id)
            .bind(survey.created_by)
            .bind(survey.created_on)
            .fetch_one(&self.pool)
            .await
            .map(Survey::from)
            .map_err(map_write_error)
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>, StoreError> {
        let query = format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys s LEFT JOIN users u ON s.created_by = u.id \
             ORDER BY s.created_on DESC"
        );
        let rows = sqlx::query_as::<_, SurveyRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Survey::from).collect())
    }

    async fn list_surveys_by_location(&self, location_id: Uuid) -> Result<Vec<Survey>, StoreError> {
        let query = format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys s LEFT JOIN users u ON s.created_by = u.id \
             WHERE s.location_id = $1 ORDER BY s.created_on DESC"
        );
        let rows = sqlx::query_as::<_, SurveyRow>(&query)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Survey::from).collect())
    }

    async fn find_survey(&self, id: Uuid) -> Result<Option<Survey>, StoreError> {
        let query = format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys s LEFT JOIN users u ON s.created_by = u.id \
             WHERE s.id = $1"
        );
        let row = sqlx::query_as::<_, SurveyRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Survey::from))
    }

    /// update_survey
    ///
    /// Writes `title` and `content` only; every other column keeps its stored value.
    async fn update_survey(&self, survey: &Survey) -> Result<Survey, StoreError> {
        validate_survey(&survey.title).map_err(StoreError::Validation)?;

        let query = format!(
            r#"
            WITH s AS (
                UPDATE surveys SET title = $2, content = $3
                WHERE id = $1
                RETURNING id, title, content, location_id, created_by, created_on
            )
            SELECT {SURVEY_COLUMNS}
            FROM s LEFT JOIN users u ON s.created_by = u.id
            "#
        );

        sqlx::query_as::<_, SurveyRow>(&query)
            .bind(survey.id)
            .bind(&survey.title)
            .bind(&survey.content)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .map(Survey::from)
            .ok_or(StoreError::NotFound)
    }

    async fn delete_survey(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        validate_location(&location.name).map_err(StoreError::Validation)?;

        let query = format!(
            "INSERT INTO locations (id, name, description, created_by, created_on) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {LOCATION_COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(Uuid::new_v4())
            .bind(location.name)
            .bind(location.description)
            .bind(location.created_by)
            .bind(location.created_on)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        let query = format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY created_on DESC");
        Ok(sqlx::query_as::<_, Location>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        let query = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1");
        Ok(sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_location(&self, location: &Location) -> Result<Location, StoreError> {
        validate_location(&location.name).map_err(StoreError::Validation)?;

        let query = format!(
            "UPDATE locations SET name = $2, description = $3 WHERE id = $1 \
             RETURNING {LOCATION_COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(location.id)
            .bind(&location.name)
            .bind(&location.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_location(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
