use chrono::{DateTime, Utc};
use precis_core::error::AppError;
use precis_core::models::{UrlRecord, validate_url};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Repository for URL submissions in PostgreSQL.
#[derive(Clone)]
pub struct UrlRepository {
    pool: Pool<Postgres>,
}

impl UrlRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new submission. The database assigns the id and timestamp.
    pub async fn create(&self, url: &str) -> Result<UrlRecord, AppError> {
        validate_url(url)?;

        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO url_records (url)
            VALUES ($1)
            RETURNING id, url, created_at
            "#,
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }

    /// Fetch a submission by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<UrlRecord, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, url, created_at
            FROM url_records
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("URL record {id}")))
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct UrlRow {
    id: Uuid,
    url: String,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord {
            id: row.id,
            url: row.url,
            created_at: row.created_at,
        }
    }
}

// -- Trait implementation --

impl precis_core::traits::UrlStore for UrlRepository {
    async fn create(&self, url: &str) -> Result<UrlRecord, AppError> {
        UrlRepository::create(self, url).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<UrlRecord, AppError> {
        UrlRepository::get_by_id(self, id).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        UrlRepository::health_check(self).await
    }
}
