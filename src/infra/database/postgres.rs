//! PostgreSQL database client implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    PgPool, Row,
    postgres::{PgConnectOptions, PgPoolOptions, PgRow},
};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::{AppError, DatabaseClient, DatabaseError, StoredValue};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL client for the `stored_values` table
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Connect a pool using the given options
    pub async fn new(options: PgConnectOptions, config: PostgresConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            "Connecting to PostgreSQL..."
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run migrations and seed a zero row into an empty table.
    pub async fn bootstrap(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;

        let seeded = sqlx::query(
            r#"
            INSERT INTO stored_values (value)
            SELECT 0
            WHERE NOT EXISTS (SELECT 1 FROM stored_values)
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        if seeded > 0 {
            info!("Seeded stored_values with initial value 0");
        }
        info!("Database schema ready");
        Ok(())
    }

    /// Get the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_stored_value(row: &PgRow) -> Result<StoredValue, AppError> {
        let raw: i64 = row.try_get("value")?;
        Ok(StoredValue {
            id: row.try_get("id")?,
            value: value_from_column(raw)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Convert a `BIGINT` column into the unsigned domain value.
fn value_from_column(raw: i64) -> Result<u64, DatabaseError> {
    u64::try_from(raw)
        .map_err(|_| DatabaseError::OutOfRange(format!("stored value {} is negative", raw)))
}

/// Convert a domain value into a `BIGINT` parameter.
fn value_to_column(value: u64) -> Result<i64, DatabaseError> {
    i64::try_from(value)
        .map_err(|_| DatabaseError::OutOfRange(format!("{} exceeds BIGINT range", value)))
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_latest_value(&self) -> Result<StoredValue, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, value, created_at, updated_at
            FROM stored_values
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_stored_value(&row),
            None => Err(DatabaseError::NotFound("no values found in database".to_string()).into()),
        }
    }

    #[instrument(skip(self))]
    async fn set_value(&self, value: u64) -> Result<(), AppError> {
        let param = value_to_column(value)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Serializes concurrent writers so an empty table gets exactly one insert.
        sqlx::query("LOCK TABLE stored_values IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            r#"
            UPDATE stored_values
            SET value = $1, updated_at = $2
            WHERE id = (
                SELECT id FROM stored_values
                ORDER BY updated_at DESC, id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(param)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            debug!("Table empty, inserting first row");
            sqlx::query(
                "INSERT INTO stored_values (value, created_at, updated_at) VALUES ($1, $2, $2)",
            )
            .bind(param)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
