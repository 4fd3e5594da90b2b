use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
    Row, Sqlite,
};
use chrono::Utc;
use log::{info, warn};

use crate::error::FunnelError;
use crate::models::QuizResult;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self, FunnelError> {
        let in_memory = db_url.contains(":memory:");

        // Create database if it doesn't exist
        if !in_memory && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating result database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // In-memory databases are per-connection, so the pool must not
        // hand out a second one.
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        // Initialize schema
        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // Initialize the database schema
    async fn init_schema(pool: &SqlitePool) -> Result<(), FunnelError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quiz_results (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                payload TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // Save the computed result, replacing whatever the slot held before
    pub async fn save_result(&self, result: &QuizResult) -> Result<(), FunnelError> {
        let payload = serde_json::to_string(result)?;

        sqlx::query(
            r#"
            INSERT INTO quiz_results (slot, payload, saved_at)
            VALUES (1, ?, ?)
            ON CONFLICT(slot)
            DO UPDATE SET payload = excluded.payload, saved_at = excluded.saved_at
            "#,
        )
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Load the stored result, if any. A payload that no longer decodes is
    // treated as absent rather than killing the session.
    pub async fn load_result(&self) -> Result<Option<QuizResult>, FunnelError> {
        let row = sqlx::query(
            r#"
            SELECT payload
            FROM quiz_results
            WHERE slot = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload = row.get::<String, _>("payload");
        match serde_json::from_str::<QuizResult>(&payload) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                warn!("Stored result payload is unreadable, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    // Drop the stored result (retake)
    pub async fn clear_result(&self) -> Result<(), FunnelError> {
        sqlx::query("DELETE FROM quiz_results WHERE slot = 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
