use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Highest journey schema version this build knows how to read.
pub const LATEST_VERSION: i64 = 1;

pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
}

/// Runs versioned migrations for the journey schema.
///
/// Version 1 creates journeys, stage submissions and their index.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if let Some(&found) = applied_versions(pool).await?.last() {
        if found > LATEST_VERSION {
            return Err(SqliteInitError::SchemaTooNew {
                found,
                supported: LATEST_VERSION,
            });
        }
    }

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS journeys (
                    user_id INTEGER PRIMARY KEY,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS stage_submissions (
                    user_id INTEGER NOT NULL,
                    stage TEXT NOT NULL,
                    answers_json TEXT NOT NULL,
                    feedback_json TEXT,
                    approved INTEGER NOT NULL CHECK (approved IN (0, 1)),
                    completed INTEGER NOT NULL CHECK (completed IN (0, 1)),
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, stage),
                    FOREIGN KEY (user_id) REFERENCES journeys(user_id) ON DELETE CASCADE,
                    CHECK (completed = 0 OR approved = 1)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_stage_submissions_user_completed
                    ON stage_submissions (user_id, completed);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
