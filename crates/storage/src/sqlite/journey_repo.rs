use std::collections::BTreeMap;

use chrono::Utc;
use journey_core::model::{JourneyProgress, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_submission_row, ser, submission_to_row, user_id_to_i64};
use crate::repository::{JourneyRepository, StorageError};

#[async_trait::async_trait]
impl JourneyRepository for SqliteRepository {
    async fn load_progress(&self, user: UserId) -> Result<Option<JourneyProgress>, StorageError> {
        let user_id = user_id_to_i64(user)?;

        let exists = sqlx::query("SELECT 1 FROM journeys WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r"
            SELECT stage, answers_json, feedback_json, completed, updated_at
            FROM stage_submissions
            WHERE user_id = ?1
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut submissions = BTreeMap::new();
        let mut completed = Vec::new();
        for row in &rows {
            let (submission, is_completed) = map_submission_row(row)?;
            if is_completed {
                completed.push(submission.stage());
            }
            submissions.insert(submission.stage(), submission);
        }

        JourneyProgress::from_parts(completed, submissions)
            .map(Some)
            .map_err(ser)
    }

    async fn save_progress(
        &self,
        user: UserId,
        progress: &JourneyProgress,
    ) -> Result<(), StorageError> {
        let user_id = user_id_to_i64(user)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO journeys (user_id, created_at, updated_at)
            VALUES (?1, ?2, ?2)
            ON CONFLICT(user_id) DO UPDATE SET updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM stage_submissions WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for submission in progress.submissions() {
            let row = submission_to_row(submission)?;
            let completed = i64::from(progress.is_completed(submission.stage()));

            sqlx::query(
                r"
                INSERT INTO stage_submissions
                    (user_id, stage, answers_json, feedback_json, approved, completed, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(user_id)
            .bind(row.stage)
            .bind(row.answers_json)
            .bind(row.feedback_json)
            .bind(row.approved)
            .bind(completed)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn delete_progress(&self, user: UserId) -> Result<(), StorageError> {
        let user_id = user_id_to_i64(user)?;

        let res = sqlx::query("DELETE FROM journeys WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
