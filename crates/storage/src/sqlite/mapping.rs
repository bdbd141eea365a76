use chrono::{DateTime, Utc};
use journey_core::model::{AnswerSet, FeedbackRecord, Stage, StageSubmission, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn user_id_to_i64(user: UserId) -> Result<i64, StorageError> {
    i64::try_from(user.value()).map_err(|_| StorageError::Serialization("user_id overflow".into()))
}

pub(crate) fn parse_stage(s: &str) -> Result<Stage, StorageError> {
    s.parse::<Stage>().map_err(ser)
}

/// Row values for one stored submission.
pub(crate) struct SubmissionRow {
    pub stage: &'static str,
    pub answers_json: String,
    pub feedback_json: Option<String>,
    pub approved: i64,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn submission_to_row(submission: &StageSubmission) -> Result<SubmissionRow, StorageError> {
    Ok(SubmissionRow {
        stage: submission.stage().key(),
        answers_json: serde_json::to_string(submission.answers()).map_err(ser)?,
        feedback_json: submission
            .feedback()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ser)?,
        approved: i64::from(submission.is_approved()),
        updated_at: submission.updated_at(),
    })
}

/// Decoded submission plus its completion flag.
pub(crate) fn map_submission_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(StageSubmission, bool), StorageError> {
    let stage = parse_stage(row.try_get::<String, _>("stage").map_err(ser)?.as_str())?;
    let answers: AnswerSet =
        serde_json::from_str(&row.try_get::<String, _>("answers_json").map_err(ser)?)
            .map_err(ser)?;
    let feedback: Option<FeedbackRecord> = row
        .try_get::<Option<String>, _>("feedback_json")
        .map_err(ser)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(ser)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;
    let completed = row.try_get::<i64, _>("completed").map_err(ser)? != 0;

    let submission = match feedback {
        Some(feedback) => StageSubmission::evaluated(stage, answers, feedback),
        None => StageSubmission::draft(stage, answers, updated_at),
    };
    Ok((submission, completed))
}
