//! Score record persistence

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{Result, StoreError},
    models::{NewScoreRecord, ScoreRecord, ScoreResult, StatusCounts, TaskStatus, UpsertOutcome},
    review_tasks::fold_status_counts,
    store::Store,
};

impl Store {
    /// Create or revive the score record for a scoring event
    ///
    /// A completed score is never re-run on re-delivery (the comment was
    /// already posted); only failed scores are revived.
    pub async fn upsert_score(&self, new: &NewScoreRecord) -> Result<(UpsertOutcome, String)> {
        let dedupe_key = new.dedupe_key();
        let score_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO score_records
                (score_id, dedupe_key, repo, issue_number, comment_id, content_type,
                 title, body, author, issue_url, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(dedupe_key) DO NOTHING",
        )
        .bind(&score_id)
        .bind(&dedupe_key)
        .bind(&new.repo)
        .bind(new.issue_number)
        .bind(new.comment_id)
        .bind(new.content_type)
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.author)
        .bind(&new.issue_url)
        .bind(TaskStatus::Queued)
        .bind(now)
        .execute(self.pool())
        .await?
        .rows_affected();

        if inserted == 1 {
            return Ok((UpsertOutcome::Created, score_id));
        }

        let existing: (String, TaskStatus) =
            sqlx::query_as("SELECT score_id, status FROM score_records WHERE dedupe_key = ?")
                .bind(&dedupe_key)
                .fetch_one(self.pool())
                .await?;
        let (existing_id, status) = existing;

        match status {
            TaskStatus::Completed => Ok((UpsertOutcome::AlreadyDone, existing_id)),
            TaskStatus::Queued | TaskStatus::Processing => {
                debug!(dedupe_key = %dedupe_key, "live score collapsed");
                Ok((UpsertOutcome::Collapsed, existing_id))
            }
            TaskStatus::Failed => {
                let revived = sqlx::query(
                    "UPDATE score_records
                     SET status = ?, error_message = NULL, completed_at = NULL,
                         title = ?, body = ?
                     WHERE dedupe_key = ? AND status = 'failed'",
                )
                .bind(TaskStatus::Queued)
                .bind(&new.title)
                .bind(&new.body)
                .bind(&dedupe_key)
                .execute(self.pool())
                .await?
                .rows_affected();
                if revived == 1 {
                    Ok((UpsertOutcome::Requeued, existing_id))
                } else {
                    Ok((UpsertOutcome::Collapsed, existing_id))
                }
            }
        }
    }

    /// Fetch one score record by id
    pub async fn get_score(&self, score_id: &str) -> Result<ScoreRecord> {
        sqlx::query_as::<_, ScoreRecord>("SELECT * FROM score_records WHERE score_id = ?")
            .bind(score_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::not_found(format!("score {}", score_id)))
    }

    /// List score records, newest first
    pub async fn list_scores(&self, limit: i64, offset: i64) -> Result<Vec<ScoreRecord>> {
        Ok(sqlx::query_as::<_, ScoreRecord>(
            "SELECT * FROM score_records ORDER BY created_at DESC, score_id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?)
    }

    /// Count score records by status
    pub async fn score_counts(&self) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM score_records GROUP BY status")
                .fetch_all(self.pool())
                .await?;
        Ok(fold_status_counts(rows))
    }

    /// Move a queued score to processing
    pub async fn mark_score_processing(&self, score_id: &str) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE score_records SET status = ? WHERE score_id = ? AND status = 'queued'",
        )
        .bind(TaskStatus::Processing)
        .bind(score_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::invalid_transition(format!(
                "score {} is not queued",
                score_id
            )));
        }
        Ok(())
    }

    /// Finish a processing score successfully
    pub async fn complete_score(&self, score_id: &str, result: &ScoreResult) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE score_records
             SET status = ?, format_score = ?, format_feedback = ?,
                 content_score = ?, content_feedback = ?,
                 clarity_score = ?, clarity_feedback = ?,
                 actionability_score = ?, actionability_feedback = ?,
                 overall_score = ?, suggestions = ?, completed_at = ?
             WHERE score_id = ? AND status = 'processing'",
        )
        .bind(TaskStatus::Completed)
        .bind(result.format_score)
        .bind(&result.format_feedback)
        .bind(result.content_score)
        .bind(&result.content_feedback)
        .bind(result.clarity_score)
        .bind(&result.clarity_feedback)
        .bind(result.actionability_score)
        .bind(&result.actionability_feedback)
        .bind(result.overall_score)
        .bind(&result.suggestions)
        .bind(Utc::now())
        .bind(score_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::invalid_transition(format!(
                "score {} is not processing",
                score_id
            )));
        }
        Ok(())
    }

    /// Finish a score with an error
    pub async fn fail_score(&self, score_id: &str, error_message: &str) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE score_records
             SET status = ?, error_message = ?, completed_at = ?
             WHERE score_id = ? AND status IN ('queued', 'processing')",
        )
        .bind(TaskStatus::Failed)
        .bind(error_message)
        .bind(Utc::now())
        .bind(score_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::invalid_transition(format!(
                "score {} is already terminal",
                score_id
            )));
        }
        Ok(())
    }

    /// Append a free-text user feedback item to a score record
    pub async fn append_user_feedback(&self, score_id: &str, feedback: &str) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE score_records
             SET user_feedback = CASE
                 WHEN user_feedback IS NULL OR user_feedback = '' THEN ?
                 ELSE user_feedback || char(10) || ?
             END
             WHERE score_id = ?",
        )
        .bind(feedback)
        .bind(feedback)
        .bind(score_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::not_found(format!("score {}", score_id)));
        }
        Ok(())
    }
}
