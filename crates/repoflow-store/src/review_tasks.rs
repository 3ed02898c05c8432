//! Review task persistence

use chrono::Utc;
use tracing::debug;

use crate::{
    error::{Result, StoreError},
    models::{NewReviewTask, ReviewTask, StatusCounts, TaskStatus, UpsertOutcome},
    store::Store,
};

impl Store {
    /// Create or revive the review task for a PR
    ///
    /// A live (queued or processing) task collapses the request; a terminal
    /// task is reset to queued so a later `synchronize` re-runs the review.
    pub async fn upsert_review_task(&self, new: &NewReviewTask) -> Result<UpsertOutcome> {
        let task_id = new.task_id();
        let now = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO review_tasks
                (task_id, repo, pr_number, pr_title, pr_author, pr_url,
                 status, progress, message, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, 'queued for review', ?, ?)
             ON CONFLICT(task_id) DO NOTHING",
        )
        .bind(&task_id)
        .bind(&new.repo)
        .bind(new.pr_number)
        .bind(&new.pr_title)
        .bind(&new.pr_author)
        .bind(&new.pr_url)
        .bind(TaskStatus::Queued)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?
        .rows_affected();

        if inserted == 1 {
            return Ok(UpsertOutcome::Created);
        }

        // The key exists; revive only terminal tasks. The guard is in the
        // WHERE clause so two concurrent deliveries cannot both requeue.
        let revived = sqlx::query(
            "UPDATE review_tasks
             SET status = ?, progress = 0, message = 're-queued',
                 pr_title = ?, error_message = NULL, completed_at = NULL,
                 updated_at = ?
             WHERE task_id = ? AND status IN ('completed', 'failed')",
        )
        .bind(TaskStatus::Queued)
        .bind(&new.pr_title)
        .bind(now)
        .bind(&task_id)
        .execute(self.pool())
        .await?
        .rows_affected();

        if revived == 1 {
            debug!(task_id = %task_id, "terminal review task re-queued");
            Ok(UpsertOutcome::Requeued)
        } else {
            debug!(task_id = %task_id, "live review task collapsed");
            Ok(UpsertOutcome::Collapsed)
        }
    }

    /// Fetch one review task
    pub async fn get_review_task(&self, task_id: &str) -> Result<ReviewTask> {
        sqlx::query_as::<_, ReviewTask>("SELECT * FROM review_tasks WHERE task_id = ?")
            .bind(task_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| StoreError::not_found(format!("review task {}", task_id)))
    }

    /// List review tasks, newest first
    pub async fn list_review_tasks(&self, limit: i64, offset: i64) -> Result<Vec<ReviewTask>> {
        Ok(sqlx::query_as::<_, ReviewTask>(
            "SELECT * FROM review_tasks ORDER BY created_at DESC, task_id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?)
    }

    /// Count review tasks by status
    pub async fn review_task_counts(&self) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM review_tasks GROUP BY status")
                .fetch_all(self.pool())
                .await?;
        Ok(fold_status_counts(rows))
    }

    /// Move a queued review task to processing
    pub async fn mark_review_processing(&self, task_id: &str) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE review_tasks
             SET status = ?, updated_at = ?
             WHERE task_id = ? AND status = 'queued'",
        )
        .bind(TaskStatus::Processing)
        .bind(Utc::now())
        .bind(task_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::invalid_transition(format!(
                "review task {} is not queued",
                task_id
            )));
        }
        Ok(())
    }

    /// Update progress and stage message; progress never decreases
    pub async fn update_review_progress(
        &self,
        task_id: &str,
        progress: i64,
        message: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE review_tasks
             SET progress = MAX(progress, ?), message = ?, updated_at = ?
             WHERE task_id = ? AND status = 'processing'",
        )
        .bind(progress.clamp(0, 100))
        .bind(message)
        .bind(Utc::now())
        .bind(task_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Finish a processing review task successfully
    pub async fn complete_review_task(&self, task_id: &str, review_content: &str) -> Result<()> {
        let now = Utc::now();
        let updated = sqlx::query(
            "UPDATE review_tasks
             SET status = ?, progress = 100, message = 'review posted',
                 review_content = ?, updated_at = ?, completed_at = ?
             WHERE task_id = ? AND status = 'processing'",
        )
        .bind(TaskStatus::Completed)
        .bind(review_content)
        .bind(now)
        .bind(now)
        .bind(task_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::invalid_transition(format!(
                "review task {} is not processing",
                task_id
            )));
        }
        Ok(())
    }

    /// Finish a review task with an error
    pub async fn fail_review_task(&self, task_id: &str, error_message: &str) -> Result<()> {
        let now = Utc::now();
        let updated = sqlx::query(
            "UPDATE review_tasks
             SET status = ?, message = 'review failed', error_message = ?,
                 updated_at = ?, completed_at = ?
             WHERE task_id = ? AND status IN ('queued', 'processing')",
        )
        .bind(TaskStatus::Failed)
        .bind(error_message)
        .bind(now)
        .bind(now)
        .bind(task_id)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::invalid_transition(format!(
                "review task {} is already terminal",
                task_id
            )));
        }
        Ok(())
    }
}

/// Fold (status, count) rows into a `StatusCounts`
pub(crate) fn fold_status_counts(rows: Vec<(String, i64)>) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        match status.as_str() {
            "queued" => counts.queued = count,
            "processing" => counts.processing = count,
            "completed" => counts.completed = count,
            "failed" => counts.failed = count,
            _ => {}
        }
        counts.total += count;
    }
    counts
}
