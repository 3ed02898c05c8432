//! Copy record and comment-sync persistence
//!
//! The UNIQUE keys on both tables are the idempotency guarantee: replaying
//! a webhook can never produce a second copy or a second mirrored comment.

use chrono::Utc;

use crate::{
    error::Result,
    models::{CommentSyncRecord, CopyCounts, CopyRecord, NewCommentSync, NewCopyRecord},
    store::Store,
};

impl Store {
    /// Whether a non-failed copy already exists for (source issue, target)
    ///
    /// Partial counts as live: the target issue was created, so replaying
    /// must not create another one.
    pub async fn has_live_copy(
        &self,
        source_repo: &str,
        source_issue_number: i64,
        target_repo: &str,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM copy_records
             WHERE source_repo = ? AND source_issue_number = ? AND target_repo = ?
               AND status != 'failed'",
        )
        .bind(source_repo)
        .bind(source_issue_number)
        .bind(target_repo)
        .fetch_one(self.pool())
        .await?;
        Ok(count > 0)
    }

    /// Record a replication attempt
    ///
    /// Inserts a new row, or overwrites a previous failed attempt for the
    /// same (source, target) key. A conflicting live row makes this a no-op;
    /// returns whether the row was written.
    pub async fn record_copy(&self, new: &NewCopyRecord) -> Result<bool> {
        let written = sqlx::query(
            "INSERT INTO copy_records
                (source_repo, source_issue_number, source_issue_url, target_repo,
                 target_issue_number, target_issue_url, labels_copied,
                 images_reuploaded, status, error_message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(source_repo, source_issue_number, target_repo) DO UPDATE SET
                target_issue_number = excluded.target_issue_number,
                target_issue_url = excluded.target_issue_url,
                labels_copied = excluded.labels_copied,
                images_reuploaded = excluded.images_reuploaded,
                status = excluded.status,
                error_message = excluded.error_message,
                created_at = excluded.created_at
             WHERE copy_records.status = 'failed'",
        )
        .bind(&new.source_repo)
        .bind(new.source_issue_number)
        .bind(&new.source_issue_url)
        .bind(&new.target_repo)
        .bind(new.target_issue_number)
        .bind(&new.target_issue_url)
        .bind(serde_json::to_string(&new.labels_copied)?)
        .bind(serde_json::to_string(&new.images_reuploaded)?)
        .bind(new.status)
        .bind(&new.error_message)
        .bind(Utc::now())
        .execute(self.pool())
        .await?
        .rows_affected();
        Ok(written > 0)
    }

    /// Copy records that carry a target issue for one source issue
    pub async fn copies_for_source_issue(
        &self,
        source_repo: &str,
        source_issue_number: i64,
    ) -> Result<Vec<CopyRecord>> {
        Ok(sqlx::query_as::<_, CopyRecord>(
            "SELECT * FROM copy_records
             WHERE source_repo = ? AND source_issue_number = ?
               AND status != 'failed' AND target_issue_number IS NOT NULL
             ORDER BY target_repo",
        )
        .bind(source_repo)
        .bind(source_issue_number)
        .fetch_all(self.pool())
        .await?)
    }

    /// List copy records, newest first
    pub async fn list_copy_records(&self, limit: i64, offset: i64) -> Result<Vec<CopyRecord>> {
        Ok(sqlx::query_as::<_, CopyRecord>(
            "SELECT * FROM copy_records ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?)
    }

    /// Count copy records by outcome
    pub async fn copy_counts(&self) -> Result<CopyCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM copy_records GROUP BY status")
                .fetch_all(self.pool())
                .await?;
        let mut counts = CopyCounts::default();
        for (status, count) in rows {
            match status.as_str() {
                "success" => counts.success = count,
                "partial" => counts.partial = count,
                "failed" => counts.failed = count,
                _ => {}
            }
            counts.total += count;
        }
        Ok(counts)
    }

    /// Whether a non-failed mirror exists for (source comment, target issue)
    pub async fn has_comment_sync(
        &self,
        source_comment_id: i64,
        target_repo: &str,
        target_issue_number: i64,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comment_sync_records
             WHERE source_comment_id = ? AND target_repo = ? AND target_issue_number = ?
               AND status != 'failed'",
        )
        .bind(source_comment_id)
        .bind(target_repo)
        .bind(target_issue_number)
        .fetch_one(self.pool())
        .await?;
        Ok(count > 0)
    }

    /// Record a comment mirror
    ///
    /// Inserts a new row, or overwrites a previous failed attempt. A
    /// conflicting live row makes this a no-op; returns whether the row was
    /// written.
    pub async fn record_comment_sync(&self, new: &NewCommentSync) -> Result<bool> {
        let written = sqlx::query(
            "INSERT INTO comment_sync_records
                (source_comment_id, source_repo, source_issue_number,
                 target_repo, target_issue_number, target_comment_id, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(source_comment_id, target_repo, target_issue_number) DO UPDATE SET
                target_comment_id = excluded.target_comment_id,
                status = excluded.status,
                created_at = excluded.created_at
             WHERE comment_sync_records.status = 'failed'",
        )
        .bind(new.source_comment_id)
        .bind(&new.source_repo)
        .bind(new.source_issue_number)
        .bind(&new.target_repo)
        .bind(new.target_issue_number)
        .bind(new.target_comment_id)
        .bind(new.status)
        .bind(Utc::now())
        .execute(self.pool())
        .await?
        .rows_affected();
        Ok(written > 0)
    }

    /// List comment-sync records, newest first
    pub async fn list_comment_syncs(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentSyncRecord>> {
        Ok(sqlx::query_as::<_, CommentSyncRecord>(
            "SELECT * FROM comment_sync_records ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?)
    }
}
