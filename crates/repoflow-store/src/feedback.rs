//! Feedback events, patterns, and snapshots
//!
//! Patterns keep (deviation_sum, occurrence_count) so the running mean is
//! exact regardless of update order; the update is a single transaction so
//! concurrent analyzers cannot lose increments.

use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{FeedbackAnalysis, FeedbackEvent, FeedbackPattern, FeedbackSnapshot},
    store::Store,
};

/// Cap on stored example feedback texts per pattern
const MAX_PATTERN_EXAMPLES: usize = 5;

impl Store {
    /// Record one analyzed feedback item
    pub async fn insert_feedback_event(
        &self,
        score_id: &str,
        analysis: &FeedbackAnalysis,
        raw_text: &str,
        analyzer: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO feedback_events
                (score_id, sentiment, feedback_type, dimension, score_deviation,
                 identified_issue, suggested_adjustment, raw_text, analyzer, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(score_id)
        .bind(analysis.sentiment)
        .bind(analysis.feedback_type)
        .bind(analysis.dimension)
        .bind(analysis.score_deviation)
        .bind(&analysis.identified_issue)
        .bind(&analysis.suggested_adjustment)
        .bind(raw_text)
        .bind(analyzer)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Feedback events created at or after `cutoff`
    pub async fn feedback_events_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FeedbackEvent>> {
        Ok(sqlx::query_as::<_, FeedbackEvent>(
            "SELECT * FROM feedback_events WHERE created_at >= ? ORDER BY created_at DESC",
        )
        .bind(cutoff)
        .fetch_all(self.pool())
        .await?)
    }

    /// Fold one analyzed feedback item into its `{type}:{dimension}` pattern
    pub async fn record_feedback_pattern(
        &self,
        analysis: &FeedbackAnalysis,
        example: &str,
    ) -> Result<FeedbackPattern> {
        let key = format!("{}:{}", analysis.feedback_type, analysis.dimension);
        let now = Utc::now();
        let mut tx = self.pool().begin().await?;

        let existing = sqlx::query_as::<_, FeedbackPattern>(
            "SELECT * FROM feedback_patterns WHERE pattern_key = ?",
        )
        .bind(&key)
        .fetch_optional(&mut *tx)
        .await?;

        let pattern = match existing {
            None => {
                let examples = serde_json::to_string(&[example])?;
                sqlx::query(
                    "INSERT INTO feedback_patterns
                        (pattern_key, pattern_type, dimension, occurrence_count,
                         deviation_sum, avg_score_deviation, example_feedbacks,
                         identified_issue, suggested_adjustment,
                         last_seen, created_at, updated_at)
                     VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&key)
                .bind(analysis.feedback_type)
                .bind(analysis.dimension)
                .bind(analysis.score_deviation as f64)
                .bind(analysis.score_deviation as f64)
                .bind(&examples)
                .bind(&analysis.identified_issue)
                .bind(&analysis.suggested_adjustment)
                .bind(now)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                sqlx::query_as::<_, FeedbackPattern>(
                    "SELECT * FROM feedback_patterns WHERE pattern_key = ?",
                )
                .bind(&key)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(current) => {
                let count = current.occurrence_count + 1;
                let sum = current.deviation_sum + analysis.score_deviation as f64;
                let avg = sum / count as f64;
                let mut examples = current.examples();
                examples.push(example.to_string());
                while examples.len() > MAX_PATTERN_EXAMPLES {
                    examples.remove(0);
                }
                sqlx::query(
                    "UPDATE feedback_patterns
                     SET occurrence_count = ?, deviation_sum = ?, avg_score_deviation = ?,
                         example_feedbacks = ?, identified_issue = ?,
                         suggested_adjustment = ?, last_seen = ?, updated_at = ?
                     WHERE pattern_key = ?",
                )
                .bind(count)
                .bind(sum)
                .bind(avg)
                .bind(serde_json::to_string(&examples)?)
                .bind(&analysis.identified_issue)
                .bind(&analysis.suggested_adjustment)
                .bind(now)
                .bind(now)
                .bind(&key)
                .execute(&mut *tx)
                .await?;
                sqlx::query_as::<_, FeedbackPattern>(
                    "SELECT * FROM feedback_patterns WHERE pattern_key = ?",
                )
                .bind(&key)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(pattern)
    }

    /// Patterns seen within the window with enough occurrences, most frequent first
    pub async fn recent_patterns(
        &self,
        window_days: i64,
        min_occurrences: i64,
    ) -> Result<Vec<FeedbackPattern>> {
        let cutoff = Utc::now() - chrono::Duration::days(window_days);
        Ok(sqlx::query_as::<_, FeedbackPattern>(
            "SELECT * FROM feedback_patterns
             WHERE last_seen >= ? AND occurrence_count >= ?
             ORDER BY occurrence_count DESC, pattern_key",
        )
        .bind(cutoff)
        .bind(min_occurrences)
        .fetch_all(self.pool())
        .await?)
    }

    /// All patterns, most frequent first
    pub async fn list_patterns(&self) -> Result<Vec<FeedbackPattern>> {
        Ok(sqlx::query_as::<_, FeedbackPattern>(
            "SELECT * FROM feedback_patterns ORDER BY occurrence_count DESC, pattern_key",
        )
        .fetch_all(self.pool())
        .await?)
    }

    /// Keys of pattern rows that fail their self-consistency checks
    pub async fn inconsistent_pattern_keys(&self) -> Result<Vec<String>> {
        let patterns = self.list_patterns().await?;
        Ok(patterns
            .into_iter()
            .filter(|p| !p.is_consistent())
            .map(|p| p.pattern_key)
            .collect())
    }

    /// Persist a feedback snapshot
    pub async fn insert_snapshot(
        &self,
        snapshot_date: DateTime<Utc>,
        total: i64,
        positive: i64,
        negative: i64,
        neutral: i64,
        top_issues: &serde_json::Value,
        learning_insights: &serde_json::Value,
        prompt_adjustments: &serde_json::Value,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO feedback_snapshots
                (snapshot_date, total_feedback, positive_count, negative_count,
                 neutral_count, top_issues, learning_insights, prompt_adjustments, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot_date)
        .bind(total)
        .bind(positive)
        .bind(negative)
        .bind(neutral)
        .bind(serde_json::to_string(top_issues)?)
        .bind(serde_json::to_string(learning_insights)?)
        .bind(serde_json::to_string(prompt_adjustments)?)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List snapshots, newest first
    pub async fn list_snapshots(&self, limit: i64) -> Result<Vec<FeedbackSnapshot>> {
        Ok(sqlx::query_as::<_, FeedbackSnapshot>(
            "SELECT * FROM feedback_snapshots ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?)
    }
}
