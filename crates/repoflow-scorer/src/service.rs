//! Scoring and feedback-learning execution

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use repoflow_config::IssueScoringConfig;
use repoflow_engine::Engine;
use repoflow_github::{with_retry, CreatedComment, GitHubClient, GitHubError, RetryPolicy};
use repoflow_pool::JobHandler;
use repoflow_store::{FeedbackSnapshot, ScoreRecord, Sentiment, Store};
use tracing::{debug, error, info, warn};

use crate::{
    analyzer::{analysis_prompt, analyze_with_rules, parse_analysis_output},
    error::Result,
    insights::build_insight_block,
    parse::parse_score_output,
    prompt::{build_score_prompt, format_score_comment, strict_reprompt},
};

/// GitHub operations the scorer needs
#[async_trait]
pub trait ScorerGitHub: Send + Sync {
    /// Post an issue comment
    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> std::result::Result<CreatedComment, GitHubError>;
}

#[async_trait]
impl ScorerGitHub for GitHubClient {
    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> std::result::Result<CreatedComment, GitHubError> {
        GitHubClient::create_issue_comment(self, repo, number, body).await
    }
}

/// A unit of work for the pool
#[derive(Debug, Clone)]
pub enum ScoreJob {
    /// Run the scoring pipeline for a record
    Score {
        /// Score record id
        score_id: String,
    },
    /// Analyze one user feedback item
    Feedback {
        /// Score record the feedback was left on
        score_id: String,
        /// Raw feedback text
        text: String,
    },
}

impl ScoreJob {
    /// Shard key: all work for one score record runs in arrival order
    pub fn shard_key(&self) -> &str {
        match self {
            ScoreJob::Score { score_id } => score_id,
            ScoreJob::Feedback { score_id, .. } => score_id,
        }
    }
}

/// Drives scoring and the feedback-learning loop
pub struct ScorerService {
    store: Store,
    github: Arc<dyn ScorerGitHub>,
    engine: Engine,
    config: IssueScoringConfig,
    retry: RetryPolicy,
}

impl ScorerService {
    /// Create a service
    pub fn new(
        store: Store,
        github: Arc<dyn ScorerGitHub>,
        engine: Engine,
        config: IssueScoringConfig,
    ) -> Self {
        Self {
            store,
            github,
            engine,
            config,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy (tests)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the scoring pipeline for one record
    pub async fn run_score(&self, score_id: &str) {
        let record = match self.store.get_score(score_id).await {
            Ok(record) => record,
            Err(err) => {
                error!(score_id, error = %err, "score record vanished before execution");
                return;
            }
        };
        if let Err(err) = self.store.mark_score_processing(score_id).await {
            warn!(score_id, error = %err, "skipping score run");
            return;
        }

        match self.execute(&record).await {
            Ok(()) => info!(score_id, "scoring completed"),
            Err(err) => {
                let message = err.to_string();
                warn!(score_id, error = %message, "scoring failed");
                if let Err(store_err) = self.store.fail_score(score_id, &message).await {
                    error!(score_id, error = %store_err, "failed to record scoring failure");
                }
            }
        }
    }

    async fn execute(&self, record: &ScoreRecord) -> Result<()> {
        // thresholds are read per scoring so operational tuning is live
        let patterns = self
            .store
            .recent_patterns(
                self.config.feedback_window_days,
                self.config.feedback_min_occurrences,
            )
            .await?;
        let insight = build_insight_block(&patterns);
        let prompt = build_score_prompt(record, insight.as_deref(), &self.config.language);

        let output = self.engine.run(&prompt).await?;
        let result = match parse_score_output(&output) {
            Ok(result) => result,
            Err(first_err) => {
                // one strict reprompt, then give up
                debug!(score_id = %record.score_id, error = %first_err, "reprompting for strict JSON");
                let retry_output = self.engine.run(&strict_reprompt(&prompt)).await?;
                parse_score_output(&retry_output)?
            }
        };

        if self.config.auto_comment {
            let comment = format_score_comment(record, &result);
            with_retry(&self.retry, || {
                self.github
                    .create_issue_comment(&record.repo, record.issue_number, &comment)
            })
            .await?;
        }

        self.store.complete_score(&record.score_id, &result).await?;
        Ok(())
    }

    /// Analyze one feedback item and fold it into the pattern store
    ///
    /// The model is preferred; the keyword fallback keeps the loop alive
    /// when it is unavailable. The raw text is preserved either way.
    pub async fn analyze_feedback(&self, score_id: &str, text: &str) {
        let (analysis, analyzer) = match self.engine.run(&analysis_prompt(text)).await {
            Ok(output) => match parse_analysis_output(&output) {
                Some(analysis) => (analysis, "model"),
                None => {
                    warn!(score_id, "model analysis unparseable, falling back to rules");
                    (analyze_with_rules(text), "rules")
                }
            },
            Err(err) => {
                warn!(score_id, error = %err, "model unavailable, falling back to rules");
                (analyze_with_rules(text), "rules")
            }
        };

        if let Err(err) = self
            .store
            .insert_feedback_event(score_id, &analysis, text, analyzer)
            .await
        {
            error!(score_id, error = %err, "could not persist feedback event");
        }
        match self.store.record_feedback_pattern(&analysis, text).await {
            Ok(pattern) => debug!(
                score_id,
                pattern = %pattern.pattern_key,
                occurrences = pattern.occurrence_count,
                "feedback folded into pattern"
            ),
            Err(err) => error!(score_id, error = %err, "could not update feedback pattern"),
        }
    }

    /// Compute and persist a snapshot over the last 24 hours
    pub async fn take_snapshot(&self) -> Result<FeedbackSnapshot> {
        let now = Utc::now();
        let events = self.store.feedback_events_since(now - Duration::hours(24)).await?;

        let total = events.len() as i64;
        let positive = events.iter().filter(|e| e.sentiment == Sentiment::Positive).count() as i64;
        let negative = events.iter().filter(|e| e.sentiment == Sentiment::Negative).count() as i64;
        let neutral = total - positive - negative;

        let mut issue_counts: HashMap<&str, i64> = HashMap::new();
        for event in &events {
            if !event.identified_issue.is_empty() {
                *issue_counts.entry(event.identified_issue.as_str()).or_default() += 1;
            }
        }
        let mut ranked: Vec<(&str, i64)> = issue_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let top_issues: Vec<&str> = ranked.iter().take(5).map(|(issue, _)| *issue).collect();

        let patterns = self
            .store
            .recent_patterns(
                self.config.feedback_window_days,
                self.config.feedback_min_occurrences,
            )
            .await?;
        let learning_insights: Vec<String> = build_insight_block(&patterns)
            .map(|block| block.lines().map(|l| l.to_string()).collect())
            .unwrap_or_default();
        let mut prompt_adjustments: Vec<String> = Vec::new();
        for pattern in &patterns {
            if !pattern.suggested_adjustment.is_empty()
                && !prompt_adjustments.contains(&pattern.suggested_adjustment)
            {
                prompt_adjustments.push(pattern.suggested_adjustment.clone());
            }
        }
        prompt_adjustments.truncate(5);

        let top_issues = serde_json::json!(top_issues);
        let learning_insights = serde_json::json!(learning_insights);
        let prompt_adjustments = serde_json::json!(prompt_adjustments);
        let id = self
            .store
            .insert_snapshot(
                now,
                total,
                positive,
                negative,
                neutral,
                &top_issues,
                &learning_insights,
                &prompt_adjustments,
            )
            .await?;
        Ok(FeedbackSnapshot {
            id,
            snapshot_date: now,
            total_feedback: total,
            positive_count: positive,
            negative_count: negative,
            neutral_count: neutral,
            top_issues: top_issues.to_string(),
            learning_insights: learning_insights.to_string(),
            prompt_adjustments: prompt_adjustments.to_string(),
            created_at: now,
        })
    }
}

#[async_trait]
impl JobHandler<ScoreJob> for ScorerService {
    async fn handle(&self, job: ScoreJob) {
        match job {
            ScoreJob::Score { score_id } => self.run_score(&score_id).await,
            ScoreJob::Feedback { score_id, text } => {
                self.analyze_feedback(&score_id, &text).await
            }
        }
    }
}
