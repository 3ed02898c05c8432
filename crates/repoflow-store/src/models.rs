//! Core data models for the task store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a queued unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted, waiting for a pool worker
    Queued,
    /// A pool worker is on it
    Processing,
    /// Finished successfully (terminal)
    Completed,
    /// Finished with an error (terminal)
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "queued"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a copy or comment-sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CopyStatus {
    /// Everything replicated
    Success,
    /// The primary action landed but some images or labels were skipped
    Partial,
    /// The primary action itself failed
    Failed,
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyStatus::Success => write!(f, "success"),
            CopyStatus::Partial => write!(f, "partial"),
            CopyStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Classification of scored content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ContentType {
    /// Bug report
    Bug,
    /// Work item
    Task,
    /// Feature request
    Feature,
    /// Test execution report
    TestResult,
    /// Issue comment
    Comment,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Bug => write!(f, "bug"),
            ContentType::Task => write!(f, "task"),
            ContentType::Feature => write!(f, "feature"),
            ContentType::TestResult => write!(f, "test_result"),
            ContentType::Comment => write!(f, "comment"),
        }
    }
}

/// Sentiment of a user feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Sentiment {
    /// Agreement with the score
    Positive,
    /// Disagreement with the score
    Negative,
    /// Neither
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// What kind of complaint or praise a feedback item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FeedbackType {
    /// Users think the score is too low
    TooHarsh,
    /// Users think the score is too high
    TooLenient,
    /// The scorer missed a real problem
    MissedIssue,
    /// The score was on point
    GoodFeedback,
    /// The score feedback was hard to understand
    Unclear,
    /// Anything else
    Other,
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackType::TooHarsh => write!(f, "too_harsh"),
            FeedbackType::TooLenient => write!(f, "too_lenient"),
            FeedbackType::MissedIssue => write!(f, "missed_issue"),
            FeedbackType::GoodFeedback => write!(f, "good_feedback"),
            FeedbackType::Unclear => write!(f, "unclear"),
            FeedbackType::Other => write!(f, "other"),
        }
    }
}

/// Scoring axis a feedback item talks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Dimension {
    /// Structure and required sections
    Format,
    /// Substance and completeness
    Content,
    /// Readability
    Clarity,
    /// Whether a reader can act on it
    Actionability,
    /// The aggregate score
    Overall,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Format => write!(f, "format"),
            Dimension::Content => write!(f, "content"),
            Dimension::Clarity => write!(f, "clarity"),
            Dimension::Actionability => write!(f, "actionability"),
            Dimension::Overall => write!(f, "overall"),
        }
    }
}

/// What happened when a webhook tried to enqueue work that may already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A fresh record was created; the caller should enqueue
    Created,
    /// A terminal record was reset to queued; the caller should enqueue
    Requeued,
    /// A live record already covers this key; the caller must not enqueue
    Collapsed,
    /// A completed record already covers this key; nothing to do
    AlreadyDone,
}

impl UpsertOutcome {
    /// Whether the caller should hand the work to the pool
    pub fn should_enqueue(&self) -> bool {
        matches!(self, UpsertOutcome::Created | UpsertOutcome::Requeued)
    }
}

/// One PR's automated review, from enqueue to posted comment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewTask {
    /// `repo#pr` key
    pub task_id: String,
    /// Repository full name
    pub repo: String,
    /// Pull request number
    pub pr_number: i64,
    /// Pull request title
    pub pr_title: String,
    /// Pull request author login
    pub pr_author: String,
    /// Pull request HTML URL
    pub pr_url: String,
    /// Lifecycle status
    pub status: TaskStatus,
    /// Progress in [0, 100], never decreasing
    pub progress: i64,
    /// Human-readable stage message
    pub message: String,
    /// The posted review text, once completed
    pub review_content: Option<String>,
    /// Failure detail, once failed
    pub error_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// Terminal time
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields needed to create a review task
#[derive(Debug, Clone)]
pub struct NewReviewTask {
    /// Repository full name
    pub repo: String,
    /// Pull request number
    pub pr_number: i64,
    /// Pull request title
    pub pr_title: String,
    /// Pull request author login
    pub pr_author: String,
    /// Pull request HTML URL
    pub pr_url: String,
}

impl NewReviewTask {
    /// The `repo#pr` task key
    pub fn task_id(&self) -> String {
        format!("{}#{}", self.repo, self.pr_number)
    }
}

/// One (source issue → target repo) replication
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CopyRecord {
    /// Row id
    pub id: i64,
    /// Source repository full name
    pub source_repo: String,
    /// Source issue number
    pub source_issue_number: i64,
    /// Source issue HTML URL
    pub source_issue_url: String,
    /// Target repository full name
    pub target_repo: String,
    /// Created issue number on the target, when creation succeeded
    pub target_issue_number: Option<i64>,
    /// Created issue HTML URL
    pub target_issue_url: Option<String>,
    /// JSON list of label names applied on the target
    pub labels_copied: String,
    /// JSON list of `{original_url, new_url}` pairs
    pub images_reuploaded: String,
    /// Replication outcome
    pub status: CopyStatus,
    /// Failure detail
    pub error_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl CopyRecord {
    /// Decode the copied-labels JSON column
    pub fn labels(&self) -> Vec<String> {
        serde_json::from_str(&self.labels_copied).unwrap_or_default()
    }

    /// Decode the re-uploaded-images JSON column
    pub fn images(&self) -> Vec<ImageReupload> {
        serde_json::from_str(&self.images_reuploaded).unwrap_or_default()
    }
}

/// Fields needed to record a replication attempt
#[derive(Debug, Clone)]
pub struct NewCopyRecord {
    /// Source repository full name
    pub source_repo: String,
    /// Source issue number
    pub source_issue_number: i64,
    /// Source issue HTML URL
    pub source_issue_url: String,
    /// Target repository full name
    pub target_repo: String,
    /// Created issue number on the target
    pub target_issue_number: Option<i64>,
    /// Created issue HTML URL
    pub target_issue_url: Option<String>,
    /// Label names applied on the target
    pub labels_copied: Vec<String>,
    /// Re-hosted images
    pub images_reuploaded: Vec<ImageReupload>,
    /// Replication outcome
    pub status: CopyStatus,
    /// Failure detail
    pub error_message: Option<String>,
}

/// Fields needed to record a comment mirror
#[derive(Debug, Clone)]
pub struct NewCommentSync {
    /// GitHub comment id on the source issue
    pub source_comment_id: i64,
    /// Source repository full name
    pub source_repo: String,
    /// Source issue number
    pub source_issue_number: i64,
    /// Target repository full name
    pub target_repo: String,
    /// Target issue number
    pub target_issue_number: i64,
    /// Created comment id on the target
    pub target_comment_id: Option<i64>,
    /// Mirror outcome
    pub status: CopyStatus,
}

/// Counts of copy records by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyCounts {
    /// Fully replicated
    pub success: i64,
    /// Replicated with skipped images or labels
    pub partial: i64,
    /// Issue creation failed
    pub failed: i64,
    /// All records
    pub total: i64,
}

/// An original image URL and where it was re-hosted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReupload {
    /// URL found in the source body
    pub original_url: String,
    /// Raw URL on the target's assets branch
    pub new_url: String,
}

/// One (source comment → target issue) mirror
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentSyncRecord {
    /// Row id
    pub id: i64,
    /// GitHub comment id on the source issue
    pub source_comment_id: i64,
    /// Source repository full name
    pub source_repo: String,
    /// Source issue number
    pub source_issue_number: i64,
    /// Target repository full name
    pub target_repo: String,
    /// Target issue number
    pub target_issue_number: i64,
    /// Created comment id on the target, when posting succeeded
    pub target_comment_id: Option<i64>,
    /// Mirror outcome
    pub status: CopyStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// One scoring event on an issue or comment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreRecord {
    /// Stable identifier
    pub score_id: String,
    /// Idempotency key, `repo#issue` or `repo#issue#comment`
    pub dedupe_key: String,
    /// Repository full name
    pub repo: String,
    /// Issue number
    pub issue_number: i64,
    /// Comment id when scoring a comment, null when scoring the issue
    pub comment_id: Option<i64>,
    /// Content classification
    pub content_type: ContentType,
    /// Title snapshot
    pub title: String,
    /// Body snapshot
    pub body: String,
    /// Author login
    pub author: String,
    /// Issue HTML URL
    pub issue_url: String,
    /// Format dimension score
    pub format_score: Option<i64>,
    /// Format dimension feedback
    pub format_feedback: Option<String>,
    /// Content dimension score
    pub content_score: Option<i64>,
    /// Content dimension feedback
    pub content_feedback: Option<String>,
    /// Clarity dimension score
    pub clarity_score: Option<i64>,
    /// Clarity dimension feedback
    pub clarity_feedback: Option<String>,
    /// Actionability dimension score
    pub actionability_score: Option<i64>,
    /// Actionability dimension feedback
    pub actionability_feedback: Option<String>,
    /// Overall score
    pub overall_score: Option<i64>,
    /// Improvement suggestions
    pub suggestions: Option<String>,
    /// Lifecycle status
    pub status: TaskStatus,
    /// Failure detail
    pub error_message: Option<String>,
    /// Accumulated free-text user feedback
    pub user_feedback: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Terminal time
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields needed to create a score record
#[derive(Debug, Clone)]
pub struct NewScoreRecord {
    /// Repository full name
    pub repo: String,
    /// Issue number
    pub issue_number: i64,
    /// Comment id when scoring a comment
    pub comment_id: Option<i64>,
    /// Content classification
    pub content_type: ContentType,
    /// Title snapshot
    pub title: String,
    /// Body snapshot
    pub body: String,
    /// Author login
    pub author: String,
    /// Issue HTML URL
    pub issue_url: String,
}

impl NewScoreRecord {
    /// The idempotency key for this scoring event
    pub fn dedupe_key(&self) -> String {
        match self.comment_id {
            Some(comment_id) => format!("{}#{}#{}", self.repo, self.issue_number, comment_id),
            None => format!("{}#{}", self.repo, self.issue_number),
        }
    }
}

/// Parsed, validated output of one scoring run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Format score in [0, 100]
    pub format_score: i64,
    /// Format feedback
    pub format_feedback: String,
    /// Content score in [0, 100]
    pub content_score: i64,
    /// Content feedback
    pub content_feedback: String,
    /// Clarity score in [0, 100]
    pub clarity_score: i64,
    /// Clarity feedback
    pub clarity_feedback: String,
    /// Actionability score in [0, 100]
    pub actionability_score: i64,
    /// Actionability feedback
    pub actionability_feedback: String,
    /// Overall score in [0, 100]
    pub overall_score: i64,
    /// Improvement suggestions
    pub suggestions: String,
}

/// Structured analysis of one user feedback item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAnalysis {
    /// Sentiment of the feedback
    pub sentiment: Sentiment,
    /// Complaint or praise classification
    pub feedback_type: FeedbackType,
    /// Dimension the feedback talks about
    pub dimension: Dimension,
    /// Signed points users think the score was off by (positive = should be higher)
    pub score_deviation: i64,
    /// What the user says went wrong
    pub identified_issue: String,
    /// What the analyzer suggests changing
    pub suggested_adjustment: String,
}

/// One analyzed user feedback item, kept for snapshots and re-analysis
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedbackEvent {
    /// Row id
    pub id: i64,
    /// Score record this feedback was left on
    pub score_id: String,
    /// Sentiment of the feedback
    pub sentiment: Sentiment,
    /// Complaint or praise classification
    pub feedback_type: FeedbackType,
    /// Dimension the feedback talks about
    pub dimension: Dimension,
    /// Signed score deviation
    pub score_deviation: i64,
    /// What the user says went wrong
    pub identified_issue: String,
    /// What the analyzer suggests changing
    pub suggested_adjustment: String,
    /// The raw feedback text as submitted
    pub raw_text: String,
    /// Which analyzer produced this row ("model" or "rules")
    pub analyzer: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Aggregate of feedback items sharing (feedback_type, dimension)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedbackPattern {
    /// `{feedback_type}:{dimension}` key
    pub pattern_key: String,
    /// Complaint or praise classification
    pub pattern_type: FeedbackType,
    /// Dimension the pattern covers
    pub dimension: Dimension,
    /// Number of feedback items folded into this pattern
    pub occurrence_count: i64,
    /// Sum of signed deviations, kept for the running mean
    pub deviation_sum: f64,
    /// Running mean of signed deviations
    pub avg_score_deviation: f64,
    /// JSON list of example feedback texts, capped at 5
    pub example_feedbacks: String,
    /// Latest identified issue
    pub identified_issue: String,
    /// Latest suggested adjustment
    pub suggested_adjustment: String,
    /// When a contributing item was last seen
    pub last_seen: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl FeedbackPattern {
    /// Decode the example-feedbacks JSON column
    pub fn examples(&self) -> Vec<String> {
        serde_json::from_str(&self.example_feedbacks).unwrap_or_default()
    }

    /// Whether the row is internally consistent
    pub fn is_consistent(&self) -> bool {
        self.occurrence_count >= 1 && self.last_seen >= self.created_at
    }
}

/// Periodic aggregate over recent feedback
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedbackSnapshot {
    /// Row id
    pub id: i64,
    /// Day the snapshot covers
    pub snapshot_date: DateTime<Utc>,
    /// Total feedback items in the window
    pub total_feedback: i64,
    /// Positive items
    pub positive_count: i64,
    /// Negative items
    pub negative_count: i64,
    /// Neutral items
    pub neutral_count: i64,
    /// JSON list of the most frequent identified issues
    pub top_issues: String,
    /// JSON list of learning insights
    pub learning_insights: String,
    /// JSON list of recommended prompt adjustments
    pub prompt_adjustments: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Counts of records by status, plus the total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Queued records
    pub queued: i64,
    /// Processing records
    pub processing: i64,
    /// Completed records
    pub completed: i64,
    /// Failed records
    pub failed: i64,
    /// All records
    pub total: i64,
}
