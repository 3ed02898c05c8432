//! Durable task store for repoflow
//!
//! A single embedded SQLite database holds every worker's records: review
//! tasks, issue-copy records, comment-sync records, score records, feedback
//! events, feedback patterns, and feedback snapshots. Uniqueness constraints
//! live in the schema so webhook re-delivery cannot duplicate side effects,
//! and lifecycle updates are guarded in SQL so status never moves backwards
//! and progress never decreases.

pub mod copies;
pub mod error;
pub mod feedback;
pub mod models;
pub mod review_tasks;
pub mod schema;
pub mod scores;
pub mod store;

pub use error::StoreError;
pub use models::{
    CommentSyncRecord, ContentType, CopyCounts, CopyRecord, CopyStatus, Dimension,
    FeedbackAnalysis, FeedbackEvent, FeedbackPattern, FeedbackSnapshot, FeedbackType,
    ImageReupload, NewCommentSync, NewCopyRecord, NewReviewTask, NewScoreRecord, ReviewTask,
    ScoreRecord, ScoreResult, Sentiment, StatusCounts, TaskStatus, UpsertOutcome,
};
pub use store::Store;
