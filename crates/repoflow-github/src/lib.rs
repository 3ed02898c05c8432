//! GitHub integration for repoflow
//!
//! Webhook signature verification, a typed subset of the webhook payloads
//! the workers consume, and a REST client wrapping octocrab (plus plain
//! reqwest for raw byte downloads) behind a retry policy that tells
//! transient failures from permanent ones.

pub mod client;
pub mod errors;
pub mod models;
pub mod retry;
pub mod signature;

pub use client::{ChangedFile, CreatedComment, CreatedIssue, GitHubClient, PullDetails};
pub use errors::GitHubError;
pub use models::{
    IssueCommentEvent, IssuesEvent, PullRequestEvent, WebhookComment, WebhookEventType,
    WebhookIssue, WebhookLabel, WebhookPullRequest, WebhookRepository, WebhookUser,
    repo_full_name,
};
pub use retry::{with_retry, RetryPolicy};
pub use signature::{sign, verify_signature};
