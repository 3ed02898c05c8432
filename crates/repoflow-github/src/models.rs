//! Typed subset of GitHub webhook payloads
//!
//! Only the fields the workers actually consume are modeled; unknown keys
//! are ignored by serde. Deserialization failure on a required key is the
//! caller's cue to log and drop the event.

use serde::{Deserialize, Serialize};

/// Webhook event type, from the `X-GitHub-Event` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Endpoint liveness check sent by GitHub on hook creation
    Ping,
    /// Pull request event
    PullRequest,
    /// Issues event
    Issues,
    /// Issue comment event
    IssueComment,
    /// Anything else
    #[serde(other)]
    Unknown,
}

impl WebhookEventType {
    /// Parse the `X-GitHub-Event` header value
    pub fn from_header(value: &str) -> Self {
        match value {
            "ping" => WebhookEventType::Ping,
            "pull_request" => WebhookEventType::PullRequest,
            "issues" => WebhookEventType::Issues,
            "issue_comment" => WebhookEventType::IssueComment,
            _ => WebhookEventType::Unknown,
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventType::Ping => write!(f, "ping"),
            WebhookEventType::PullRequest => write!(f, "pull_request"),
            WebhookEventType::Issues => write!(f, "issues"),
            WebhookEventType::IssueComment => write!(f, "issue_comment"),
            WebhookEventType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Repository block present in every event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRepository {
    /// `owner/name`
    pub full_name: String,
}

/// Actor block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookUser {
    /// GitHub login
    pub login: String,
}

/// Label block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookLabel {
    /// Label name
    pub name: String,
}

/// Issue block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookIssue {
    /// Issue number
    pub number: i64,
    /// Title
    pub title: String,
    /// Body; GitHub sends null for empty bodies
    #[serde(default)]
    pub body: Option<String>,
    /// HTML URL
    pub html_url: String,
    /// Author
    pub user: WebhookUser,
    /// Labels on the issue
    #[serde(default)]
    pub labels: Vec<WebhookLabel>,
}

impl WebhookIssue {
    /// Label names on the issue
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}

/// Issue comment block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookComment {
    /// Comment id
    pub id: i64,
    /// Body
    #[serde(default)]
    pub body: Option<String>,
    /// HTML URL
    pub html_url: String,
    /// Author
    pub user: WebhookUser,
}

/// Pull request block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPullRequest {
    /// Pull request number
    pub number: i64,
    /// Title
    pub title: String,
    /// Body
    #[serde(default)]
    pub body: Option<String>,
    /// Draft flag
    #[serde(default)]
    pub draft: bool,
    /// HTML URL
    pub html_url: String,
    /// Author
    pub user: WebhookUser,
    /// Labels on the pull request
    #[serde(default)]
    pub labels: Vec<WebhookLabel>,
}

impl WebhookPullRequest {
    /// Whether the PR carries a label with this name
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

/// `pull_request` event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// Event action ("opened", "synchronize", ...)
    pub action: String,
    /// Repository the event fired on
    pub repository: WebhookRepository,
    /// The pull request
    pub pull_request: WebhookPullRequest,
}

/// `issues` event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesEvent {
    /// Event action ("opened", "labeled", ...)
    pub action: String,
    /// Repository the event fired on
    pub repository: WebhookRepository,
    /// The issue
    pub issue: WebhookIssue,
    /// The label added, on "labeled" actions
    #[serde(default)]
    pub label: Option<WebhookLabel>,
}

/// `issue_comment` event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    /// Event action ("created", ...)
    pub action: String,
    /// Repository the event fired on
    pub repository: WebhookRepository,
    /// The issue commented on
    pub issue: WebhookIssue,
    /// The comment
    pub comment: WebhookComment,
}

/// Pull the repository full name out of a raw webhook body, if present
///
/// The gateway routes on this without committing to a full event schema.
pub fn repo_full_name(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct Peek {
        repository: Option<WebhookRepository>,
    }
    serde_json::from_slice::<Peek>(body)
        .ok()
        .and_then(|peek| peek.repository)
        .map(|repo| repo.full_name)
}
