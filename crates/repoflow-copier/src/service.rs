//! Issue replication and comment mirroring

use std::sync::Arc;

use async_trait::async_trait;
use repoflow_config::IssueCopyConfig;
use repoflow_github::{
    with_retry, CreatedComment, CreatedIssue, GitHubClient, GitHubError, IssueCommentEvent,
    IssuesEvent, RetryPolicy, WebhookIssue,
};
use repoflow_pool::JobHandler;
use repoflow_store::{
    CopyStatus, ImageReupload, NewCommentSync, NewCopyRecord, Store,
};
use tracing::{debug, info, warn};

use crate::{
    routing::resolve_targets,
    transform::{
        asset_raw_url, find_image_urls, has_attachments, is_github_hosted, rewrite_issue_refs,
        stable_asset_name,
    },
};

/// Branch used as the asset store on every target repository
const ASSETS_BRANCH: &str = "assets";

/// GitHub operations the copier needs
#[async_trait]
pub trait CopierGitHub: Send + Sync {
    /// Create an issue with labels
    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: Vec<String>,
    ) -> std::result::Result<CreatedIssue, GitHubError>;
    /// Post an issue comment
    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> std::result::Result<CreatedComment, GitHubError>;
    /// Names of all labels on a repository
    async fn list_repo_labels(&self, repo: &str) -> std::result::Result<Vec<String>, GitHubError>;
    /// Ensure a branch exists, creating it from the default branch
    async fn ensure_branch(&self, repo: &str, branch: &str) -> std::result::Result<(), GitHubError>;
    /// Commit a file to a branch
    async fn put_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> std::result::Result<(), GitHubError>;
    /// Download raw bytes
    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, GitHubError>;
}

#[async_trait]
impl CopierGitHub for GitHubClient {
    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: Vec<String>,
    ) -> std::result::Result<CreatedIssue, GitHubError> {
        GitHubClient::create_issue(self, repo, title, body, labels).await
    }

    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> std::result::Result<CreatedComment, GitHubError> {
        GitHubClient::create_issue_comment(self, repo, number, body).await
    }

    async fn list_repo_labels(&self, repo: &str) -> std::result::Result<Vec<String>, GitHubError> {
        GitHubClient::list_repo_labels(self, repo).await
    }

    async fn ensure_branch(&self, repo: &str, branch: &str) -> std::result::Result<(), GitHubError> {
        GitHubClient::ensure_branch(self, repo, branch).await
    }

    async fn put_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> std::result::Result<(), GitHubError> {
        GitHubClient::put_file(self, repo, branch, path, message, content).await
    }

    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, GitHubError> {
        GitHubClient::download(self, url).await
    }
}

/// A unit of work for the pool
#[derive(Debug, Clone)]
pub enum CopyJob {
    /// Replicate an issue to its targets
    Issue(Box<IssuesEvent>),
    /// Mirror a comment onto existing copies
    Comment(Box<IssueCommentEvent>),
}

impl CopyJob {
    /// Shard key: all work for one source issue runs in arrival order
    pub fn shard_key(&self) -> String {
        match self {
            CopyJob::Issue(event) => {
                format!("{}#{}", event.repository.full_name, event.issue.number)
            }
            CopyJob::Comment(event) => {
                format!("{}#{}", event.repository.full_name, event.issue.number)
            }
        }
    }
}

/// Outcome of one body transformation pass
struct TransformedBody {
    body: String,
    images: Vec<ImageReupload>,
    image_failures: usize,
}

/// Drives issue replication and comment mirroring
pub struct CopierService {
    store: Store,
    github: Arc<dyn CopierGitHub>,
    config: IssueCopyConfig,
    retry: RetryPolicy,
}

impl CopierService {
    /// Create a service
    pub fn new(store: Store, github: Arc<dyn CopierGitHub>, config: IssueCopyConfig) -> Self {
        Self {
            store,
            github,
            config,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy (tests)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replicate an issue to every routed target lacking a live copy
    ///
    /// A failure on one target never blocks the others.
    pub async fn replicate_issue(&self, event: &IssuesEvent) {
        let issue = &event.issue;
        let labels = issue.label_names();
        let targets = resolve_targets(&labels, &self.config);
        if targets.is_empty() {
            debug!(issue = issue.number, "no routing target for labels {:?}", labels);
            return;
        }
        for target in targets {
            match self.store.has_live_copy(&self.config.source_repo, issue.number, &target).await {
                Ok(true) => {
                    debug!(issue = issue.number, target = %target, "copy already exists");
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(issue = issue.number, target = %target, error = %err,
                          "could not check for existing copy");
                    continue;
                }
            }
            self.replicate_to_target(issue, &target).await;
        }
    }

    async fn replicate_to_target(&self, issue: &WebhookIssue, target: &str) {
        let source_repo = &self.config.source_repo;
        let raw_body = issue.body.clone().unwrap_or_default();

        let transformed = if self.config.reupload_images {
            self.rehost_images(&raw_body, target).await
        } else {
            TransformedBody { body: raw_body, images: Vec::new(), image_failures: 0 }
        };
        let mut body = rewrite_issue_refs(&transformed.body, source_repo);

        if self.config.add_source_reference {
            body.push_str(&format!(
                "\n\n---\n*Copied from {}#{}: {}*",
                source_repo, issue.number, issue.html_url
            ));
        }

        let (labels_to_apply, labels_skipped) = self.labels_for_target(issue, target).await;

        let created = with_retry(&self.retry, || {
            self.github
                .create_issue(target, &issue.title, &body, labels_to_apply.clone())
        })
        .await;

        let record = match created {
            Ok(created) => {
                info!(source = issue.number, target = %target, created = created.number,
                      "issue replicated");
                if self.config.add_copy_comment {
                    let note = format!(
                        "Copied to {}#{}: {}",
                        target, created.number, created.html_url
                    );
                    if let Err(err) = self
                        .github
                        .create_issue_comment(source_repo, issue.number, &note)
                        .await
                    {
                        warn!(issue = issue.number, error = %err, "could not post copy comment");
                    }
                }
                let partial = transformed.image_failures > 0 || labels_skipped > 0;
                NewCopyRecord {
                    source_repo: source_repo.clone(),
                    source_issue_number: issue.number,
                    source_issue_url: issue.html_url.clone(),
                    target_repo: target.to_string(),
                    target_issue_number: Some(created.number),
                    target_issue_url: Some(created.html_url),
                    labels_copied: labels_to_apply,
                    images_reuploaded: transformed.images,
                    status: if partial { CopyStatus::Partial } else { CopyStatus::Success },
                    error_message: None,
                }
            }
            Err(err) => {
                warn!(issue = issue.number, target = %target, error = %err,
                      "issue replication failed");
                NewCopyRecord {
                    source_repo: source_repo.clone(),
                    source_issue_number: issue.number,
                    source_issue_url: issue.html_url.clone(),
                    target_repo: target.to_string(),
                    target_issue_number: None,
                    target_issue_url: None,
                    labels_copied: Vec::new(),
                    images_reuploaded: Vec::new(),
                    status: CopyStatus::Failed,
                    error_message: Some(err.to_string()),
                }
            }
        };

        // a racing duplicate fails the unique key and is a no-op
        if let Err(err) = self.store.record_copy(&record).await {
            warn!(issue = issue.number, target = %target, error = %err,
                  "could not persist copy record");
        }
    }

    /// Mirror a source comment onto every existing copy of its issue
    pub async fn mirror_comment(&self, event: &IssueCommentEvent) {
        let source_repo = &self.config.source_repo;
        let issue = &event.issue;
        let comment = &event.comment;
        let copies = match self
            .store
            .copies_for_source_issue(source_repo, issue.number)
            .await
        {
            Ok(copies) => copies,
            Err(err) => {
                warn!(issue = issue.number, error = %err, "could not load copies for mirroring");
                return;
            }
        };
        if copies.is_empty() {
            debug!(issue = issue.number, "no copies to mirror comment onto");
            return;
        }
        let raw_body = comment.body.clone().unwrap_or_default();

        for copy in copies {
            let target_issue = match copy.target_issue_number {
                Some(number) => number,
                None => continue,
            };
            match self
                .store
                .has_comment_sync(comment.id, &copy.target_repo, target_issue)
                .await
            {
                Ok(true) => {
                    debug!(comment = comment.id, target = %copy.target_repo,
                           "comment already mirrored");
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(comment = comment.id, error = %err, "could not check comment sync");
                    continue;
                }
            }

            let transformed = if self.config.reupload_images {
                self.rehost_images(&raw_body, &copy.target_repo).await
            } else {
                TransformedBody { body: raw_body.clone(), images: Vec::new(), image_failures: 0 }
            };
            let body = rewrite_issue_refs(&transformed.body, source_repo);

            let mut mirror = format!(
                "**@{}** [commented]({}) on {}#{}:\n\n{}",
                comment.user.login, comment.html_url, source_repo, issue.number, body
            );
            if has_attachments(&raw_body) {
                mirror.push_str(
                    "\n\n> Attachments may be updated on the source; \
                     see the original comment for the latest version.",
                );
            }

            let posted = with_retry(&self.retry, || {
                self.github
                    .create_issue_comment(&copy.target_repo, target_issue, &mirror)
            })
            .await;

            let sync = match posted {
                Ok(created) => NewCommentSync {
                    source_comment_id: comment.id,
                    source_repo: source_repo.clone(),
                    source_issue_number: issue.number,
                    target_repo: copy.target_repo.clone(),
                    target_issue_number: target_issue,
                    target_comment_id: Some(created.id),
                    status: if transformed.image_failures > 0 {
                        CopyStatus::Partial
                    } else {
                        CopyStatus::Success
                    },
                },
                Err(err) => {
                    warn!(comment = comment.id, target = %copy.target_repo, error = %err,
                          "comment mirror failed");
                    NewCommentSync {
                        source_comment_id: comment.id,
                        source_repo: source_repo.clone(),
                        source_issue_number: issue.number,
                        target_repo: copy.target_repo.clone(),
                        target_issue_number: target_issue,
                        target_comment_id: None,
                        status: CopyStatus::Failed,
                    }
                }
            };
            if let Err(err) = self.store.record_comment_sync(&sync).await {
                warn!(comment = comment.id, error = %err, "could not persist comment sync");
            }
        }
    }

    /// Re-host non-GitHub images onto the target's assets branch
    ///
    /// Per-image failures skip that image only; the caller downgrades the
    /// copy to partial.
    async fn rehost_images(&self, body: &str, target: &str) -> TransformedBody {
        let candidates: Vec<String> = find_image_urls(body)
            .into_iter()
            .filter(|url| !is_github_hosted(url))
            .collect();
        if candidates.is_empty() {
            return TransformedBody { body: body.to_string(), images: Vec::new(), image_failures: 0 };
        }

        if let Err(err) = self.github.ensure_branch(target, ASSETS_BRANCH).await {
            warn!(target = %target, error = %err, "could not prepare assets branch");
            return TransformedBody {
                body: body.to_string(),
                images: Vec::new(),
                image_failures: candidates.len(),
            };
        }

        let mut out = body.to_string();
        let mut images = Vec::new();
        let mut failures = 0;
        for url in candidates {
            match self.rehost_one(&url, target).await {
                Ok(new_url) => {
                    out = out.replace(&url, &new_url);
                    images.push(ImageReupload { original_url: url, new_url });
                }
                Err(err) => {
                    warn!(url = %url, target = %target, error = %err, "image re-host failed");
                    failures += 1;
                }
            }
        }
        TransformedBody { body: out, images, image_failures: failures }
    }

    async fn rehost_one(&self, url: &str, target: &str) -> std::result::Result<String, GitHubError> {
        let bytes = self.github.download(url).await?;
        let path = format!("images/{}", stable_asset_name(url));
        let message = format!("Add re-hosted image {}", path);
        match self
            .github
            .put_file(target, ASSETS_BRANCH, &path, &message, &bytes)
            .await
        {
            Ok(()) => {}
            // 422: the path already exists from an earlier attempt
            Err(GitHubError::Api { status: 422, .. }) => {
                debug!(path = %path, target = %target, "asset already uploaded");
            }
            Err(err) => return Err(err),
        }
        Ok(asset_raw_url(target, &path))
    }

    async fn labels_for_target(&self, issue: &WebhookIssue, target: &str) -> (Vec<String>, usize) {
        if !self.config.copy_labels {
            return (Vec::new(), 0);
        }
        let requested = issue.label_names();
        if requested.is_empty() {
            return (Vec::new(), 0);
        }
        match self.github.list_repo_labels(target).await {
            Ok(existing) => {
                let applied: Vec<String> = requested
                    .iter()
                    .filter(|label| existing.contains(label))
                    .cloned()
                    .collect();
                let skipped = requested.len() - applied.len();
                if skipped > 0 {
                    debug!(target = %target, skipped, "labels missing on target, skipped");
                }
                (applied, skipped)
            }
            Err(err) => {
                warn!(target = %target, error = %err, "could not list target labels");
                (Vec::new(), requested.len())
            }
        }
    }
}

#[async_trait]
impl JobHandler<CopyJob> for CopierService {
    async fn handle(&self, job: CopyJob) {
        match job {
            CopyJob::Issue(event) => self.replicate_issue(&event).await,
            CopyJob::Comment(event) => self.mirror_comment(&event).await,
        }
    }
}
