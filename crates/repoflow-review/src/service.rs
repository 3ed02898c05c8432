//! Review task execution

use std::sync::Arc;

use async_trait::async_trait;
use repoflow_config::ReviewConfig;
use repoflow_engine::Engine;
use repoflow_github::{
    with_retry, ChangedFile, CreatedComment, GitHubClient, GitHubError, PullDetails, RetryPolicy,
};
use repoflow_pool::JobHandler;
use repoflow_store::{ReviewTask, Store};
use tracing::{error, info, warn};

use crate::{
    error::Result,
    prompt::{build_prompt, render_diff, ATTRIBUTION},
};

/// GitHub operations the review worker needs
///
/// A seam so the state machine is testable without the network.
#[async_trait]
pub trait ReviewGitHub: Send + Sync {
    /// Fetch pull request metadata
    async fn pull_details(&self, repo: &str, number: i64) -> std::result::Result<PullDetails, GitHubError>;
    /// Fetch the changed files with patches
    async fn pull_files(&self, repo: &str, number: i64) -> std::result::Result<Vec<ChangedFile>, GitHubError>;
    /// Post a PR comment
    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> std::result::Result<CreatedComment, GitHubError>;
    /// Add labels to the PR
    async fn add_labels(
        &self,
        repo: &str,
        number: i64,
        labels: &[String],
    ) -> std::result::Result<(), GitHubError>;
}

#[async_trait]
impl ReviewGitHub for GitHubClient {
    async fn pull_details(&self, repo: &str, number: i64) -> std::result::Result<PullDetails, GitHubError> {
        GitHubClient::pull_details(self, repo, number).await
    }

    async fn pull_files(&self, repo: &str, number: i64) -> std::result::Result<Vec<ChangedFile>, GitHubError> {
        GitHubClient::pull_files(self, repo, number).await
    }

    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> std::result::Result<CreatedComment, GitHubError> {
        GitHubClient::create_issue_comment(self, repo, number, body).await
    }

    async fn add_labels(
        &self,
        repo: &str,
        number: i64,
        labels: &[String],
    ) -> std::result::Result<(), GitHubError> {
        GitHubClient::add_labels(self, repo, number, labels).await
    }
}

/// A unit of work for the pool: run the review for one task
#[derive(Debug, Clone)]
pub struct ReviewJob {
    /// `repo#pr` task key
    pub task_id: String,
}

/// Drives review tasks through their lifecycle
pub struct ReviewService {
    store: Store,
    github: Arc<dyn ReviewGitHub>,
    engine: Engine,
    config: ReviewConfig,
    retry: RetryPolicy,
}

impl ReviewService {
    /// Create a service
    pub fn new(
        store: Store,
        github: Arc<dyn ReviewGitHub>,
        engine: Engine,
        config: ReviewConfig,
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

    /// Run the review for one task; outcomes land on the task record
    pub async fn run_review(&self, task_id: &str) {
        let task = match self.store.get_review_task(task_id).await {
            Ok(task) => task,
            Err(err) => {
                error!(task_id, error = %err, "review task vanished before execution");
                return;
            }
        };
        if let Err(err) = self.store.mark_review_processing(task_id).await {
            // a collapsed duplicate or an operator reset; nothing to do
            warn!(task_id, error = %err, "skipping review run");
            return;
        }

        match self.execute(&task).await {
            Ok(review) => {
                if let Err(err) = self.store.complete_review_task(task_id, &review).await {
                    error!(task_id, error = %err, "failed to record review completion");
                } else {
                    info!(task_id, "review completed");
                }
            }
            Err(err) => {
                let message = err.to_string();
                warn!(task_id, error = %message, "review failed");
                if let Err(store_err) = self.store.fail_review_task(task_id, &message).await {
                    error!(task_id, error = %store_err, "failed to record review failure");
                }
            }
        }
    }

    async fn execute(&self, task: &ReviewTask) -> Result<String> {
        self.store
            .update_review_progress(&task.task_id, 10, "fetching pull request")
            .await?;
        let pull = with_retry(&self.retry, || {
            self.github.pull_details(&task.repo, task.pr_number)
        })
        .await?;
        let files = with_retry(&self.retry, || {
            self.github.pull_files(&task.repo, task.pr_number)
        })
        .await?;

        let diff = render_diff(&files, self.config.max_diff_chars);
        let prompt = build_prompt(&task.repo, &pull, &diff, &self.config);

        self.store
            .update_review_progress(&task.task_id, 50, "invoking model")
            .await?;
        let review = self.engine.run(&prompt).await?;

        self.store
            .update_review_progress(&task.task_id, 80, "publishing review")
            .await?;
        let body = format!("{}{}", review, ATTRIBUTION);
        with_retry(&self.retry, || {
            self.github
                .create_issue_comment(&task.repo, task.pr_number, &body)
        })
        .await?;

        if self.config.auto_label {
            let labels = vec![self.config.auto_label_name.clone()];
            if let Err(err) = self
                .github
                .add_labels(&task.repo, task.pr_number, &labels)
                .await
            {
                // the review is posted; a label miss is not a task failure
                warn!(task_id = %task.task_id, error = %err, "could not apply auto-review label");
            }
        }

        Ok(review)
    }
}

#[async_trait]
impl JobHandler<ReviewJob> for ReviewService {
    async fn handle(&self, job: ReviewJob) {
        self.run_review(&job.task_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repoflow_engine::EngineConfig;
    use repoflow_store::{NewReviewTask, TaskStatus};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeGitHub {
        comments: Mutex<Vec<String>>,
        labels: Mutex<Vec<String>>,
        fail_details: bool,
    }

    impl FakeGitHub {
        fn new() -> Self {
            Self {
                comments: Mutex::new(Vec::new()),
                labels: Mutex::new(Vec::new()),
                fail_details: false,
            }
        }
    }

    #[async_trait]
    impl ReviewGitHub for FakeGitHub {
        async fn pull_details(
            &self,
            _repo: &str,
            number: i64,
        ) -> std::result::Result<PullDetails, GitHubError> {
            if self.fail_details {
                return Err(GitHubError::NotFound("pull".to_string()));
            }
            Ok(PullDetails {
                number,
                title: "Add thing".to_string(),
                body: "does a thing".to_string(),
                author: "dev".to_string(),
                html_url: String::new(),
                draft: false,
            })
        }

        async fn pull_files(
            &self,
            _repo: &str,
            _number: i64,
        ) -> std::result::Result<Vec<ChangedFile>, GitHubError> {
            Ok(vec![ChangedFile {
                filename: "src/lib.rs".to_string(),
                additions: 2,
                deletions: 0,
                patch: Some("@@ -0,0 +1,2 @@\n+fn thing() {}\n+".to_string()),
            }])
        }

        async fn create_issue_comment(
            &self,
            _repo: &str,
            _number: i64,
            body: &str,
        ) -> std::result::Result<CreatedComment, GitHubError> {
            self.comments.lock().unwrap().push(body.to_string());
            Ok(CreatedComment {
                id: 1,
                html_url: String::new(),
            })
        }

        async fn add_labels(
            &self,
            _repo: &str,
            _number: i64,
            labels: &[String],
        ) -> std::result::Result<(), GitHubError> {
            self.labels.lock().unwrap().extend(labels.iter().cloned());
            Ok(())
        }
    }

    #[cfg(unix)]
    fn fake_cli(dir: &tempfile::TempDir, script: &str) -> Engine {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join("fake-cli.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Engine::new(EngineConfig::new(path, Duration::from_secs(10)).with_args(vec![]))
    }

    async fn seeded_task(store: &Store) -> String {
        let new = NewReviewTask {
            repo: "acme/foo".to_string(),
            pr_number: 42,
            pr_title: "Add thing".to_string(),
            pr_author: "dev".to_string(),
            pr_url: "https://github.com/acme/foo/pull/42".to_string(),
        };
        store.upsert_review_task(&new).await.unwrap();
        new.task_id()
    }

    async fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("test.db")).await.unwrap();
        (dir, store)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn happy_path_posts_one_attributed_comment() {
        let (dir, store) = temp_store().await;
        let task_id = seeded_task(&store).await;
        let github = Arc::new(FakeGitHub::new());
        let service = ReviewService::new(
            store.clone(),
            github.clone(),
            fake_cli(&dir, "cat > /dev/null; echo 'LGTM'"),
            ReviewConfig::default(),
        )
        .with_retry_policy(RetryPolicy::immediate(2));

        service.run_review(&task_id).await;

        let task = store.get_review_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100);
        assert_eq!(task.review_content.as_deref(), Some("LGTM"));

        let comments = github.comments.lock().unwrap();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].starts_with("LGTM"));
        assert!(comments[0].ends_with("*Automated review by repoflow*"));
        assert_eq!(*github.labels.lock().unwrap(), vec!["ai-reviewed".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cli_failure_posts_nothing() {
        let (dir, store) = temp_store().await;
        let task_id = seeded_task(&store).await;
        let github = Arc::new(FakeGitHub::new());
        let service = ReviewService::new(
            store.clone(),
            github.clone(),
            fake_cli(&dir, "cat > /dev/null; echo 'no credit' >&2; exit 7"),
            ReviewConfig::default(),
        )
        .with_retry_policy(RetryPolicy::immediate(2));

        service.run_review(&task_id).await;

        let task = store.get_review_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        let error = task.error_message.unwrap();
        assert!(error.contains("7"));
        assert!(error.contains("no credit"));
        assert!(github.comments.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_cli_output_fails_the_task() {
        let (dir, store) = temp_store().await;
        let task_id = seeded_task(&store).await;
        let github = Arc::new(FakeGitHub::new());
        let service = ReviewService::new(
            store.clone(),
            github.clone(),
            fake_cli(&dir, "cat > /dev/null; exit 0"),
            ReviewConfig::default(),
        )
        .with_retry_policy(RetryPolicy::immediate(2));

        service.run_review(&task_id).await;

        let task = store.get_review_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(github.comments.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn permanent_github_failure_fails_without_comment() {
        let (dir, store) = temp_store().await;
        let task_id = seeded_task(&store).await;
        let github = Arc::new(FakeGitHub {
            fail_details: true,
            ..FakeGitHub::new()
        });
        let service = ReviewService::new(
            store.clone(),
            github.clone(),
            fake_cli(&dir, "cat > /dev/null; echo hi"),
            ReviewConfig::default(),
        )
        .with_retry_policy(RetryPolicy::immediate(2));

        service.run_review(&task_id).await;

        let task = store.get_review_task(&task_id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error_message.unwrap().contains("Not found"));
        assert!(github.comments.lock().unwrap().is_empty());
    }
}
