//! End-to-end pipeline tests
//!
//! Boots the real services on ephemeral ports — gateway in front of the
//! PR-review worker, and the copier on its own — with the AI CLI faked by
//! a shell script and GitHub faked behind each worker's seam trait.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use repoflow_config::{AppConfig, IssueCopyConfig, ReviewConfig};
use repoflow_copier::{CopierGitHub, CopierService};
use repoflow_engine::{Engine, EngineConfig};
use repoflow_gateway::WorkerEndpoints;
use repoflow_github::{
    sign, ChangedFile, CreatedComment, CreatedIssue, GitHubError, PullDetails,
};
use repoflow_review::{ReviewGitHub, ReviewService};
use repoflow_store::Store;
use serde_json::{json, Value};

const SECRET: &str = "pipeline-secret";

#[derive(Default)]
struct FakeGitHub {
    comments: Mutex<Vec<(String, i64, String)>>,
    issues: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ReviewGitHub for FakeGitHub {
    async fn pull_details(&self, _repo: &str, number: i64) -> Result<PullDetails, GitHubError> {
        Ok(PullDetails {
            number,
            title: "Add thing".to_string(),
            body: String::new(),
            author: "dev".to_string(),
            html_url: String::new(),
            draft: false,
        })
    }

    async fn pull_files(&self, _repo: &str, _number: i64) -> Result<Vec<ChangedFile>, GitHubError> {
        Ok(vec![ChangedFile {
            filename: "src/lib.rs".to_string(),
            additions: 1,
            deletions: 0,
            patch: Some("@@ -0,0 +1 @@\n+fn thing() {}".to_string()),
        }])
    }

    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> Result<CreatedComment, GitHubError> {
        self.comments
            .lock()
            .unwrap()
            .push((repo.to_string(), number, body.to_string()));
        Ok(CreatedComment { id: 1, html_url: String::new() })
    }

    async fn add_labels(
        &self,
        _repo: &str,
        _number: i64,
        _labels: &[String],
    ) -> Result<(), GitHubError> {
        Ok(())
    }
}

#[async_trait]
impl CopierGitHub for FakeGitHub {
    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        _body: &str,
        _labels: Vec<String>,
    ) -> Result<CreatedIssue, GitHubError> {
        let mut issues = self.issues.lock().unwrap();
        issues.push((repo.to_string(), title.to_string()));
        let number = issues.len() as i64;
        Ok(CreatedIssue {
            number,
            html_url: format!("https://github.com/{}/issues/{}", repo, number),
        })
    }

    async fn create_issue_comment(
        &self,
        repo: &str,
        number: i64,
        body: &str,
    ) -> Result<CreatedComment, GitHubError> {
        self.comments
            .lock()
            .unwrap()
            .push((repo.to_string(), number, body.to_string()));
        Ok(CreatedComment { id: 1, html_url: String::new() })
    }

    async fn list_repo_labels(&self, _repo: &str) -> Result<Vec<String>, GitHubError> {
        Ok(vec!["OS3".to_string(), "OS5".to_string()])
    }

    async fn ensure_branch(&self, _repo: &str, _branch: &str) -> Result<(), GitHubError> {
        Ok(())
    }

    async fn put_file(
        &self,
        _repo: &str,
        _branch: &str,
        _path: &str,
        _message: &str,
        _content: &[u8],
    ) -> Result<(), GitHubError> {
        Ok(())
    }

    async fn download(&self, _url: &str) -> Result<Vec<u8>, GitHubError> {
        Ok(vec![1, 2, 3])
    }
}

fn fake_cli(dir: &tempfile::TempDir) -> Engine {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.path().join("fake-cli.sh");
    std::fs::write(&path, "#!/bin/sh\ncat > /dev/null\necho 'LGTM'\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    Engine::new(EngineConfig::new(path, Duration::from_secs(10)).with_args(vec![]))
}

async fn spawn_app(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_review_worker(
    dir: &tempfile::TempDir,
    github: Arc<FakeGitHub>,
) -> (Store, String) {
    let store = Store::open(dir.path().join("review.db")).await.unwrap();
    let config = ReviewConfig::default();
    let service = Arc::new(ReviewService::new(
        store.clone(),
        github,
        fake_cli(dir),
        config.clone(),
    ));
    let state = repoflow_review::AppState::new(store.clone(), config, service);
    let url = spawn_app(repoflow_review::routes::router(state)).await;
    (store, url)
}

fn copier_config() -> IssueCopyConfig {
    let mut config = IssueCopyConfig {
        source_repo: "acme/src".to_string(),
        ..IssueCopyConfig::default()
    };
    config
        .label_to_repo
        .insert("OS3".to_string(), "acme/os3".to_string());
    config
        .label_to_repo
        .insert("OS5".to_string(), "acme/os5".to_string());
    config
}

async fn spawn_copier_worker(
    dir: &tempfile::TempDir,
    github: Arc<FakeGitHub>,
) -> (Store, String) {
    let store = Store::open(dir.path().join("copier.db")).await.unwrap();
    let config = copier_config();
    let service = Arc::new(CopierService::new(store.clone(), github, config.clone()));
    let state = repoflow_copier::AppState::new(store.clone(), config, service);
    let url = spawn_app(repoflow_copier::routes::router(state)).await;
    (store, url)
}

async fn wait_for<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn review_flows_from_gateway_to_posted_comment() {
    let dir = tempfile::tempdir().unwrap();
    let github = Arc::new(FakeGitHub::default());
    let (store, review_url) = spawn_review_worker(&dir, github.clone()).await;

    let gateway_state = repoflow_gateway::AppState::new(
        SECRET.to_string(),
        None,
        WorkerEndpoints {
            review: review_url,
            copier: "http://127.0.0.1:1".to_string(),
            scorer: "http://127.0.0.1:1".to_string(),
        },
        AppConfig::default(),
    );
    let gateway_url = spawn_app(repoflow_gateway::routes::router(gateway_state)).await;

    let body = json!({
        "action": "opened",
        "repository": {"full_name": "acme/foo"},
        "pull_request": {
            "number": 42,
            "title": "Add thing",
            "draft": false,
            "html_url": "https://github.com/acme/foo/pull/42",
            "user": {"login": "dev"}
        }
    })
    .to_string();

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/webhook", gateway_url))
        .header("x-github-event", "pull_request")
        .header("x-github-delivery", "d-1")
        .header("x-hub-signature-256", sign(SECRET, body.as_bytes()))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let completed = wait_for(|| {
        let store = store.clone();
        async move {
            store
                .get_review_task("acme/foo#42")
                .await
                .map(|task| task.status == repoflow_store::TaskStatus::Completed)
                .unwrap_or(false)
        }
    })
    .await;
    assert!(completed, "review task never completed");

    let task = store.get_review_task("acme/foo#42").await.unwrap();
    assert_eq!(task.progress, 100);
    assert_eq!(task.review_content.as_deref(), Some("LGTM"));

    let comments = github.comments.lock().unwrap();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].2.ends_with("*Automated review by repoflow*"));
}

#[tokio::test]
async fn draft_pr_is_not_enqueued() {
    let dir = tempfile::tempdir().unwrap();
    let github = Arc::new(FakeGitHub::default());
    let (store, review_url) = spawn_review_worker(&dir, github).await;

    let body = json!({
        "action": "opened",
        "repository": {"full_name": "acme/foo"},
        "pull_request": {
            "number": 7,
            "title": "WIP",
            "draft": true,
            "html_url": "https://github.com/acme/foo/pull/7",
            "user": {"login": "dev"}
        }
    })
    .to_string();

    let response = reqwest::Client::new()
        .post(format!("{}/webhook", review_url))
        .header("x-github-event", "pull_request")
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["status"], "ignored");
    assert_eq!(store.review_task_counts().await.unwrap().total, 0);
}

#[tokio::test]
async fn copier_replication_is_idempotent_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let github = Arc::new(FakeGitHub::default());
    let (store, copier_url) = spawn_copier_worker(&dir, github.clone()).await;

    let body = json!({
        "action": "labeled",
        "repository": {"full_name": "acme/src"},
        "issue": {
            "number": 100,
            "title": "Port flapping",
            "body": "See #77",
            "html_url": "https://github.com/acme/src/issues/100",
            "user": {"login": "reporter"},
            "labels": [{"name": "OS3"}, {"name": "OS5"}]
        }
    })
    .to_string();

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let response = client
            .post(format!("{}/webhook", copier_url))
            .header("x-github-event", "issues")
            .header("content-type", "application/json")
            .body(body.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 202);
    }

    let settled = wait_for(|| {
        let store = store.clone();
        async move {
            store
                .copy_counts()
                .await
                .map(|counts| counts.success == 2)
                .unwrap_or(false)
        }
    })
    .await;
    assert!(settled, "copies never settled");

    // replay created nothing extra
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(store.copy_counts().await.unwrap().total, 2);
    assert_eq!(github.issues.lock().unwrap().len(), 2);

    // stats surface over HTTP
    let stats: Value = client
        .get(format!("{}/api/issue-copies/stats", copier_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["success"], json!(2));
}
