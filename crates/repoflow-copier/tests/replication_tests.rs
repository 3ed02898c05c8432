//! Behavioural tests for issue replication and comment mirroring
//!
//! GitHub is faked behind the `CopierGitHub` seam so the state machine and
//! idempotency keys are exercised deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use repoflow_config::IssueCopyConfig;
use repoflow_copier::{CopierGitHub, CopierService};
use repoflow_github::{
    CreatedComment, CreatedIssue, GitHubError, IssueCommentEvent, IssuesEvent, RetryPolicy,
    WebhookComment, WebhookIssue, WebhookLabel, WebhookRepository, WebhookUser,
};
use repoflow_store::{CopyStatus, Store};

#[derive(Default)]
struct FakeGitHub {
    issues: Mutex<Vec<CreatedIssueRecord>>,
    comments: Mutex<Vec<(String, i64, String)>>,
    uploads: Mutex<Vec<(String, String)>>,
    labels_by_repo: HashMap<String, Vec<String>>,
    broken_downloads: HashSet<String>,
    next_issue: AtomicI64,
}

#[derive(Debug, Clone)]
struct CreatedIssueRecord {
    repo: String,
    title: String,
    body: String,
    labels: Vec<String>,
    number: i64,
}

#[async_trait]
impl CopierGitHub for FakeGitHub {
    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: Vec<String>,
    ) -> Result<CreatedIssue, GitHubError> {
        let number = 500 + self.next_issue.fetch_add(1, Ordering::SeqCst);
        self.issues.lock().unwrap().push(CreatedIssueRecord {
            repo: repo.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            labels,
            number,
        });
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
        let mut comments = self.comments.lock().unwrap();
        comments.push((repo.to_string(), number, body.to_string()));
        Ok(CreatedComment {
            id: comments.len() as i64,
            html_url: String::new(),
        })
    }

    async fn list_repo_labels(&self, repo: &str) -> Result<Vec<String>, GitHubError> {
        Ok(self.labels_by_repo.get(repo).cloned().unwrap_or_default())
    }

    async fn ensure_branch(&self, _repo: &str, _branch: &str) -> Result<(), GitHubError> {
        Ok(())
    }

    async fn put_file(
        &self,
        repo: &str,
        _branch: &str,
        path: &str,
        _message: &str,
        _content: &[u8],
    ) -> Result<(), GitHubError> {
        self.uploads
            .lock()
            .unwrap()
            .push((repo.to_string(), path.to_string()));
        Ok(())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GitHubError> {
        if self.broken_downloads.contains(url) {
            return Err(GitHubError::NotFound(url.to_string()));
        }
        Ok(vec![0x89, 0x50, 0x4e, 0x47])
    }
}

fn config() -> IssueCopyConfig {
    let mut config = IssueCopyConfig {
        source_repo: "acme/src".to_string(),
        ..IssueCopyConfig::default()
    };
    config
        .label_to_repo
        .insert("OS3".to_string(), "acme/os3os4".to_string());
    config
        .label_to_repo
        .insert("OS5".to_string(), "acme/os5".to_string());
    config
}

fn issue_event(labels: &[&str], body: Option<&str>) -> IssuesEvent {
    IssuesEvent {
        action: "labeled".to_string(),
        repository: WebhookRepository {
            full_name: "acme/src".to_string(),
        },
        issue: WebhookIssue {
            number: 100,
            title: "Switch port flapping".to_string(),
            body: body.map(|b| b.to_string()),
            html_url: "https://github.com/acme/src/issues/100".to_string(),
            user: WebhookUser {
                login: "reporter".to_string(),
            },
            labels: labels
                .iter()
                .map(|name| WebhookLabel {
                    name: name.to_string(),
                })
                .collect(),
        },
        label: None,
    }
}

fn comment_event(comment_id: i64, body: &str) -> IssueCommentEvent {
    IssueCommentEvent {
        action: "created".to_string(),
        repository: WebhookRepository {
            full_name: "acme/src".to_string(),
        },
        issue: issue_event(&["OS3"], None).issue,
        comment: WebhookComment {
            id: comment_id,
            body: Some(body.to_string()),
            html_url: format!(
                "https://github.com/acme/src/issues/100#issuecomment-{}",
                comment_id
            ),
            user: WebhookUser {
                login: "commenter".to_string(),
            },
        },
    }
}

async fn setup(
    github: FakeGitHub,
    config: IssueCopyConfig,
) -> (tempfile::TempDir, Store, Arc<FakeGitHub>, CopierService) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("test.db")).await.unwrap();
    let github = Arc::new(github);
    let service = CopierService::new(store.clone(), github.clone(), config)
        .with_retry_policy(RetryPolicy::immediate(2));
    (dir, store, github, service)
}

#[tokio::test]
async fn two_labels_create_two_copies_and_replay_is_a_noop() {
    let mut github = FakeGitHub::default();
    github
        .labels_by_repo
        .insert("acme/os3os4".to_string(), vec!["OS3".to_string(), "OS5".to_string()]);
    github
        .labels_by_repo
        .insert("acme/os5".to_string(), vec!["OS3".to_string(), "OS5".to_string()]);
    let (_dir, store, github, service) = setup(github, config()).await;

    let event = issue_event(&["OS3", "OS5"], Some("See #77 for details"));
    service.replicate_issue(&event).await;

    {
        let issues = github.issues.lock().unwrap();
        assert_eq!(issues.len(), 2);
        let repos: HashSet<&str> = issues.iter().map(|i| i.repo.as_str()).collect();
        assert!(repos.contains("acme/os3os4"));
        assert!(repos.contains("acme/os5"));
        for issue in issues.iter() {
            assert_eq!(issue.title, "Switch port flapping");
            assert!(issue.body.contains("See acme/src#77 for details"));
            assert!(issue.body.contains("Copied from acme/src#100"));
            assert_eq!(issue.labels, vec!["OS3".to_string(), "OS5".to_string()]);
        }
    }
    assert_eq!(store.copy_counts().await.unwrap().success, 2);

    // replay the same webhook: no new issues, no new records
    service.replicate_issue(&event).await;
    assert_eq!(github.issues.lock().unwrap().len(), 2);
    assert_eq!(store.copy_counts().await.unwrap().total, 2);
}

#[tokio::test]
async fn unmatched_labels_without_default_do_nothing() {
    let (_dir, store, github, service) = setup(FakeGitHub::default(), config()).await;
    service.replicate_issue(&issue_event(&["unrelated"], None)).await;
    assert!(github.issues.lock().unwrap().is_empty());
    assert_eq!(store.copy_counts().await.unwrap().total, 0);
}

#[tokio::test]
async fn missing_target_labels_are_skipped_and_status_is_partial() {
    let mut github = FakeGitHub::default();
    // target only defines OS3; OS5 will be skipped
    github
        .labels_by_repo
        .insert("acme/os3os4".to_string(), vec!["OS3".to_string()]);
    let mut config = config();
    config.label_to_repo.remove("OS5");
    let (_dir, store, github, service) = setup(github, config).await;

    service.replicate_issue(&issue_event(&["OS3", "OS5"], None)).await;

    let issues = github.issues.lock().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].labels, vec!["OS3".to_string()]);
    let counts = store.copy_counts().await.unwrap();
    assert_eq!(counts.partial, 1);
    assert_eq!(counts.success, 0);
}

#[tokio::test]
async fn image_rehost_failure_yields_partial_copy() {
    let mut github = FakeGitHub::default();
    github
        .broken_downloads
        .insert("http://pics.example/broken.png".to_string());
    github
        .labels_by_repo
        .insert("acme/os3os4".to_string(), vec!["OS3".to_string()]);
    let (_dir, store, github, service) = setup(github, config()).await;

    let body = "before ![ok](http://pics.example/ok.png) after \
                ![broken](http://pics.example/broken.png)";
    service.replicate_issue(&issue_event(&["OS3"], Some(body))).await;

    let issues = github.issues.lock().unwrap();
    assert_eq!(issues.len(), 1);
    // the good image is rewritten to the assets branch, the broken one kept
    assert!(issues[0]
        .body
        .contains("https://github.com/acme/os3os4/blob/assets/images/"));
    assert!(issues[0].body.contains("http://pics.example/broken.png"));
    assert_eq!(github.uploads.lock().unwrap().len(), 1);

    let records = store.list_copy_records(10, 0).await.unwrap();
    assert_eq!(records[0].status, CopyStatus::Partial);
    assert_eq!(records[0].images().len(), 1);
}

#[tokio::test]
async fn github_hosted_images_are_left_alone() {
    let mut github = FakeGitHub::default();
    github
        .labels_by_repo
        .insert("acme/os3os4".to_string(), vec!["OS3".to_string()]);
    let (_dir, store, github, service) = setup(github, config()).await;

    let body = "![shot](https://user-images.githubusercontent.com/1/shot.png)";
    service.replicate_issue(&issue_event(&["OS3"], Some(body))).await;

    assert!(github.uploads.lock().unwrap().is_empty());
    let records = store.list_copy_records(10, 0).await.unwrap();
    assert_eq!(records[0].status, CopyStatus::Success);
    assert!(records[0].images().is_empty());
}

#[tokio::test]
async fn comment_mirror_fires_once_per_copy() {
    let mut github = FakeGitHub::default();
    github
        .labels_by_repo
        .insert("acme/os3os4".to_string(), vec!["OS3".to_string()]);
    let (_dir, store, github, service) = setup(github, config()).await;

    service.replicate_issue(&issue_event(&["OS3"], None)).await;
    // one comment posted on source ("copied to"), none mirrored yet
    let baseline = github.comments.lock().unwrap().len();

    let event = comment_event(999, "agreed, see #42");
    service.mirror_comment(&event).await;
    service.mirror_comment(&event).await; // replay

    let comments = github.comments.lock().unwrap();
    let mirrored: Vec<_> = comments[baseline..]
        .iter()
        .filter(|(repo, _, _)| repo == "acme/os3os4")
        .collect();
    assert_eq!(mirrored.len(), 1);
    let (_, _, body) = mirrored[0];
    assert!(body.contains("**@commenter**"));
    assert!(body.contains("acme/src#100"));
    assert!(body.contains("agreed, see acme/src#42"));

    assert_eq!(store.list_comment_syncs(10, 0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn comment_with_attachments_carries_the_notice() {
    let mut github = FakeGitHub::default();
    github
        .labels_by_repo
        .insert("acme/os3os4".to_string(), vec!["OS3".to_string()]);
    let (_dir, _store, github, service) = setup(github, config()).await;

    service.replicate_issue(&issue_event(&["OS3"], None)).await;
    service
        .mirror_comment(&comment_event(1000, "look: ![s](http://pics.example/s.png)"))
        .await;

    let comments = github.comments.lock().unwrap();
    let mirror = comments
        .iter()
        .find(|(repo, _, body)| repo == "acme/os3os4" && body.contains("**@commenter**"))
        .expect("mirrored comment");
    assert!(mirror.2.contains("see the original comment"));
}

#[tokio::test]
async fn comment_without_copies_is_a_noop() {
    let (_dir, store, github, service) = setup(FakeGitHub::default(), config()).await;
    service.mirror_comment(&comment_event(5, "hello")).await;
    assert!(github.comments.lock().unwrap().is_empty());
    assert!(store.list_comment_syncs(10, 0).await.unwrap().is_empty());
}
