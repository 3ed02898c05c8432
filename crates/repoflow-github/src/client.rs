//! GitHub REST client
//!
//! Octocrab for the API surface, reqwest for raw byte downloads. All repo
//! arguments are `owner/name` full names; splitting happens here so callers
//! never carry (owner, repo) pairs around.

use std::time::Duration;

use octocrab::params::repos::Reference;
use octocrab::Octocrab;
use tracing::debug;

use crate::errors::{GitHubError, Result};

/// Per-request timeout for raw downloads
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Pull request metadata needed for a review prompt
#[derive(Debug, Clone)]
pub struct PullDetails {
    /// Pull request number
    pub number: i64,
    /// Title
    pub title: String,
    /// Body
    pub body: String,
    /// Author login
    pub author: String,
    /// HTML URL
    pub html_url: String,
    /// Draft flag
    pub draft: bool,
}

/// One changed file in a pull request
#[derive(Debug, Clone)]
pub struct ChangedFile {
    /// Path within the repository
    pub filename: String,
    /// Added line count
    pub additions: i64,
    /// Deleted line count
    pub deletions: i64,
    /// Unified patch; absent for binary files
    pub patch: Option<String>,
}

/// A created issue
#[derive(Debug, Clone)]
pub struct CreatedIssue {
    /// Issue number on the target repository
    pub number: i64,
    /// HTML URL
    pub html_url: String,
}

/// A created comment
#[derive(Debug, Clone)]
pub struct CreatedComment {
    /// Comment id
    pub id: i64,
    /// HTML URL
    pub html_url: String,
}

/// GitHub REST client
#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Create a client authenticated with a personal token
    pub fn new(token: &str) -> Result<Self> {
        let octo = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(GitHubError::from)?;
        Ok(Self {
            octo,
            http: Self::http_client()?,
        })
    }

    /// Create a client against a non-default API base (tests)
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let octo = Octocrab::builder()
            .base_uri(base_uri)
            .map_err(GitHubError::from)?
            .personal_token(token.to_string())
            .build()
            .map_err(GitHubError::from)?;
        Ok(Self {
            octo,
            http: Self::http_client()?,
        })
    }

    fn http_client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!("repoflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GitHubError::from)
    }

    /// Fetch pull request metadata
    pub async fn pull_details(&self, repo: &str, number: i64) -> Result<PullDetails> {
        let (owner, name) = split_repo(repo)?;
        let pr = self.octo.pulls(owner, name).get(number as u64).await?;
        Ok(PullDetails {
            number,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            author: pr.user.map(|u| u.login).unwrap_or_default(),
            html_url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
            draft: pr.draft.unwrap_or(false),
        })
    }

    /// Fetch the changed files of a pull request, with unified patches
    pub async fn pull_files(&self, repo: &str, number: i64) -> Result<Vec<ChangedFile>> {
        let (owner, name) = split_repo(repo)?;
        let page = self
            .octo
            .pulls(owner, name)
            .list_files(number as u64)
            .await?;
        let files = self.octo.all_pages(page).await?;
        Ok(files
            .into_iter()
            .map(|f| ChangedFile {
                filename: f.filename,
                additions: f.additions as i64,
                deletions: f.deletions as i64,
                patch: f.patch,
            })
            .collect())
    }

    /// Create an issue with labels
    pub async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        labels: Vec<String>,
    ) -> Result<CreatedIssue> {
        let (owner, name) = split_repo(repo)?;
        let issue = self
            .octo
            .issues(owner, name)
            .create(title)
            .body(body)
            .labels(labels)
            .send()
            .await?;
        debug!(repo = repo, number = issue.number, "issue created");
        Ok(CreatedIssue {
            number: issue.number as i64,
            html_url: issue.html_url.to_string(),
        })
    }

    /// Post a comment on an issue or pull request
    pub async fn create_issue_comment(
        &self,
        repo: &str,
        issue_number: i64,
        body: &str,
    ) -> Result<CreatedComment> {
        let (owner, name) = split_repo(repo)?;
        let comment = self
            .octo
            .issues(owner, name)
            .create_comment(issue_number as u64, body)
            .await?;
        Ok(CreatedComment {
            id: comment.id.0 as i64,
            html_url: comment.html_url.to_string(),
        })
    }

    /// Add labels to an issue or pull request
    pub async fn add_labels(&self, repo: &str, issue_number: i64, labels: &[String]) -> Result<()> {
        let (owner, name) = split_repo(repo)?;
        self.octo
            .issues(owner, name)
            .add_labels(issue_number as u64, labels)
            .await?;
        Ok(())
    }

    /// Names of all labels defined on a repository
    pub async fn list_repo_labels(&self, repo: &str) -> Result<Vec<String>> {
        let (owner, name) = split_repo(repo)?;
        let page = self
            .octo
            .issues(owner, name)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await?;
        let labels = self.octo.all_pages(page).await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    /// Default branch of a repository
    pub async fn default_branch(&self, repo: &str) -> Result<String> {
        let (owner, name) = split_repo(repo)?;
        let repository = self.octo.repos(owner, name).get().await?;
        Ok(repository
            .default_branch
            .unwrap_or_else(|| "main".to_string()))
    }

    /// Head commit SHA of a branch, or None when the branch does not exist
    pub async fn branch_sha(&self, repo: &str, branch: &str) -> Result<Option<String>> {
        let (owner, name) = split_repo(repo)?;
        match self
            .octo
            .repos(owner, name)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await
        {
            Ok(reference) => Ok(ref_sha(&reference)),
            Err(err) => match GitHubError::from(err) {
                GitHubError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }

    /// Create a branch at a commit SHA
    pub async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> Result<()> {
        let (owner, name) = split_repo(repo)?;
        self.octo
            .repos(owner, name)
            .create_ref(&Reference::Branch(branch.to_string()), sha)
            .await?;
        debug!(repo = repo, branch = branch, "branch created");
        Ok(())
    }

    /// Ensure a branch exists, creating it from the default branch if absent
    pub async fn ensure_branch(&self, repo: &str, branch: &str) -> Result<()> {
        if self.branch_sha(repo, branch).await?.is_some() {
            return Ok(());
        }
        let default = self.default_branch(repo).await?;
        let sha = self
            .branch_sha(repo, &default)
            .await?
            .ok_or_else(|| GitHubError::NotFound(format!("{}@{}", repo, default)))?;
        self.create_branch(repo, branch, &sha).await
    }

    /// Commit a file to a branch
    pub async fn put_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<()> {
        let (owner, name) = split_repo(repo)?;
        self.octo
            .repos(owner, name)
            .create_file(path, message, content)
            .branch(branch)
            .send()
            .await?;
        Ok(())
    }

    /// Download raw bytes from a URL (image re-hosting)
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Split `owner/name` into its parts
pub fn split_repo(full_name: &str) -> Result<(&str, &str)> {
    let mut parts = full_name.splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => Ok((owner, name)),
        _ => Err(GitHubError::invalid_input(format!(
            "repository must be owner/name, got '{}'",
            full_name
        ))),
    }
}

fn ref_sha(reference: &octocrab::models::repos::Ref) -> Option<String> {
    use octocrab::models::repos::Object;
    match &reference.object {
        Object::Commit { sha, .. } => Some(sha.clone()),
        Object::Tag { sha, .. } => Some(sha.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_repo_shapes() {
        assert_eq!(split_repo("acme/src").unwrap(), ("acme", "src"));
        assert!(split_repo("acme").is_err());
        assert!(split_repo("/src").is_err());
        assert!(split_repo("").is_err());
    }
}
