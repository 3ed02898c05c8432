//! Configuration types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// PR-review worker settings
    pub review: ReviewConfig,
    /// Issue-copier worker settings
    pub issue_copy: IssueCopyConfig,
    /// Issue-scorer worker settings
    pub issue_scoring: IssueScoringConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate the configuration as a whole
    pub fn validate(&self) -> Result<()> {
        self.review.validate()?;
        self.issue_copy.validate()?;
        self.issue_scoring.validate()?;
        Ok(())
    }
}

/// PR-review worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// `pull_request` actions that trigger a review
    pub triggers: Vec<String>,
    /// Skip draft pull requests
    pub skip_draft: bool,
    /// Apply the auto-review label after posting a review
    pub auto_label: bool,
    /// Name of the auto-review label
    pub auto_label_name: String,
    /// Focus areas listed in the review prompt
    pub focus_areas: Vec<String>,
    /// Language the review should be written in
    pub language: String,
    /// AI CLI timeout in seconds
    pub model_timeout_secs: u64,
    /// Character budget for the diff embedded in the prompt
    pub max_diff_chars: usize,
    /// Number of review workers
    pub pool_size: usize,
    /// Bounded queue capacity per worker
    pub queue_capacity: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            triggers: vec![
                "opened".to_string(),
                "synchronize".to_string(),
                "reopened".to_string(),
            ],
            skip_draft: true,
            auto_label: true,
            auto_label_name: "ai-reviewed".to_string(),
            focus_areas: vec![
                "correctness".to_string(),
                "security".to_string(),
                "readability".to_string(),
            ],
            language: "en".to_string(),
            model_timeout_secs: 300,
            max_diff_chars: 60_000,
            pool_size: 2,
            queue_capacity: 64,
        }
    }
}

impl ReviewConfig {
    /// Validate review settings
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(ConfigError::validation("review.pool_size must be >= 1"));
        }
        if self.model_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "review.model_timeout_secs must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Issue-copier worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueCopyConfig {
    /// Master switch for the copier
    pub enabled: bool,
    /// Repository whose issues are replicated (`owner/name`)
    pub source_repo: String,
    /// `issues` actions that trigger replication
    pub triggers: Vec<String>,
    /// Label string to target repository full name
    pub label_to_repo: BTreeMap<String, String>,
    /// Target used when no label matches
    pub default_target_repo: Option<String>,
    /// Append a back-reference line to the copied issue body
    pub add_source_reference: bool,
    /// Copy labels that exist on the target repository
    pub copy_labels: bool,
    /// Re-host non-GitHub images onto the target `assets` branch
    pub reupload_images: bool,
    /// Post a "copied to" comment on the source issue
    pub add_copy_comment: bool,
    /// Number of copier workers
    pub pool_size: usize,
    /// Bounded queue capacity per worker
    pub queue_capacity: usize,
}

impl Default for IssueCopyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_repo: String::new(),
            triggers: vec!["opened".to_string(), "labeled".to_string()],
            label_to_repo: BTreeMap::new(),
            default_target_repo: None,
            add_source_reference: true,
            copy_labels: true,
            reupload_images: true,
            add_copy_comment: true,
            pool_size: 4,
            queue_capacity: 128,
        }
    }
}

impl IssueCopyConfig {
    /// Validate copier settings
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(ConfigError::validation("issue_copy.pool_size must be >= 1"));
        }
        if !self.source_repo.is_empty() && !is_repo_full_name(&self.source_repo) {
            return Err(ConfigError::validation(format!(
                "issue_copy.source_repo must be owner/name, got '{}'",
                self.source_repo
            )));
        }
        for target in self
            .label_to_repo
            .values()
            .chain(self.default_target_repo.iter())
        {
            if !is_repo_full_name(target) {
                return Err(ConfigError::validation(format!(
                    "issue_copy target must be owner/name, got '{}'",
                    target
                )));
            }
        }
        Ok(())
    }
}

/// Issue-scorer worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueScoringConfig {
    /// Master switch for the scorer
    pub enabled: bool,
    /// Repositories whose issues and comments are scored
    pub target_repos: Vec<String>,
    /// `issues` actions that trigger scoring
    pub triggers: Vec<String>,
    /// `issue_comment` actions that trigger scoring
    pub comment_triggers: Vec<String>,
    /// Post the score as a comment (scores are recorded either way)
    pub auto_comment: bool,
    /// Language the score feedback should be written in
    pub language: String,
    /// AI CLI timeout in seconds
    pub model_timeout_secs: u64,
    /// Look-back window for feedback patterns, in days
    pub feedback_window_days: i64,
    /// Minimum occurrences for a pattern to reach the prompt
    pub feedback_min_occurrences: i64,
    /// Number of scorer workers
    pub pool_size: usize,
    /// Bounded queue capacity per worker
    pub queue_capacity: usize,
}

impl Default for IssueScoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_repos: Vec::new(),
            triggers: vec!["opened".to_string()],
            comment_triggers: vec!["created".to_string()],
            auto_comment: true,
            language: "en".to_string(),
            model_timeout_secs: 300,
            feedback_window_days: 30,
            feedback_min_occurrences: 2,
            pool_size: 2,
            queue_capacity: 64,
        }
    }
}

impl IssueScoringConfig {
    /// Validate scorer settings
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "issue_scoring.pool_size must be >= 1",
            ));
        }
        if self.feedback_window_days < 1 {
            return Err(ConfigError::validation(
                "issue_scoring.feedback_window_days must be >= 1",
            ));
        }
        if self.feedback_min_occurrences < 1 {
            return Err(ConfigError::validation(
                "issue_scoring.feedback_min_occurrences must be >= 1",
            ));
        }
        for repo in &self.target_repos {
            if !is_repo_full_name(repo) {
                return Err(ConfigError::validation(format!(
                    "issue_scoring.target_repos entries must be owner/name, got '{}'",
                    repo
                )));
            }
        }
        Ok(())
    }

    /// Whether a repository is in the scored set
    pub fn is_target(&self, repo_full_name: &str) -> bool {
        self.target_repos.iter().any(|r| r == repo_full_name)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Output format ("text" or "json")
    pub format: String,
    /// Optional log file path; stdout when unset
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file: None,
        }
    }
}

/// Check that a repository reference looks like `owner/name`
pub fn is_repo_full_name(value: &str) -> bool {
    let mut parts = value.splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) => {
            !owner.is_empty() && !name.is_empty() && !name.contains('/')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.review.pool_size, 2);
        assert_eq!(config.issue_copy.pool_size, 4);
        assert_eq!(config.issue_scoring.feedback_window_days, 30);
    }

    #[test]
    fn rejects_bad_repo_names() {
        let mut config = AppConfig::default();
        config.issue_copy.source_repo = "not-a-repo".to_string();
        assert!(config.validate().is_err());

        config.issue_copy.source_repo = "acme/src".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_pool() {
        let mut config = AppConfig::default();
        config.review.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn repo_full_name_shapes() {
        assert!(is_repo_full_name("acme/src"));
        assert!(!is_repo_full_name("acme"));
        assert!(!is_repo_full_name("/src"));
        assert!(!is_repo_full_name("acme/"));
        assert!(!is_repo_full_name("a/b/c"));
    }
}
