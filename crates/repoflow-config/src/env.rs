//! Runtime environment
//!
//! Secrets and deployment wiring come from the environment only, never the
//! config file: the file is committed, the environment is mounted.

use crate::error::{ConfigError, Result};

/// Values read from the process environment at startup
#[derive(Debug, Clone)]
pub struct RuntimeEnv {
    /// GitHub personal access token
    pub github_token: String,
    /// Webhook shared secret for signature verification
    pub webhook_secret: String,
    /// Basic-auth username for the web surfaces
    pub web_username: String,
    /// Basic-auth password; auth is disabled when unset
    pub web_password: Option<String>,
    /// Gateway listen port
    pub gateway_port: u16,
    /// PR-review worker listen port
    pub review_port: u16,
    /// Issue-copier worker listen port
    pub copier_port: u16,
    /// Issue-scorer worker listen port
    pub scorer_port: u16,
    /// Base URL the gateway uses to reach the PR-review worker
    pub review_url: String,
    /// Base URL the gateway uses to reach the issue-copier worker
    pub copier_url: String,
    /// Base URL the gateway uses to reach the issue-scorer worker
    pub scorer_url: String,
    /// Path to the AI CLI executable
    pub ai_cli_path: String,
    /// Path to the SQLite database file
    pub database_path: String,
}

impl RuntimeEnv {
    /// Read the runtime environment
    ///
    /// `GITHUB_TOKEN` and `WEBHOOK_SECRET` may be empty; callers that need
    /// them hard should call [`RuntimeEnv::require_github_token`] /
    /// [`RuntimeEnv::require_webhook_secret`].
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            github_token: var_or("GITHUB_TOKEN", ""),
            webhook_secret: var_or("WEBHOOK_SECRET", ""),
            web_username: var_or("WEB_USERNAME", "admin"),
            web_password: std::env::var("WEB_PASSWORD").ok().filter(|p| !p.is_empty()),
            gateway_port: port_var("GATEWAY_PORT", 8080)?,
            review_port: port_var("REVIEW_PORT", 8081)?,
            copier_port: port_var("COPIER_PORT", 8082)?,
            scorer_port: port_var("SCORER_PORT", 8083)?,
            review_url: var_or("REVIEW_URL", "http://127.0.0.1:8081"),
            copier_url: var_or("COPIER_URL", "http://127.0.0.1:8082"),
            scorer_url: var_or("SCORER_URL", "http://127.0.0.1:8083"),
            ai_cli_path: var_or("AI_CLI_PATH", "claude"),
            database_path: var_or("DATABASE_PATH", "repoflow.db"),
        })
    }

    /// Fail unless a GitHub token is configured
    pub fn require_github_token(&self) -> Result<&str> {
        if self.github_token.is_empty() {
            return Err(ConfigError::environment("GITHUB_TOKEN is not set"));
        }
        Ok(&self.github_token)
    }

    /// Fail unless a webhook secret is configured
    pub fn require_webhook_secret(&self) -> Result<&str> {
        if self.webhook_secret.is_empty() {
            return Err(ConfigError::environment("WEBHOOK_SECRET is not set"));
        }
        Ok(&self.webhook_secret)
    }

    /// Whether basic auth is active
    pub fn auth_enabled(&self) -> bool {
        self.web_password.is_some()
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn port_var(name: &str, default: u16) -> Result<u16> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|_| ConfigError::environment(format!("{} must be a port number", name))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // scope to variables this test does not set
        let env = RuntimeEnv::from_env().unwrap();
        assert_eq!(env.web_username, "admin");
        assert!(env.require_github_token().is_err() || !env.github_token.is_empty());
    }

    #[test]
    fn port_parsing_rejects_garbage() {
        std::env::set_var("TEST_PORT_GARBAGE", "not-a-port");
        assert!(port_var("TEST_PORT_GARBAGE", 1).is_err());
        std::env::remove_var("TEST_PORT_GARBAGE");
        assert_eq!(port_var("TEST_PORT_GARBAGE", 7777).unwrap(), 7777);
    }
}
