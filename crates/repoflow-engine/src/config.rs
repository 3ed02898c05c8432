//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

/// How to invoke the AI CLI
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the executable
    pub binary: PathBuf,
    /// Arguments passed on every invocation
    ///
    /// The defaults put the CLI in non-interactive print mode and bypass its
    /// repository-context checks; the working directory need not be a repo.
    pub args: Vec<String>,
    /// Wall-clock budget for one invocation
    pub timeout: Duration,
    /// Working directory for the subprocess
    pub working_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Create a config with the default argument vector
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            args: vec![
                "-p".to_string(),
                "--dangerously-skip-permissions".to_string(),
            ],
            timeout,
            working_dir: None,
        }
    }

    /// Replace the argument vector
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set the working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}
