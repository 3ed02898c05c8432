//! Subprocess lifecycle

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
};

/// Cap on stderr carried into error messages
const STDERR_CAP: usize = 2_000;

/// Runs AI CLI invocations
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one invocation: prompt on stdin, trimmed stdout back
    ///
    /// Non-zero exit, empty stdout, and timeout are errors; the timeout
    /// kills the subprocess.
    pub async fn run(&self, prompt: &str) -> Result<String> {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }

        debug!(binary = %self.config.binary.display(), prompt_len = prompt.len(),
               "invoking AI CLI");

        let mut child = cmd.spawn().map_err(EngineError::Spawn)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
            // close stdin so the CLI sees EOF
            drop(stdin);
        }

        let output = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await
        {
            Ok(result) => result?,
            Err(_) => {
                // dropping the in-flight future killed the child (kill_on_drop)
                warn!(seconds = self.config.timeout.as_secs(), "AI CLI timed out");
                return Err(EngineError::Timeout {
                    seconds: self.config.timeout.as_secs(),
                });
            }
        };

        let stderr = truncate_output(&String::from_utf8_lossy(&output.stderr), STDERR_CAP);
        if !output.status.success() {
            return Err(EngineError::NonZeroExit {
                code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(EngineError::EmptyOutput { stderr });
        }
        debug!(output_len = stdout.len(), "AI CLI finished");
        Ok(stdout)
    }
}

/// Truncate text to `max` characters, marking the elision
pub fn truncate_output(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{}... [truncated]", kept)
}
