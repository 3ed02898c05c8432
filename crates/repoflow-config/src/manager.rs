//! Configuration manager implementation

use std::path::PathBuf;

use config::{Config, Environment, File};
use tracing::debug;

use crate::{
    error::Result,
    types::AppConfig,
};

/// Environment variable naming the config file
const CONFIG_PATH_VAR: &str = "REPOFLOW_CONFIG";

/// Loads the application configuration from file and environment
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager using the default path
    ///
    /// The path is `$REPOFLOW_CONFIG` when set, `./config.toml` otherwise.
    pub fn new() -> Self {
        let config_path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));
        Self {
            config_path,
            env_prefix: "REPOFLOW".to_string(),
        }
    }

    /// Create with a custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: "REPOFLOW".to_string(),
        }
    }

    /// Load and validate the configuration
    ///
    /// A missing file yields defaults; environment variables with the
    /// `REPOFLOW` prefix override file values (`REPOFLOW__REVIEW__LANGUAGE`).
    pub fn load(&self) -> Result<AppConfig> {
        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        debug!(path = %self.config_path.display(), "configuration loaded");
        Ok(app_config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
