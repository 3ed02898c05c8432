//! Configuration for repoflow services
//!
//! One structured config document (TOML file plus `REPOFLOW`-prefixed
//! environment overlay) shared by the gateway and the three workers, and a
//! `RuntimeEnv` for the values that only ever come from the environment
//! (tokens, secrets, ports, paths).

pub mod env;
pub mod error;
pub mod logging;
pub mod manager;
pub mod types;

pub use env::RuntimeEnv;
pub use logging::init_tracing;
pub use error::ConfigError;
pub use manager::ConfigManager;
pub use types::{AppConfig, IssueCopyConfig, IssueScoringConfig, LoggingConfig, ReviewConfig};
