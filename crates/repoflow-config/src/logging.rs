//! Tracing subscriber setup shared by the service binaries

use tracing_subscriber::EnvFilter;

use crate::types::LoggingConfig;

/// Initialise the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set. Safe to call once
/// per process; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already initialised");
    }
}
