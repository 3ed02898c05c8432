//! Issue-scorer worker binary

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use repoflow_config::{init_tracing, ConfigManager, RuntimeEnv};
use repoflow_engine::{Engine, EngineConfig};
use repoflow_github::GitHubClient;
use repoflow_scorer::{server, AppState, ScorerService};
use repoflow_store::Store;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let env = RuntimeEnv::from_env()?;
    let config = ConfigManager::new().load()?;
    init_tracing(&config.logging);

    let store = Store::open(&env.database_path).await?;
    let github = Arc::new(GitHubClient::new(env.require_github_token()?)?);
    let engine = Engine::new(EngineConfig::new(
        &env.ai_cli_path,
        Duration::from_secs(config.issue_scoring.model_timeout_secs),
    ));
    let service = Arc::new(ScorerService::new(
        store.clone(),
        github,
        engine,
        config.issue_scoring.clone(),
    ));
    let state = AppState::new(store, config.issue_scoring.clone(), service);

    info!(
        targets = state.config.target_repos.len(),
        pool_size = state.config.pool_size,
        "starting issue-scorer worker"
    );
    let addr = SocketAddr::from(([0, 0, 0, 0], env.scorer_port));
    server::serve(state, addr).await?;
    Ok(())
}
