//! Issue-copier worker binary

use std::net::SocketAddr;
use std::sync::Arc;

use repoflow_config::{init_tracing, ConfigManager, RuntimeEnv};
use repoflow_copier::{server, AppState, CopierService};
use repoflow_github::GitHubClient;
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
    let service = Arc::new(CopierService::new(
        store.clone(),
        github,
        config.issue_copy.clone(),
    ));
    let state = AppState::new(store, config.issue_copy.clone(), service);

    info!(
        source_repo = %state.config.source_repo,
        pool_size = state.config.pool_size,
        "starting issue-copier worker"
    );
    let addr = SocketAddr::from(([0, 0, 0, 0], env.copier_port));
    server::serve(state, addr).await?;
    Ok(())
}
