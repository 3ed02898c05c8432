//! Gateway binary

use std::net::SocketAddr;

use repoflow_config::{init_tracing, ConfigManager, RuntimeEnv};
use repoflow_gateway::{server, AppState, WorkerEndpoints};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let env = RuntimeEnv::from_env()?;
    let config = ConfigManager::new().load()?;
    init_tracing(&config.logging);

    // signature verification is unconditional; refuse to boot without a secret
    let webhook_secret = env.require_webhook_secret()?.to_string();
    let auth = env
        .web_password
        .clone()
        .map(|password| (env.web_username.clone(), password));
    if auth.is_none() {
        warn!("WEB_PASSWORD is not set; web surfaces are NOT protected");
    }

    let state = AppState::new(
        webhook_secret,
        auth,
        WorkerEndpoints {
            review: env.review_url.clone(),
            copier: env.copier_url.clone(),
            scorer: env.scorer_url.clone(),
        },
        config,
    );

    info!(
        review = %env.review_url,
        copier = %env.copier_url,
        scorer = %env.scorer_url,
        "starting gateway"
    );
    let addr = SocketAddr::from(([0, 0, 0, 0], env.gateway_port));
    server::serve(state, addr).await?;
    Ok(())
}
