use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helix_api::{HelixClient, TokenManager};
use streamwatch::config::Config;
use streamwatch::discord::{DiscordApi, DiscordRest};
use streamwatch::presence::{Engine, EngineConfig, HelixStatusSource, PollScheduler, StatusSource};
use streamwatch::store::GuildStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let http = reqwest::Client::new();
    let tokens = TokenManager::new(
        http.clone(),
        config.twitch_client_id.clone(),
        config.twitch_client_secret.clone(),
    );
    let helix = HelixClient::new(http.clone(), tokens);
    let source: Arc<dyn StatusSource> = Arc::new(HelixStatusSource::new(helix));
    let api: Arc<dyn DiscordApi> = Arc::new(DiscordRest::new(http, config.discord_bot_token.clone()));
    let store = Arc::new(GuildStore::new(&config.data_dir));

    let engine = Arc::new(Engine::new(
        store,
        source,
        api,
        EngineConfig::from_app(&config),
    ));

    // Reconcile stored artifact references against what still exists
    // upstream before the first tick.
    engine.recover().await?;

    let cancellation_token = CancellationToken::new();
    let scheduler = PollScheduler::new(
        engine,
        config.poll_interval,
        cancellation_token.clone(),
    );
    let scheduler_task = tokio::spawn(scheduler.run());

    tracing::info!("streamwatch initialized successfully");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    cancellation_token.cancel();
    scheduler_task.await?;

    Ok(())
}
