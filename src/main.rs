use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedforge::config::Config;
use feedforge::engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; an unreadable config aborts before any fetching
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "feeds.toml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;
    info!("Loaded {} sources from {}", config.sources.len(), config_path);

    let report = engine::run(&config).await;

    // Individual source failures are logged, not exit-code-bearing; the
    // schedule only needs to know when nothing at all could be refreshed.
    if !config.sources.is_empty() && report.succeeded() == 0 {
        anyhow::bail!("all {} configured sources failed to refresh", report.failed);
    }

    Ok(())
}
