use anyhow::Context;
use llm_interface::OpenAiScorer;
use reddit_client::{RedditClient, RedditOAuth2Config};
use scan_service::{NotifierBackend, ScanRunner};
use tracing_subscriber::EnvFilter;
use trendscout_core::{AppConfig, Credentials, InMemorySeenStore};

const DEFAULT_LOG_FILTER: &str =
    "trendscout=info,scan_service=info,reddit_client=info,llm_interface=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting Trendscout - t-shirt trend detector");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let credentials = Credentials::from_env().context("Missing credentials")?;

    let source = RedditClient::new(RedditOAuth2Config::from_credentials(&credentials))
        .context("Failed to create Reddit client")?;
    let scorer = OpenAiScorer::new(credentials.openai_api_key.clone(), config.scorer.clone())
        .context("Failed to create scorer")?;
    let notifier =
        NotifierBackend::from_settings(&config.notifier).context("Failed to create notifier")?;
    tracing::info!(notifier = notifier.name(), "Alerts configured");

    let mut runner = ScanRunner::new(config, source, scorer, notifier, InMemorySeenStore::new());
    let summary = runner.run().await;

    let report = serde_json::to_string_pretty(&summary).context("Failed to encode run summary")?;
    println!("{}", report);

    if summary.communities_checked > 0 && summary.communities_failed == summary.communities_checked
    {
        anyhow::bail!("Every community failed to load");
    }
    Ok(())
}
