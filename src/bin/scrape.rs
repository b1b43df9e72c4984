use anyhow::Context;

use pravo_assist::config::AppConfig;
use pravo_assist::logging;
use pravo_assist::scrape::Scraper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config.paths);

    let scraper = Scraper::new(&config)?;
    let report = scraper
        .run()
        .await
        .context("corpus scrape failed")?;

    tracing::info!(
        "scrape finished: {} pages saved, {} failed",
        report.saved,
        report.failed
    );
    Ok(())
}
