use anyhow::Context;

use pravo_assist::config::AppConfig;
use pravo_assist::ingest::Ingestor;
use pravo_assist::llm;
use pravo_assist::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config.paths);

    let embedder = llm::build_embedder(&config);
    let ingestor = Ingestor::new(&config, embedder);
    let report = ingestor
        .run()
        .await
        .context("index rebuild failed")?;

    tracing::info!(
        "ingest finished: {} documents, {} chunks, {} unique",
        report.documents,
        report.chunks,
        report.unique_chunks
    );
    Ok(())
}
