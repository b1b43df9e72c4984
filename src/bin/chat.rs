use std::sync::Arc;

use anyhow::Context;

use pravo_assist::cli;
use pravo_assist::config::AppConfig;
use pravo_assist::index::SqliteVectorStore;
use pravo_assist::llm;
use pravo_assist::logging;
use pravo_assist::rag::Assistant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config.paths);

    let store = SqliteVectorStore::open(&config.paths.index_dir)
        .await
        .context("failed to open the vector index")?;
    let chat = llm::build_chat_provider(&config)?;
    let embedder = llm::build_embedder(&config);
    let assistant = Assistant::new(&config, Arc::new(store), chat, embedder);

    cli::run(&assistant, config.history_limit).await?;
    Ok(())
}
