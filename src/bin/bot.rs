use std::sync::Arc;

use anyhow::Context;
use teloxide::Bot;

use pravo_assist::bot;
use pravo_assist::config::AppConfig;
use pravo_assist::history::SessionStore;
use pravo_assist::index::SqliteVectorStore;
use pravo_assist::llm;
use pravo_assist::logging;
use pravo_assist::rag::Assistant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config.paths);

    let token = AppConfig::telegram_token()?;

    let store = SqliteVectorStore::open(&config.paths.index_dir)
        .await
        .context("failed to open the vector index")?;
    let chat = llm::build_chat_provider(&config)?;
    let embedder = llm::build_embedder(&config);
    let assistant = Arc::new(Assistant::new(&config, Arc::new(store), chat, embedder));
    let sessions = Arc::new(SessionStore::new(config.paths.history_dir.clone())?);

    tracing::info!("бот запущен");
    bot::run(Bot::new(token), assistant, sessions, Arc::new(config)).await;
    Ok(())
}
