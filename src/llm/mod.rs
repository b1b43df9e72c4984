//! Text-generation and embedding backends.
//!
//! `GigaChatProvider` talks to the hosted API, `OllamaProvider` to a
//! locally running model server. Embeddings always go through Ollama,
//! whichever backend generates answers.

pub mod gigachat;
pub mod ollama;
pub mod provider;
pub mod types;

use std::sync::Arc;

pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest};

use crate::config::{AppConfig, LlmBackend};
use crate::errors::AppError;

/// Build the generation backend selected by the configuration.
pub fn build_chat_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, AppError> {
    match config.backend {
        LlmBackend::GigaChat => {
            let credentials = AppConfig::gigachat_credentials()?;
            Ok(Arc::new(gigachat::GigaChatProvider::new(credentials)?))
        }
        LlmBackend::Ollama => Ok(Arc::new(ollama::OllamaProvider::new(
            config.ollama_url.clone(),
        ))),
    }
}

/// Build the embedding backend. The index embeds through Ollama in both
/// deployment variants.
pub fn build_embedder(config: &AppConfig) -> Arc<dyn LlmProvider> {
    Arc::new(ollama::OllamaProvider::new(config.ollama_url.clone()))
}
