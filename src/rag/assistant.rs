//! Retrieval + generation orchestration: embed the question, fetch the
//! top-k chunks, assemble the prompt and make one blocking generation
//! call.

use std::sync::Arc;

use tracing::debug;

use super::prompt;
use crate::config::{AppConfig, LlmBackend};
use crate::errors::AppError;
use crate::history::Turn;
use crate::index::{ScoredChunk, VectorStore};
use crate::llm::{ChatRequest, LlmProvider};

pub struct Assistant {
    store: Arc<dyn VectorStore>,
    chat: Arc<dyn LlmProvider>,
    embedder: Arc<dyn LlmProvider>,
    chat_model: String,
    embedding_model: String,
    top_k: usize,
    temperature: Option<f64>,
}

impl Assistant {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn VectorStore>,
        chat: Arc<dyn LlmProvider>,
        embedder: Arc<dyn LlmProvider>,
    ) -> Self {
        // The hosted backend runs with its own defaults; the local
        // model uses the reference deployment's low temperature.
        let temperature = match config.backend {
            LlmBackend::GigaChat => None,
            LlmBackend::Ollama => Some(0.1),
        };

        Self {
            store,
            chat,
            embedder,
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            top_k: config.top_k,
            temperature,
        }
    }

    /// Top-k chunks for the question, with no relevance threshold.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, AppError> {
        let embeddings = self
            .embedder
            .embed(&[question.to_string()], &self.embedding_model)
            .await?;
        let query = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("empty embedding response".to_string()))?;

        self.store.search(&query, self.top_k).await
    }

    /// Answer one question against the index, conditioned on the given
    /// (already capped) history.
    pub async fn ask(&self, question: &str, history: &[Turn]) -> Result<String, AppError> {
        let chunks = self.retrieve(question).await?;
        debug!("retrieved {} chunks for the question", chunks.len());

        let messages = prompt::assemble(&chunks, history, question);
        let mut request = ChatRequest::new(messages);
        request.temperature = self.temperature;

        self.chat.chat(request, &self.chat_model).await
    }

    /// Number of chunks currently indexed.
    pub async fn indexed_chunks(&self) -> Result<usize, AppError> {
        self.store.count().await
    }
}
