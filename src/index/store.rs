//! VectorStore trait — abstract interface for the persistent index.
//!
//! The primary implementation is `SqliteVectorStore` in the `sqlite`
//! module. The index is written once per ingestion run and read-only at
//! query time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A stored chunk with its provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source file the chunk was cut from.
    pub source: String,
    /// Nearest preceding "РАЗДЕЛ …" marker, if any.
    pub section: Option<String>,
    /// Nearest preceding "ГЛАВА …" marker, if any.
    pub chapter: Option<String>,
    /// Nearest preceding "Статья …" marker, if any.
    pub article: Option<String>,
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Abstract interface over the persistent vector index.
///
/// Search returns the top-k chunks by similarity with no score
/// threshold: a non-empty index always yields k results, relevant or
/// not. The context-only answering policy is enforced in the prompt.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embedding vectors in one transaction.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), AppError>;

    /// Top-`limit` chunks by cosine similarity to the query embedding.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, AppError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, AppError>;
}
