//! Persistent vector index.

pub mod sqlite;
pub mod store;

pub use sqlite::SqliteVectorStore;
pub use store::{ScoredChunk, StoredChunk, VectorStore};
