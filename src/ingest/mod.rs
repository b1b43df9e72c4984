//! Ingestion pipeline: load the corpus, split it into overlapping
//! chunks, stamp structural metadata, deduplicate, embed, and rebuild
//! the persistent index from scratch.
//!
//! A failure on one document is logged and skipped; a failure while
//! rebuilding the index aborts the run.

pub mod markers;
pub mod splitter;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::index::{SqliteVectorStore, StoredChunk, VectorStore};
use crate::llm::LlmProvider;
use self::splitter::{SplitterConfig, TextSplitter};

#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub unique_chunks: usize,
}

pub struct Ingestor {
    docs_dir: PathBuf,
    index_dir: PathBuf,
    extension: String,
    embedding_model: String,
    splitter: TextSplitter,
    embedder: Arc<dyn LlmProvider>,
}

impl Ingestor {
    pub fn new(config: &AppConfig, embedder: Arc<dyn LlmProvider>) -> Self {
        Self::with_options(
            config.paths.docs_dir.clone(),
            config.paths.index_dir.clone(),
            "md",
            config.embedding_model.clone(),
            SplitterConfig::new(config.chunk_size, config.chunk_overlap),
            embedder,
        )
    }

    pub fn with_options(
        docs_dir: PathBuf,
        index_dir: PathBuf,
        extension: &str,
        embedding_model: String,
        splitter: SplitterConfig,
        embedder: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            docs_dir,
            index_dir,
            extension: extension.to_string(),
            embedding_model,
            splitter: TextSplitter::new(splitter),
            embedder,
        }
    }

    pub async fn run(&self) -> Result<IngestReport, AppError> {
        let documents = self.load_documents();
        info!(
            "loaded {} documents from {}",
            documents.len(),
            self.docs_dir.display()
        );

        let mut chunks = Vec::new();
        for (source, text) in &documents {
            chunks.extend(self.split_document(source, text));
        }
        let total = chunks.len();
        let unique = dedup_chunks(chunks);
        info!(
            "split {} documents into {} chunks, {} unique",
            documents.len(),
            total,
            unique.len()
        );

        let texts: Vec<String> = unique.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts, &self.embedding_model).await?;
        if embeddings.len() != unique.len() {
            return Err(AppError::Backend(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                unique.len()
            )));
        }

        let report = IngestReport {
            documents: documents.len(),
            chunks: total,
            unique_chunks: unique.len(),
        };

        let items: Vec<(StoredChunk, Vec<f32>)> = unique.into_iter().zip(embeddings).collect();
        if let Err(err) = self.rebuild_index(items).await {
            error!("index rebuild failed: {err}");
            return Err(err);
        }

        Ok(report)
    }

    /// Collect `*.{extension}` files under the corpus directory, in a
    /// stable order. Unreadable files are skipped.
    fn load_documents(&self) -> Vec<(String, String)> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.docs_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
            })
            .collect();
        files.sort();

        let mut documents = Vec::new();
        for path in files {
            match fs::read_to_string(&path) {
                Ok(text) => documents.push((display_name(&path), text)),
                Err(err) => warn!("skipping {}: {err}", path.display()),
            }
        }
        documents
    }

    /// Clean, split and stamp one document. Labels carry forward across
    /// chunks without markers of their own; chunks before the first
    /// marker stay unlabelled.
    pub fn split_document(&self, source: &str, text: &str) -> Vec<StoredChunk> {
        let cleaned = markers::clean_gazette_boilerplate(text);
        let prepared = markers::reinject_structure_breaks(&cleaned);

        let mut labels = markers::StructuralLabels::default();
        let mut chunks = Vec::new();

        for piece in self.splitter.split(&prepared) {
            labels = markers::StructuralLabels::detect(&piece).carried_from(&labels);
            chunks.push(StoredChunk {
                id: Uuid::new_v4().to_string(),
                content: piece,
                source: source.to_string(),
                section: labels.section.clone(),
                chapter: labels.chapter.clone(),
                article: labels.article.clone(),
            });
        }

        chunks
    }

    /// Drop the old index directory wholesale and write the fresh set.
    async fn rebuild_index(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), AppError> {
        if self.index_dir.exists() {
            fs::remove_dir_all(&self.index_dir)?;
        }

        let count = items.len();
        let store = SqliteVectorStore::open(&self.index_dir).await?;
        store.insert_batch(items).await?;
        info!("saved {} chunks to {}", count, self.index_dir.display());
        Ok(())
    }
}

/// First-seen-wins deduplication by normalized content hash.
pub fn dedup_chunks(chunks: Vec<StoredChunk>) -> Vec<StoredChunk> {
    let mut seen = HashSet::new();
    chunks
        .into_iter()
        .filter(|chunk| seen.insert(markers::content_hash(&chunk.content)))
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
