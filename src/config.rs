use std::env;
use std::fs;
use std::path::PathBuf;

use crate::errors::AppError;

/// On-disk layout of the assistant.
///
/// Everything lives under one data directory, overridable with
/// `PRAVO_DATA_DIR`. The index directory is intentionally not created
/// here: ingestion owns it and rebuilds it wholesale.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub links_file: PathBuf,
    pub docs_dir: PathBuf,
    pub index_dir: PathBuf,
    pub history_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = env::var("PRAVO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let links_file = data_dir.join("input").join("links.txt");
        let docs_dir = data_dir.join("docs");
        let index_dir = data_dir.join("index");
        let history_dir = data_dir.join("chat_histories");
        let log_dir = data_dir.join("logs");

        for dir in [&docs_dir, &history_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            links_file,
            docs_dir,
            index_dir,
            history_dir,
            log_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Which text-generation backend answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    GigaChat,
    Ollama,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: AppPaths,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Trailing/leading context shared by adjacent chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Most recent turns included in generator input.
    pub history_limit: usize,
    pub backend: LlmBackend,
    pub chat_model: String,
    pub embedding_model: String,
    pub ollama_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let backend = match env::var("LLM_BACKEND").as_deref() {
            Ok("ollama") => LlmBackend::Ollama,
            Ok("gigachat") | Err(_) => LlmBackend::GigaChat,
            Ok(other) => {
                return Err(AppError::Config(format!(
                    "unknown LLM_BACKEND '{other}', expected 'gigachat' or 'ollama'"
                )))
            }
        };

        let chat_model = env::var("CHAT_MODEL").unwrap_or_else(|_| {
            match backend {
                LlmBackend::GigaChat => "GigaChat",
                LlmBackend::Ollama => "llama3.2:latest",
            }
            .to_string()
        });

        Ok(AppConfig {
            paths: AppPaths::new(),
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 3,
            history_limit: 10,
            backend,
            chat_model,
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "mxbai-embed-large".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
        })
    }

    /// Authorization key for the hosted backend. Checked before any
    /// service call; absence is fatal.
    pub fn gigachat_credentials() -> Result<String, AppError> {
        env::var("GIGACHAT_AUTHORIZATION_KEY")
            .map_err(|_| AppError::Config("GIGACHAT_AUTHORIZATION_KEY is not set".to_string()))
    }

    /// Bot platform access token. Required by the bot binary at startup.
    pub fn telegram_token() -> Result<String, AppError> {
        env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| AppError::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))
    }
}
