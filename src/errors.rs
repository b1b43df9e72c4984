use thiserror::Error;

/// Error taxonomy for the assistant.
///
/// `Config` is raised before any service call and is always fatal.
/// `Auth` and `Backend` surface at the provider call boundary and are
/// caught by the front-ends. `Index` failures during a rebuild abort the
/// ingestion run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("index error: {0}")]
    Index(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        AppError::Backend(err.to_string())
    }

    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        AppError::Index(err.to_string())
    }
}
