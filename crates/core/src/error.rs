use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("embedding service error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index store error: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query request failed: {0}")]
    Request(String),

    #[error("index store error: {0}")]
    Index(#[from] IndexError),

    #[error("embedding service error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("generation service error: {0}")]
    Generation(#[from] GenerationError),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no index found at {0} (run ingestion first)")]
    NotFound(PathBuf),

    #[error("index is corrupt: {0}")]
    Corrupt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding backend returned {status}: {details}")]
    Backend { status: String, details: String },

    #[error("invalid embedding response: {0}")]
    Response(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation backend returned {status}: {details}")]
    Backend { status: String, details: String },

    #[error("invalid generation response: {0}")]
    Response(String),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
