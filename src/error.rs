use crate::config::ConfigError;
use crate::metadata::MetadataError;
use crate::tree::NewickError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Tree error: {0}")]
    Newick(#[from] NewickError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open output stream: {0}")]
    Compression(#[from] niffler::Error),

    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
