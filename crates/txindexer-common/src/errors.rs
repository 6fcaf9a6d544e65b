//! Error types for the txindexer system

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Errors that only affect a single cycle or transaction.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Rpc(_) | Error::Classification(_) | Error::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
