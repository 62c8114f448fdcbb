//! Local storage and configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize thread collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "E_STORE_READ",
            StorageError::Write { .. } => "E_STORE_WRITE",
            StorageError::Serialize(_) => "E_STORE_SERDE",
            StorageError::InvalidKey(_) => "E_STORE_KEY",
        }
    }
}

/// Errors while resolving the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {message}")]
    InvalidApiUrl { url: String, message: String },
}
