// Saltvault — Top-level error types
//
// Aggregates errors from the hasher, store and config modules into a single
// error enum for the library boundary. A password mismatch is not an error.

use thiserror::Error;

/// Top-level error type for all Saltvault operations.
#[derive(Debug, Error)]
pub enum SaltvaultError {
    #[error("Validation error: {0}")]
    Validation(#[from] crate::hasher::ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::store::StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SaltvaultError>;
