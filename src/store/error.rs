// Saltvault — Store error types

use thiserror::Error;

use super::CredentialId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Corrupt credential record {id}: {reason}")]
    CorruptRecord { id: CredentialId, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}
