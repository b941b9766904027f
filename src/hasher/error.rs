// Saltvault — Hasher error types

use thiserror::Error;

/// Input rejected before any derivation or I/O takes place.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Invalid salt length: expected {expected} bytes, got {actual}")]
    SaltLength { expected: usize, actual: usize },

    #[error("Invalid work factor {0}: must be at least 1")]
    WorkFactor(u32),

    #[error("Invalid key derivation parameters: {0}")]
    Parameters(String),
}
