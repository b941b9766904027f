// Saltvault — Library root
//
// Re-exports the hasher, store, config and CLI modules.

pub mod cli;
pub mod config;
pub mod error;
pub mod hasher;
pub mod store;

pub use config::Config;
pub use error::{Result, SaltvaultError};
pub use hasher::{Kdf, SaltedHasher};
pub use store::{CredentialBackend, CredentialId, CredentialStore, Database, MemoryBackend, SqliteBackend};
