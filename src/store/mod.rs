// Saltvault — Store Module
//
// Credential persistence and the enroll/verify contract. Rows hold only the
// salt, the derived verifier and the derivation parameters.

mod credentials;
mod db;
mod error;
mod memory;
mod models;
mod repository;

pub use credentials::CredentialStore;
pub use db::Database;
pub use error::StorageError;
pub use memory::MemoryBackend;
pub use models::{CredentialId, CredentialRecord, NewCredentialRecord};
pub use repository::{CredentialBackend, SqliteBackend};
