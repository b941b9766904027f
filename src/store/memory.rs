// Saltvault — In-Memory Backend
//
// Non-durable `CredentialBackend` for tests and ephemeral use. Mirrors the
// SQLite backend's id semantics: ids start at 1, increase monotonically and
// are never reused after a delete.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::hasher::Salt;

use super::models::{CredentialId, CredentialRecord, NewCredentialRecord};
use super::repository::CredentialBackend;
use super::StorageError;

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<CredentialId, CredentialRecord>,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl CredentialBackend for MemoryBackend {
    fn create_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn insert(&self, record: &NewCredentialRecord) -> Result<CredentialId, StorageError> {
        let mut state = self.lock()?;
        state.last_id += 1;
        let id = CredentialId::new(state.last_id);
        let now = Utc::now();

        state.rows.insert(
            id,
            CredentialRecord {
                id,
                salt: record.salt,
                verifier: record.verifier.clone(),
                work_factor: record.work_factor,
                kdf: record.kdf,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn get(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StorageError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn replace(
        &self,
        id: CredentialId,
        expected_salt: &Salt,
        record: &NewCredentialRecord,
    ) -> Result<bool, StorageError> {
        let mut state = self.lock()?;
        match state.rows.get_mut(&id) {
            Some(existing) if existing.salt == *expected_salt => {
                existing.salt = record.salt;
                existing.verifier = record.verifier.clone();
                existing.work_factor = record.work_factor;
                existing.kdf = record.kdf;
                existing.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(&self, id: CredentialId) -> Result<bool, StorageError> {
        Ok(self.lock()?.rows.remove(&id).is_some())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
