// Saltvault — Credential Repository
//
// The persistence collaborator behind `CredentialStore`: a small CRUD trait
// plus its SQLite implementation. Row-level consistency is the backend's
// job; the store above it does no locking of its own.
//
// Every read validates field lengths and parameters. A row that fails
// validation is reported as `StorageError::CorruptRecord`, never skipped.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::hasher::{Kdf, Salt, SaltedHasher, Verifier, SALT_LEN, VERIFIER_LEN};

use super::db::Database;
use super::models::{CredentialId, CredentialRecord, NewCredentialRecord};
use super::StorageError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over credential persistence.
pub trait CredentialBackend: Send + Sync {
    /// Ensure the credential table/collection exists. Idempotent.
    fn create_schema(&self) -> Result<(), StorageError>;

    /// Atomically insert a new row. Returns the assigned id.
    fn insert(&self, record: &NewCredentialRecord) -> Result<CredentialId, StorageError>;

    /// Point lookup by id.
    fn get(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StorageError>;

    /// Atomically swap salt, verifier and parameters of a row that still
    /// carries `expected_salt`. Returns false if the row is gone or was
    /// rotated since the caller read it.
    fn replace(
        &self,
        id: CredentialId,
        expected_salt: &Salt,
        record: &NewCredentialRecord,
    ) -> Result<bool, StorageError>;

    /// Delete a row. Returns true if it existed.
    fn delete(&self, id: CredentialId) -> Result<bool, StorageError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Give the database handle back, e.g. for an explicit `close`.
    pub fn into_database(self) -> Database {
        self.db
    }
}

impl CredentialBackend for SqliteBackend {
    fn create_schema(&self) -> Result<(), StorageError> {
        self.db.create_schema()
    }

    fn insert(&self, record: &NewCredentialRecord) -> Result<CredentialId, StorageError> {
        let kdf_json = serde_json::to_string(&record.kdf)?;
        let now = Utc::now().to_rfc3339();

        // last_insert_rowid must be read under the same lock as the INSERT
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO credentials
                    (salt, verifier, work_factor, kdf, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.salt.as_bytes(),
                    record.verifier.as_bytes(),
                    record.work_factor,
                    kdf_json,
                    now,
                    now,
                ],
            )
            .map_err(map_write_error)?;
            Ok(CredentialId::new(conn.last_insert_rowid()))
        })?;

        Ok(id)
    }

    fn get(&self, id: CredentialId) -> Result<Option<CredentialRecord>, StorageError> {
        let row = self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, salt, verifier, work_factor, kdf, created_at, updated_at
                     FROM credentials WHERE id = ?1",
                    params![id.get()],
                    RawCredentialRow::from_row,
                )
                .optional()?;
            Ok(row)
        })?;

        row.map(RawCredentialRow::into_record).transpose()
    }

    fn replace(
        &self,
        id: CredentialId,
        expected_salt: &Salt,
        record: &NewCredentialRecord,
    ) -> Result<bool, StorageError> {
        let kdf_json = serde_json::to_string(&record.kdf)?;
        let now = Utc::now().to_rfc3339();

        let affected = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE credentials
                 SET salt = ?1, verifier = ?2, work_factor = ?3, kdf = ?4, updated_at = ?5
                 WHERE id = ?6 AND salt = ?7",
                params![
                    record.salt.as_bytes(),
                    record.verifier.as_bytes(),
                    record.work_factor,
                    kdf_json,
                    now,
                    id.get(),
                    expected_salt.as_bytes(),
                ],
            )
            .map_err(map_write_error)
        })?;

        Ok(affected > 0)
    }

    fn delete(&self, id: CredentialId) -> Result<bool, StorageError> {
        let affected = self.db.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM credentials WHERE id = ?1", params![id.get()])?)
        })?;

        Ok(affected > 0)
    }
}

fn map_write_error(e: rusqlite::Error) -> StorageError {
    match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::Conflict(msg.unwrap_or_else(|| err.to_string()))
        }
        other => StorageError::Database(other),
    }
}

// ─── Row decoding ────────────────────────────────────────────────────────────

/// Columns exactly as SQLite returned them, before validation.
struct RawCredentialRow {
    id: i64,
    salt: Vec<u8>,
    verifier: Vec<u8>,
    work_factor: i64,
    kdf: String,
    created_at: String,
    updated_at: String,
}

impl RawCredentialRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            salt: row.get(1)?,
            verifier: row.get(2)?,
            work_factor: row.get(3)?,
            kdf: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<CredentialRecord, StorageError> {
        let id = CredentialId::new(self.id);
        let corrupt = |reason: String| {
            tracing::warn!(credential_id = %id, %reason, "Corrupt credential row");
            StorageError::CorruptRecord { id, reason }
        };

        let salt = Salt::from_slice(&self.salt).ok_or_else(|| {
            corrupt(format!("salt is {} bytes, expected {}", self.salt.len(), SALT_LEN))
        })?;
        let verifier = Verifier::from_slice(&self.verifier).ok_or_else(|| {
            corrupt(format!(
                "verifier is {} bytes, expected {}",
                self.verifier.len(),
                VERIFIER_LEN
            ))
        })?;
        let work_factor = u32::try_from(self.work_factor)
            .ok()
            .filter(|w| *w > 0)
            .ok_or_else(|| corrupt(format!("work factor {} out of range", self.work_factor)))?;
        let kdf: Kdf = serde_json::from_str(&self.kdf)
            .map_err(|e| corrupt(format!("unreadable kdf parameters: {}", e)))?;
        SaltedHasher::new(kdf)
            .validate(work_factor)
            .map_err(|e| corrupt(e.to_string()))?;
        let created_at = parse_timestamp(&self.created_at).map_err(&corrupt)?;
        let updated_at = parse_timestamp(&self.updated_at).map_err(&corrupt)?;

        Ok(CredentialRecord {
            id,
            salt,
            verifier,
            work_factor,
            kdf,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", raw, e))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(fill: u8) -> NewCredentialRecord {
        NewCredentialRecord {
            salt: Salt::from_bytes([fill; SALT_LEN]),
            verifier: Verifier::from_slice(&[fill; VERIFIER_LEN]).unwrap(),
            work_factor: 1000,
            kdf: Kdf::Pbkdf2Sha256,
        }
    }

    fn setup_backend() -> SqliteBackend {
        SqliteBackend::new(Database::open_in_memory().unwrap())
    }

    fn insert_raw(backend: &SqliteBackend, salt: &[u8], verifier: &[u8], work_factor: i64, kdf: &str) -> CredentialId {
        let now = Utc::now().to_rfc3339();
        backend
            .database()
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO credentials (salt, verifier, work_factor, kdf, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![salt, verifier, work_factor, kdf, now],
                )?;
                Ok(CredentialId::new(conn.last_insert_rowid()))
            })
            .unwrap()
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let backend = setup_backend();
        let first = backend.insert(&sample_record(1)).unwrap();
        let second = backend.insert(&sample_record(2)).unwrap();
        assert_eq!(first, CredentialId::new(1));
        assert_eq!(second, CredentialId::new(2));
    }

    #[test]
    fn test_get_returns_inserted_fields() {
        let backend = setup_backend();
        let id = backend.insert(&sample_record(7)).unwrap();

        let record = backend.get(id).unwrap().expect("Record should exist");
        assert_eq!(record.id, id);
        assert_eq!(record.salt, Salt::from_bytes([7; SALT_LEN]));
        assert_eq!(record.verifier.as_bytes(), &[7u8; VERIFIER_LEN][..]);
        assert_eq!(record.work_factor, 1000);
        assert_eq!(record.kdf, Kdf::Pbkdf2Sha256);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_get_nonexistent_returns_none() {
        let backend = setup_backend();
        assert!(backend.get(CredentialId::new(99)).unwrap().is_none());
    }

    #[test]
    fn test_replace_swaps_material() {
        let backend = setup_backend();
        let id = backend.insert(&sample_record(1)).unwrap();

        let replacement = NewCredentialRecord {
            kdf: Kdf::default(),
            work_factor: 3,
            ..sample_record(2)
        };
        assert!(backend
            .replace(id, &Salt::from_bytes([1; SALT_LEN]), &replacement)
            .unwrap());

        let record = backend.get(id).unwrap().unwrap();
        assert_eq!(record.salt, Salt::from_bytes([2; SALT_LEN]));
        assert_eq!(record.work_factor, 3);
        assert_eq!(record.kdf, Kdf::default());
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_replace_nonexistent_returns_false() {
        let backend = setup_backend();
        let salt = Salt::from_bytes([1; SALT_LEN]);
        assert!(!backend.replace(CredentialId::new(5), &salt, &sample_record(1)).unwrap());
    }

    #[test]
    fn test_replace_with_stale_salt_changes_nothing() {
        let backend = setup_backend();
        let id = backend.insert(&sample_record(1)).unwrap();

        let stale = Salt::from_bytes([7; SALT_LEN]);
        assert!(!backend.replace(id, &stale, &sample_record(2)).unwrap());

        let record = backend.get(id).unwrap().unwrap();
        assert_eq!(record.salt, Salt::from_bytes([1; SALT_LEN]));
        assert!(record.verifier.ct_eq(&Verifier::from_slice(&[1; VERIFIER_LEN]).unwrap()));
    }

    #[test]
    fn test_delete_credential() {
        let backend = setup_backend();
        let id = backend.insert(&sample_record(1)).unwrap();

        assert!(backend.delete(id).unwrap(), "Delete should return true for existing row");
        assert!(backend.get(id).unwrap().is_none(), "Row should be gone after deletion");
        assert!(!backend.delete(id).unwrap(), "Second delete should return false");
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let backend = setup_backend();
        let first = backend.insert(&sample_record(1)).unwrap();
        backend.delete(first).unwrap();
        let second = backend.insert(&sample_record(2)).unwrap();
        assert!(second > first, "AUTOINCREMENT must not hand out a deleted id again");
    }

    #[test]
    fn test_short_salt_is_corrupt() {
        let backend = setup_backend();
        let id = insert_raw(&backend, &[1u8; 8], &[0u8; VERIFIER_LEN], 1000, r#"{"algorithm":"pbkdf2_sha256"}"#);

        match backend.get(id) {
            Err(StorageError::CorruptRecord { id: bad, reason }) => {
                assert_eq!(bad, id);
                assert!(reason.contains("salt"));
            }
            other => panic!("Expected CorruptRecord, got {:?}", other.map(|r| r.map(|r| r.id))),
        }
    }

    #[test]
    fn test_wrong_verifier_length_is_corrupt() {
        let backend = setup_backend();
        let id = insert_raw(&backend, &[1u8; SALT_LEN], &[0u8; 20], 1000, r#"{"algorithm":"pbkdf2_sha256"}"#);
        assert!(matches!(backend.get(id), Err(StorageError::CorruptRecord { .. })));
    }

    #[test]
    fn test_non_positive_work_factor_is_corrupt() {
        let backend = setup_backend();
        for work_factor in [0, -5] {
            let id = insert_raw(
                &backend,
                &[1u8; SALT_LEN],
                &[0u8; VERIFIER_LEN],
                work_factor,
                r#"{"algorithm":"pbkdf2_sha256"}"#,
            );
            assert!(matches!(backend.get(id), Err(StorageError::CorruptRecord { .. })));
        }
    }

    #[test]
    fn test_unknown_kdf_is_corrupt() {
        let backend = setup_backend();
        let id = insert_raw(&backend, &[1u8; SALT_LEN], &[0u8; VERIFIER_LEN], 1, r#"{"algorithm":"sha384"}"#);
        assert!(matches!(backend.get(id), Err(StorageError::CorruptRecord { .. })));
    }

    #[test]
    fn test_create_schema_via_trait_is_idempotent() {
        let backend = setup_backend();
        let id = backend.insert(&sample_record(3)).unwrap();
        backend.create_schema().unwrap();
        assert!(backend.get(id).unwrap().is_some(), "Schema re-creation must keep rows");
    }
}
