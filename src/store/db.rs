// Saltvault — SQLite Database Management
//
// Owns the single SQLite connection. The handle is opened once, passed into
// the backend, and closed when dropped (or explicitly via `close`). The
// connection sits behind a mutex so one handle can serve concurrent callers;
// the lock is held for a single statement at a time.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use super::StorageError;

/// Owned SQLite connection handle.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at the given path and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        // WAL for concurrent readers + crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_schema()?;

        tracing::debug!(path = %path.display(), "Database opened");
        Ok(db)
    }

    /// Open an in-memory database (for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_schema()?;
        Ok(db)
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&conn)
    }

    /// Create the credentials table if it does not exist. Idempotent.
    pub fn create_schema(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS credentials (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    salt        BLOB    NOT NULL,
                    verifier    BLOB    NOT NULL,
                    work_factor INTEGER NOT NULL,
                    kdf         TEXT    NOT NULL,
                    created_at  TEXT    NOT NULL,
                    updated_at  TEXT    NOT NULL
                );
                ",
            )?;
            Ok(())
        })?;

        tracing::debug!("Database schema ensured");
        Ok(())
    }

    /// Close the connection, reporting any error SQLite raises on shutdown.
    pub fn close(self) -> Result<(), StorageError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| StorageError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StorageError::Database(e))?;

        tracing::debug!("Database closed");
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
