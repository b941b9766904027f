// Saltvault — Credential Store
//
// The enroll/verify contract on top of a `CredentialBackend`.
//
// Flow:
//   1. `enroll()` — fresh CSPRNG salt → `SaltedHasher::derive` → insert row
//   2. `verify()` — fetch row → re-derive with stored salt/parameters →
//      constant-time compare
//
// `verify` answers only true/false. An unknown id costs one dummy derivation
// under the default parameters, so it takes about as long as a wrong
// password and is indistinguishable from one.

use std::hint::black_box;

use crate::config::Config;
use crate::error::Result;
use crate::hasher::{Salt, SaltedHasher, ValidationError};

use super::models::{CredentialId, CredentialRecord, NewCredentialRecord};
use super::repository::CredentialBackend;

/// Fixed salt for the derivation run when an id is unknown.
const DUMMY_SALT: Salt = Salt::from_bytes(*b"saltvault-dummy!");

pub struct CredentialStore<B> {
    backend: B,
    hasher: SaltedHasher,
    work_factor: u32,
}

impl<B: CredentialBackend> CredentialStore<B> {
    /// Take ownership of `backend` and ensure its schema. New credentials are
    /// derived with `hasher` at `work_factor`.
    pub fn new(backend: B, hasher: SaltedHasher, work_factor: u32) -> Result<Self> {
        hasher.validate(work_factor)?;
        backend.create_schema()?;

        Ok(Self {
            backend,
            hasher,
            work_factor,
        })
    }

    pub fn from_config(backend: B, config: &Config) -> Result<Self> {
        Self::new(backend, config.hasher(), config.work_factor())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Release the store and hand back its backend (e.g. to close the
    /// database explicitly).
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Store a verifier for `password` and return the new credential's id.
    pub fn enroll(&self, password: &str) -> Result<CredentialId> {
        let record = self.derive_record(password)?;
        let id = self.backend.insert(&record)?;

        tracing::info!(credential_id = %id, "Credential enrolled");
        Ok(id)
    }

    /// Check `password` against the credential `id`.
    ///
    /// Returns `Ok(false)` both for a wrong password and for an unknown id.
    /// Errors only on an empty password or a storage failure.
    pub fn verify(&self, id: CredentialId, password: &str) -> Result<bool> {
        let matched = self.check(id, password)?.is_some();

        tracing::debug!(credential_id = %id, matched, "Credential verification");
        Ok(matched)
    }

    /// Replace the credential's verifier after checking `current_password`.
    ///
    /// The new verifier gets a fresh salt and the store's current default
    /// parameters. Returns `Ok(false)` without touching anything if the
    /// current password does not match or the id is unknown.
    ///
    /// The swap only lands if the row still holds the salt the current
    /// password was checked against; a rotation that lost a race returns
    /// `Ok(false)`.
    pub fn rotate(&self, id: CredentialId, current_password: &str, new_password: &str) -> Result<bool> {
        if new_password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        let Some(checked) = self.check(id, current_password)? else {
            return Ok(false);
        };

        let record = self.derive_record(new_password)?;
        let replaced = self.backend.replace(id, &checked.salt, &record)?;

        if replaced {
            tracing::info!(credential_id = %id, "Credential rotated");
        } else {
            tracing::info!(credential_id = %id, "Credential changed concurrently, rotation dropped");
        }
        Ok(replaced)
    }

    /// Whether a stored credential was derived with parameters other than
    /// the current defaults. `None` if the id is unknown.
    pub fn needs_rehash(&self, id: CredentialId) -> Result<Option<bool>> {
        Ok(self.backend.get(id)?.map(|record| {
            record.kdf != self.hasher.kdf() || record.work_factor != self.work_factor
        }))
    }

    /// Remove a credential. Returns true if it existed.
    pub fn delete(&self, id: CredentialId) -> Result<bool> {
        let deleted = self.backend.delete(id)?;
        if deleted {
            tracing::info!(credential_id = %id, "Credential deleted");
        }
        Ok(deleted)
    }

    fn derive_record(&self, password: &str) -> Result<NewCredentialRecord> {
        let salt = Salt::generate();
        let verifier = self
            .hasher
            .derive(password.as_bytes(), salt.as_bytes(), self.work_factor)?;

        Ok(NewCredentialRecord {
            salt,
            verifier,
            work_factor: self.work_factor,
            kdf: self.hasher.kdf(),
        })
    }

    /// The stored record if `password` matches it. Unknown ids pay for one
    /// derivation before answering `None`.
    fn check(&self, id: CredentialId, password: &str) -> Result<Option<CredentialRecord>> {
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        match self.backend.get(id)? {
            Some(record) => Ok(self.matches(&record, password)?.then_some(record)),
            None => {
                self.burn_dummy_derivation(password)?;
                Ok(None)
            }
        }
    }

    fn matches(&self, record: &CredentialRecord, password: &str) -> Result<bool> {
        let candidate = record.hasher().derive(
            password.as_bytes(),
            record.salt.as_bytes(),
            record.work_factor,
        )?;
        Ok(candidate.ct_eq(&record.verifier))
    }

    fn burn_dummy_derivation(&self, password: &str) -> Result<()> {
        let candidate = self
            .hasher
            .derive(password.as_bytes(), DUMMY_SALT.as_bytes(), self.work_factor)?;
        black_box(candidate.ct_eq(&candidate));
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
