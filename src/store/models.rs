// Saltvault — Credential data models
//
// SECURITY: no model carries a plaintext password. Salt and verifier bytes
// are redacted from Debug output by `Salt` and `Verifier` themselves.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hasher::{Kdf, Salt, SaltedHasher, Verifier};

/// Opaque surrogate key of a stored credential. Assigned by the backend,
/// monotonically increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(i64);

impl CredentialId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CredentialId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A stored credential as read back from a backend.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub id: CredentialId,
    pub salt: Salt,
    pub verifier: Verifier,
    pub work_factor: u32,
    pub kdf: Kdf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// The hasher that produced this record's verifier.
    pub fn hasher(&self) -> SaltedHasher {
        SaltedHasher::new(self.kdf)
    }
}

/// Input for inserting or replacing a credential row.
#[derive(Debug, Clone)]
pub struct NewCredentialRecord {
    pub salt: Salt,
    pub verifier: Verifier,
    pub work_factor: u32,
    pub kdf: Kdf,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
