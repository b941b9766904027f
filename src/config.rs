// Saltvault — Configuration
//
// Optional JSON file describing where the database lives and which
// derivation parameters new credentials get. Every field may be omitted.
// Changing the parameters never invalidates existing rows: each row records
// the parameters it was derived with.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hasher::{Kdf, SaltedHasher};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),

    #[error("config parse failed: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite file. Defaults to `<data dir>/saltvault/credentials.db`.
    pub database_path: Option<PathBuf>,
    /// Derivation function for new credentials.
    pub kdf: Kdf,
    /// Cost for new credentials. Defaults to the KDF's recommended value.
    pub work_factor: Option<u32>,
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
        let config = Self::from_json(&raw)?;

        tracing::debug!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(format!("{e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hasher()
            .validate(self.work_factor())
            .map_err(|e| ConfigError::Invalid(format!("{e}")))
    }

    pub fn hasher(&self) -> SaltedHasher {
        SaltedHasher::new(self.kdf)
    }

    pub fn work_factor(&self) -> u32 {
        self.work_factor
            .unwrap_or_else(|| self.kdf.recommended_work_factor())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

fn default_database_path() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("saltvault")
        .join("credentials.db")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
