// Saltvault — Salted password hasher
//
// Turns (password, salt, work_factor) into a fixed-length verifier using a
// purpose-built password-hashing function. Holds only immutable parameters:
// no randomness, no I/O, safe to share across threads.
//
// Supported functions:
//   - Argon2id v0x13 (default): t_cost = work_factor, memory/lanes from `Kdf`
//   - PBKDF2-HMAC-SHA256: iterations = work_factor

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::material::{Verifier, SALT_LEN, VERIFIER_LEN};
use super::ValidationError;

// ─── Constants ───────────────────────────────────────────────────────────────

// Argon2id defaults: m=19456 (19 MiB), t=3, p=1.
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19 * 1024;
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;
pub const DEFAULT_WORK_FACTOR: u32 = 3;

/// Iteration count used when PBKDF2-HMAC-SHA256 is selected.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Key-derivation function and its fixed cost parameters. The per-call cost
/// (`work_factor`) is passed to `derive` and stored next to each verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Kdf {
    Argon2id { memory_kib: u32, parallelism: u32 },
    Pbkdf2Sha256,
}

impl Default for Kdf {
    fn default() -> Self {
        Kdf::Argon2id {
            memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            parallelism: DEFAULT_ARGON2_PARALLELISM,
        }
    }
}

impl Kdf {
    /// Work factor a fresh configuration should pair with this function.
    pub fn recommended_work_factor(&self) -> u32 {
        match self {
            Kdf::Argon2id { .. } => DEFAULT_WORK_FACTOR,
            Kdf::Pbkdf2Sha256 => DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

// ─── Hasher ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaltedHasher {
    kdf: Kdf,
}

impl SaltedHasher {
    pub fn new(kdf: Kdf) -> Self {
        Self { kdf }
    }

    pub fn kdf(&self) -> Kdf {
        self.kdf
    }

    /// Check the parameters without deriving anything.
    pub fn validate(&self, work_factor: u32) -> Result<(), ValidationError> {
        if work_factor == 0 {
            return Err(ValidationError::WorkFactor(work_factor));
        }
        if let Kdf::Argon2id { memory_kib, parallelism } = self.kdf {
            argon2_params(memory_kib, parallelism, work_factor)?;
        }
        Ok(())
    }

    /// Derive the verifier for `password` under `salt` and `work_factor`.
    ///
    /// The password is used in full; it is never truncated.
    pub fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        work_factor: u32,
    ) -> Result<Verifier, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        if salt.len() != SALT_LEN {
            return Err(ValidationError::SaltLength {
                expected: SALT_LEN,
                actual: salt.len(),
            });
        }
        if work_factor == 0 {
            return Err(ValidationError::WorkFactor(work_factor));
        }

        let mut output = Zeroizing::new([0u8; VERIFIER_LEN]);

        match self.kdf {
            Kdf::Argon2id { memory_kib, parallelism } => {
                let params = argon2_params(memory_kib, parallelism, work_factor)?;
                Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                    .hash_password_into(password, salt, &mut output[..])
                    .map_err(|e| {
                        ValidationError::Parameters(format!("Argon2id hash failed: {}", e))
                    })?;
            }
            Kdf::Pbkdf2Sha256 => {
                pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, work_factor, &mut output[..]);
            }
        }

        Ok(Verifier::new(output))
    }
}

fn argon2_params(memory_kib: u32, parallelism: u32, time_cost: u32) -> Result<Params, ValidationError> {
    Params::new(memory_kib, time_cost, parallelism, Some(VERIFIER_LEN))
        .map_err(|e| ValidationError::Parameters(format!("invalid Argon2 params: {}", e)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Salt;

    const SALT: [u8; SALT_LEN] = [9u8; SALT_LEN];

    fn cheap_argon2() -> SaltedHasher {
        SaltedHasher::new(Kdf::Argon2id {
            memory_kib: 64,
            parallelism: 1,
        })
    }

    fn cheap_pbkdf2() -> SaltedHasher {
        SaltedHasher::new(Kdf::Pbkdf2Sha256)
    }

    #[test]
    fn test_derivation_is_deterministic() {
        for hasher in [cheap_argon2(), cheap_pbkdf2()] {
            let a = hasher.derive(b"Secret123!", &SALT, 2).unwrap();
            let b = hasher.derive(b"Secret123!", &SALT, 2).unwrap();
            assert!(a.ct_eq(&b), "Same inputs must produce the same verifier");
            assert_eq!(a.as_bytes().len(), VERIFIER_LEN);
        }
    }

    #[test]
    fn test_single_bit_changes_alter_verifier() {
        for hasher in [cheap_argon2(), cheap_pbkdf2()] {
            let base = hasher.derive(b"Secret123!", &SALT, 2).unwrap();

            let mut flipped_salt = SALT;
            flipped_salt[0] ^= 0x01;
            let salt_changed = hasher.derive(b"Secret123!", &flipped_salt, 2).unwrap();
            assert!(!base.ct_eq(&salt_changed), "Salt bit flip must change verifier");

            // 'S' (0x53) vs 'R' (0x52) differ in one bit
            let password_changed = hasher.derive(b"Recret123!", &SALT, 2).unwrap();
            assert!(!base.ct_eq(&password_changed), "Password bit flip must change verifier");

            let work_changed = hasher.derive(b"Secret123!", &SALT, 3).unwrap();
            assert!(!base.ct_eq(&work_changed), "Work factor change must change verifier");
        }
    }

    #[test]
    fn test_long_passwords_are_not_truncated() {
        let hasher = cheap_argon2();
        let prefix = "x".repeat(200);
        let a = hasher.derive(format!("{}a", prefix).as_bytes(), &SALT, 1).unwrap();
        let b = hasher.derive(format!("{}b", prefix).as_bytes(), &SALT, 1).unwrap();
        assert!(!a.ct_eq(&b), "Bytes past position 72 must still affect the verifier");
    }

    #[test]
    fn test_algorithms_produce_different_verifiers() {
        let a = cheap_argon2().derive(b"Secret123!", &SALT, 1).unwrap();
        let b = cheap_pbkdf2().derive(b"Secret123!", &SALT, 1).unwrap();
        assert!(!a.ct_eq(&b));
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = cheap_argon2().derive(b"", &SALT, 1).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyPassword));
    }

    #[test]
    fn test_wrong_salt_length_rejected() {
        let err = cheap_pbkdf2().derive(b"pw", &[0u8; 8], 1).unwrap_err();
        match err {
            ValidationError::SaltLength { expected, actual } => {
                assert_eq!(expected, SALT_LEN);
                assert_eq!(actual, 8);
            }
            other => panic!("Expected SaltLength, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_work_factor_rejected() {
        for hasher in [cheap_argon2(), cheap_pbkdf2()] {
            let err = hasher.derive(b"pw", &SALT, 0).unwrap_err();
            assert!(matches!(err, ValidationError::WorkFactor(0)));
            assert!(hasher.validate(0).is_err());
        }
    }

    #[test]
    fn test_argon2_memory_below_minimum_rejected() {
        // Argon2 requires at least 8 KiB per lane
        let hasher = SaltedHasher::new(Kdf::Argon2id {
            memory_kib: 4,
            parallelism: 1,
        });
        assert!(matches!(
            hasher.validate(1),
            Err(ValidationError::Parameters(_))
        ));
        assert!(matches!(
            hasher.derive(b"pw", &SALT, 1),
            Err(ValidationError::Parameters(_))
        ));
    }

    #[test]
    fn test_default_parameters_derive() {
        let hasher = SaltedHasher::default();
        assert!(hasher.validate(DEFAULT_WORK_FACTOR).is_ok());
        let salt = Salt::generate();
        let v = hasher
            .derive(b"Secret123!", salt.as_bytes(), DEFAULT_WORK_FACTOR)
            .unwrap();
        assert_eq!(v.as_bytes().len(), VERIFIER_LEN);
    }

    #[test]
    fn test_kdf_json_shape() {
        let json = serde_json::to_string(&Kdf::default()).unwrap();
        assert_eq!(
            json,
            r#"{"algorithm":"argon2id","memory_kib":19456,"parallelism":1}"#
        );

        let parsed: Kdf = serde_json::from_str(r#"{"algorithm":"pbkdf2_sha256"}"#).unwrap();
        assert_eq!(parsed, Kdf::Pbkdf2Sha256);
        assert_eq!(parsed.recommended_work_factor(), DEFAULT_PBKDF2_ITERATIONS);
    }
}
