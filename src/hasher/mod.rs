// Saltvault — Hasher Module
//
// Salt generation and slow, tunable key derivation (Argon2id or
// PBKDF2-HMAC-SHA256). Pure functions over their inputs; the only randomness
// is the salt, which callers inject.

mod error;
mod kdf;
mod material;

pub use error::ValidationError;
pub use kdf::{
    Kdf, SaltedHasher, DEFAULT_ARGON2_MEMORY_KIB, DEFAULT_ARGON2_PARALLELISM,
    DEFAULT_PBKDF2_ITERATIONS, DEFAULT_WORK_FACTOR,
};
pub use material::{Salt, Verifier, SALT_LEN, VERIFIER_LEN};
