// Saltvault — Salt and verifier byte containers
//
// SECURITY: neither type Debug-prints its bytes. `Verifier` is zeroized on
// drop and has no `PartialEq`. Equality goes through `ct_eq`, which does not exit early on
// the first differing byte.

use std::fmt;

use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Derived verifier length in bytes (256 bits).
pub const VERIFIER_LEN: usize = 32;

/// Per-credential random salt.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the thread-local CSPRNG (ChaCha, seeded by the OS).
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns `None` unless `bytes` is exactly `SALT_LEN` long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; SALT_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Output of the key-derivation function. Opaque; never decodable back to
/// the password.
#[derive(Clone)]
pub struct Verifier(Zeroizing<[u8; VERIFIER_LEN]>);

impl Verifier {
    pub(crate) fn new(bytes: Zeroizing<[u8; VERIFIER_LEN]>) -> Self {
        Self(bytes)
    }

    /// Returns `None` unless `bytes` is exactly `VERIFIER_LEN` long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; VERIFIER_LEN] = bytes.try_into().ok()?;
        Some(Self(Zeroizing::new(array)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &Verifier) -> bool {
        self.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt([REDACTED])")
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Verifier([REDACTED])")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
