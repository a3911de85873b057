//! Password-reset secrets.
//!
//! A reset secret is 32 random bytes, hex encoded, handed to the account
//! owner exactly once. Only its SHA-256 digest is ever stored.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use sha2::Digest;
use sha2::Sha256;

/// Number of random bytes in a reset secret (256 bits).
pub const SECRET_BYTES: usize = 32;

/// Source of cryptographically secure random bytes.
pub trait SecretSource: Send + Sync + 'static {
    fn fill(&self, buffer: &mut [u8]);
}

/// Operating-system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSecretSource;

impl SecretSource for OsSecretSource {
    fn fill(&self, buffer: &mut [u8]) {
        OsRng.fill_bytes(buffer);
    }
}

/// Raw reset secret as delivered to the account owner.
///
/// `Debug` is redacted so the secret does not end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetSecret(String);

impl ResetSecret {
    /// Draw a fresh secret from `source`.
    pub fn generate(source: &dyn SecretSource) -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        source.fill(&mut bytes);
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Wrap a secret received from a client.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// SHA-256 digest of the secret, lowercase hex.
    pub fn digest(&self) -> String {
        digest(&self.0)
    }
}

impl fmt::Debug for ResetSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetSecret(<redacted>)")
    }
}

/// Deterministic one-way digest used to store and look up reset secrets.
pub fn digest(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(u8);

    impl SecretSource for FixedSource {
        fn fill(&self, buffer: &mut [u8]) {
            buffer.fill(self.0);
        }
    }

    #[test]
    fn test_generate_encodes_256_bits() {
        let secret = ResetSecret::generate(&OsSecretSource);
        assert_eq!(secret.expose().len(), SECRET_BYTES * 2);
        assert!(secret.expose().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_uses_source() {
        let secret = ResetSecret::generate(&FixedSource(0xab));
        assert_eq!(secret.expose(), "ab".repeat(SECRET_BYTES));
    }

    #[test]
    fn test_os_source_secrets_differ() {
        let first = ResetSecret::generate(&OsSecretSource);
        let second = ResetSecret::generate(&OsSecretSource);
        assert_ne!(first, second);
    }

    #[test]
    fn test_digest_is_deterministic_sha256() {
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let secret = ResetSecret::from_raw("abc");
        assert_eq!(secret.digest(), digest("abc"));
        assert_ne!(secret.digest(), secret.expose());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = ResetSecret::from_raw("super-secret");
        assert!(!format!("{secret:?}").contains("super-secret"));
    }
}
