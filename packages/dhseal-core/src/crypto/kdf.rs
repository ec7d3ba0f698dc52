//! # Key Derivation Functions
//!
//! Turns raw key-agreement output into a fixed 32-byte AES-256 key.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 SHARED SECRET → PAYLOAD KEY                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SHARED SECRET                                │   │
//! │  │                                                                 │   │
//! │  │  FFDH: ceil(bits(p) / 8) bytes   (any length)                  │   │
//! │  │  ECDH: 32 bytes                                                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HKDF KEY DERIVATION                          │   │
//! │  │                                                                 │   │
//! │  │  HKDF-SHA256(                                                  │   │
//! │  │    ikm  = shared_secret,                                       │   │
//! │  │    salt = optional, agreed by both parties,                    │   │
//! │  │    info = "dhseal-payload-key-v1"                              │   │
//! │  │  )                                                            │   │
//! │  │                                                                 │   │
//! │  │  → 32-byte AES-256-GCM key                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The "-v1" suffix on every domain string leaves room for algorithm upgrades.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::encryption::{EncryptionKey, KEY_SIZE};
use crate::error::{Error, Result};

/// Domain separation strings for HKDF and hashing
pub mod domain {
    /// Default `info` for payload key derivation
    pub const PAYLOAD_KEY: &str = "dhseal-payload-key-v1";

    /// Prefix hashed in front of a key when computing its fingerprint
    pub const KEY_FINGERPRINT: &[u8] = b"dhseal-key-fingerprint-v1";
}

/// Bytes of SHA-256 output kept in a fingerprint
const FINGERPRINT_LEN: usize = 8;

/// Derive an AES-256 key from a shared secret of any length
///
/// ## Parameters
///
/// - `shared_secret`: raw key-agreement output
/// - `salt`: optional salt both parties agreed on
/// - `info`: context string binding the key to its purpose
pub fn derive_encryption_key(
    shared_secret: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
) -> Result<EncryptionKey> {
    if shared_secret.is_empty() {
        return Err(Error::KeyDerivationFailed("empty shared secret".into()));
    }

    let hkdf = Hkdf::<Sha256>::new(salt, shared_secret);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    hkdf.expand(info, &mut key[..])
        .map_err(|_| Error::KeyDerivationFailed("Failed to derive payload key".into()))?;

    Ok(EncryptionKey::from_bytes(*key))
}

/// Short, non-reversible identifier for a key
///
/// Hex of the first 8 bytes of `SHA-256(domain ∥ key)`. Two parties holding
/// the same key get the same fingerprint, which makes it safe to log or to
/// compare over an authenticated side channel.
pub fn key_fingerprint(key: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain::KEY_FINGERPRINT);
    hasher.update(key);
    let digest = hasher.finalize();

    hex::encode(&digest[..FINGERPRINT_LEN])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_deterministic() {
        let secret = [42u8; 32];

        let key1 = derive_encryption_key(&secret, None, domain::PAYLOAD_KEY.as_bytes()).unwrap();
        let key2 = derive_encryption_key(&secret, None, domain::PAYLOAD_KEY.as_bytes()).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_info_different_keys() {
        let secret = [42u8; 32];

        let key1 = derive_encryption_key(&secret, None, b"purpose-1").unwrap();
        let key2 = derive_encryption_key(&secret, None, b"purpose-2").unwrap();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_salt_changes_key() {
        let secret = [7u8; 5];

        let unsalted = derive_encryption_key(&secret, None, b"info").unwrap();
        let salted = derive_encryption_key(&secret, Some(&b"salt"[..]), b"info").unwrap();

        assert_ne!(unsalted, salted);
    }

    #[test]
    fn test_any_secret_length_yields_full_key() {
        for len in [1usize, 2, 31, 32, 33, 256] {
            let secret = vec![0x5a; len];
            assert!(derive_encryption_key(&secret, None, b"info").is_ok());
        }
        assert!(matches!(
            derive_encryption_key(&[], None, b"info"),
            Err(Error::KeyDerivationFailed(_))
        ));
    }

    #[test]
    fn test_fingerprint() {
        let fp = key_fingerprint(&[1u8; 32]);

        assert_eq!(fp.len(), FINGERPRINT_LEN * 2);
        assert_eq!(fp, key_fingerprint(&[1u8; 32]));
        assert_ne!(fp, key_fingerprint(&[2u8; 32]));
    }
}
