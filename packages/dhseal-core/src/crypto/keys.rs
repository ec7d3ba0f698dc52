//! # Key Pairs
//!
//! One key pair per session, produced by a [`KeyAgreement`](super::KeyAgreement)
//! engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY PAIR                                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Private scalar (secret)          Public value (shared)                 │
//! │  ───────────────────────          ─────────────────────                 │
//! │  • FFDH: x in [2, p − 2]          • FFDH: g^x mod p, big-endian         │
//! │  • ECDH: scalar in [1, n − 1]     • secp256k1/P-256: SEC1 uncompressed  │
//! │  • zeroized on drop               • X25519: 32-byte u-coordinate        │
//! │  • never serialized or logged     • hex helpers for transport           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use zeroize::Zeroizing;

use super::params::NamedCurve;
use crate::error::{Error, Result};

/// Which engine produced a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Finite-field Diffie-Hellman
    FiniteField,
    /// Elliptic-curve Diffie-Hellman on the given curve
    Curve(NamedCurve),
}

/// A private scalar and its public value
///
/// ## Security
///
/// - The private scalar is zeroized when the pair is dropped
/// - `Debug` output never contains the private scalar
/// - Key pairs are not `Clone`: one owner per session
pub struct KeyPair {
    kind: KeyKind,
    private: Zeroizing<Vec<u8>>,
    public: Vec<u8>,
}

impl KeyPair {
    pub(crate) fn new(kind: KeyKind, private: Zeroizing<Vec<u8>>, public: Vec<u8>) -> Self {
        Self {
            kind,
            private,
            public,
        }
    }

    /// Engine that produced this pair
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Public value to send to the peer
    pub fn public_bytes(&self) -> &[u8] {
        &self.public
    }

    /// Public value as lowercase hex
    pub fn public_hex(&self) -> String {
        hex::encode(&self.public)
    }

    /// Private scalar, big-endian
    pub(crate) fn private_bytes(&self) -> &[u8] {
        &self.private
    }

    /// Reject a pair that was produced by a different engine
    pub(crate) fn expect_kind(&self, expected: KeyKind) -> Result<()> {
        if self.kind != expected {
            return Err(Error::InvalidKey(format!(
                "key pair was generated for {:?}, engine expects {:?}",
                self.kind, expected
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kind", &self.kind)
            .field("public", &self.public_hex())
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Decode a hex-encoded public value received from a peer
pub fn public_value_from_hex(hex_str: &str) -> Result<Vec<u8>> {
    hex::decode(hex_str).map_err(|e| Error::KeyAgreementFailure(format!("Invalid hex: {}", e)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KeyPair {
        KeyPair::new(
            KeyKind::FiniteField,
            Zeroizing::new(vec![0x13, 0x37]),
            vec![0xab, 0xcd],
        )
    }

    #[test]
    fn test_debug_redacts_private() {
        let kp = sample();
        let debug = format!("{:?}", kp);

        assert!(debug.contains("abcd"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("1337"));
    }

    #[test]
    fn test_expect_kind() {
        let kp = sample();

        assert!(kp.expect_kind(KeyKind::FiniteField).is_ok());
        assert!(matches!(
            kp.expect_kind(KeyKind::Curve(NamedCurve::X25519)),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_public_hex_round_trip() {
        let kp = sample();
        let decoded = public_value_from_hex(&kp.public_hex()).unwrap();

        assert_eq!(decoded, kp.public_bytes());
        assert!(public_value_from_hex("zz").is_err());
    }
}
