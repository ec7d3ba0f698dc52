//! # dhseal Core
//!
//! Diffie-Hellman key agreement feeding AES-256-GCM sealed payloads.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DHSEAL CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────────┐  ┌──────────────────────────┐    │
//! │  │   Search    │  │     Session     │  │         Payload          │    │
//! │  │             │  │                 │  │                          │    │
//! │  │ - Prime     │  │ - Key pair      │  │ - nonce ∥ ct ∥ tag       │    │
//! │  │   lengths   │  │ - Establish     │  │ - Raw / hex / base64     │    │
//! │  │ - rayon     │  │ - Seal / open   │  │ - Split / authenticate   │    │
//! │  └──────┬──────┘  └────────┬────────┘  └────────────┬─────────────┘    │
//! │         │                  │                        │                  │
//! │         └──────────────────┴────────────────────────┘                  │
//! │                            │                                            │
//! │  ┌─────────────────────────▼───────────────────────────────────────┐   │
//! │  │                         Crypto                                   │   │
//! │  │                                                                  │   │
//! │  │  - Primality (trial division, Miller–Rabin)                      │   │
//! │  │  - FFDH (num-bigint)   - ECDH (k256, p256, x25519-dalek)          │   │
//! │  │  - HKDF-SHA256         - AES-256-GCM (12 / 16 / 24-byte nonces)   │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Key agreement, key derivation and AEAD primitives
//! - [`payload`] - Payload framing and encoding
//! - [`session`] - Per-party session and keyed channel
//! - [`search`] - Finite-field parameter search
//! - [`config`] - Channel configuration
//!
//! ## Quick Start
//!
//! ```
//! use dhseal_core::{ChannelConfig, DomainParameters, Session};
//!
//! let params = DomainParameters::curve("x25519").unwrap();
//! let config = ChannelConfig::default();
//!
//! let alice = Session::new(params.clone(), &config).unwrap();
//! let bob = Session::new(params, &config).unwrap();
//!
//! let alice_public = alice.public_value().to_vec();
//! let alice_channel = alice.establish(bob.public_value()).unwrap();
//! let bob_channel = bob.establish(&alice_public).unwrap();
//!
//! let payload = alice_channel.seal(b"hello").unwrap();
//! assert_eq!(bob_channel.open(&payload).unwrap(), b"hello");
//! ```
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Key Agreement                                                │
//! │  ──────────────────────                                                 │
//! │  Peer public values are range- or curve-checked before use. Values     │
//! │  that would force a degenerate secret are refused.                     │
//! │                                                                         │
//! │  Layer 2: Key Derivation                                               │
//! │  ───────────────────────                                                │
//! │  HKDF-SHA256 by default, so secrets of any length give a 32-byte key. │
//! │                                                                         │
//! │  Layer 3: Authenticated Encryption (AES-256-GCM)                       │
//! │  ───────────────────────────────────────────────                        │
//! │  Fresh random nonce per payload. Decryption fails closed: a bad tag   │
//! │  never releases plaintext.                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Not covered: peer authentication, replay protection, transport.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod search;
pub mod session;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::{ChannelConfig, KeyDerivation};
pub use crypto::{
    DomainParameters, KeyAgreement, KeyAgreementEngine, KeyPair, NamedCurve, SecretEncoding,
    SharedSecret,
};
pub use error::{Error, Result};
pub use payload::{decrypt_payload, split_payload, Payload, PayloadCodec, PayloadEncoding};
pub use search::{find_prime_for_secret_length, search_with, select_modulus, SearchOptions};
pub use session::{Channel, Session};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of dhseal Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns build information for debugging
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        target: std::env::consts::OS,
        profile: if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
    }
}

/// Build information for debugging
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Crate version
    pub version: &'static str,
    /// Target operating system
    pub target: &'static str,
    /// Build profile (debug/release)
    pub profile: &'static str,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert_eq!(info.version, version());
        assert!(!info.target.is_empty());
    }
}
