//! # Cryptography Module
//!
//! Key agreement, key derivation and authenticated encryption.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    KEY AGREEMENT                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  DomainParameters                                              │   │
//! │  │        │                                                        │   │
//! │  │        ├──► FiniteField { p, g }  → FiniteFieldDh              │   │
//! │  │        │      p prime (trial division / Miller–Rabin)          │   │
//! │  │        │                                                        │   │
//! │  │        └──► EllipticCurve(name)   → EllipticCurveDh            │   │
//! │  │               secp256k1 | P-256 | X25519                        │   │
//! │  │                                                                 │   │
//! │  │  local private × peer public ──► SharedSecret                  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ENCRYPTION SCHEME                               │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  1. Key: SharedSecret → EncryptionKey (direct or HKDF-SHA256)  │   │
//! │  │                                                                 │   │
//! │  │  2. Encryption: AES-256-GCM                                    │   │
//! │  │     • 256-bit key                                              │   │
//! │  │     • 96 / 128 / 192-bit nonce (random per payload)            │   │
//! │  │     • 128-bit authentication tag                               │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose |
//! |-----------|---------|
//! | FFDH | Key agreement over a caller-chosen prime field |
//! | ECDH (secp256k1, P-256, X25519) | Key agreement with fixed 32-byte secrets |
//! | AES-256-GCM | Payload encryption (AEAD) |
//! | HKDF-SHA256 | Fixed-length key derivation |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: private scalars, shared secrets and keys are zeroized when dropped
//! 2. **Constant-Time Comparison**: secrets and keys compare with `subtle`
//! 3. **Secure Random**: `rand::rngs::OsRng` for every scalar and nonce
//! 4. **No Nonce Reuse**: a fresh random nonce for every payload

mod agreement;
mod elliptic;
mod encryption;
mod finite_field;
mod kdf;
mod keys;
mod params;
mod primes;

pub use agreement::{cross_check, KeyAgreement, KeyAgreementEngine};
pub use elliptic::EllipticCurveDh;
pub use encryption::{
    decrypt, encrypt, EncryptionKey, Nonce, NonceSize, Sealed, SharedSecret, KEY_SIZE,
    MAX_PLAINTEXT_SIZE, TAG_SIZE,
};
pub use finite_field::{FiniteFieldDh, SecretEncoding};
pub use kdf::{derive_encryption_key, domain, key_fingerprint};
pub use keys::{public_value_from_hex, KeyKind, KeyPair};
pub use params::{DomainParameters, NamedCurve, DEFAULT_GENERATOR};
pub use primes::{
    is_prime, is_probable_prime, is_safe_prime, random_prime, random_safe_prime, MILLER_RABIN_ROUNDS,
};
