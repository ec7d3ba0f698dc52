//! # Key Agreement
//!
//! One capability, two implementations, chosen when the engine is built:
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │  KeyAgreement trait  │
//!                    └──────────┬───────────┘
//!                ┌──────────────┴──────────────┐
//!                ▼                             ▼
//!     ┌─────────────────────┐      ┌─────────────────────┐
//!     │   FiniteFieldDh     │      │  EllipticCurveDh    │
//!     │   g^x mod p         │      │  secp256k1 / P-256  │
//!     │                     │      │  / X25519           │
//!     └─────────────────────┘      └─────────────────────┘
//! ```
//!
//! For any two key pairs generated under the same parameters,
//! `compute(A.private, B.public) == compute(B.private, A.public)` byte for byte.

use super::elliptic::EllipticCurveDh;
use super::encryption::SharedSecret;
use super::finite_field::{FiniteFieldDh, SecretEncoding};
use super::keys::KeyPair;
use super::params::DomainParameters;
use crate::error::{Error, Result};

/// A Diffie-Hellman style key agreement over fixed domain parameters
pub trait KeyAgreement {
    /// Parameters this engine was built for
    fn parameters(&self) -> &DomainParameters;

    /// Generate a fresh key pair
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Combine our private scalar with the peer's public value
    ///
    /// ## Errors
    ///
    /// - `KeyAgreementFailure` if the peer value is outside the group
    /// - `InvalidKey` if `local` was generated by a different engine
    fn compute_shared_secret(&self, local: &KeyPair, peer_public: &[u8]) -> Result<SharedSecret>;
}

/// Key agreement engine selected from domain parameters
#[derive(Debug, Clone)]
pub enum KeyAgreementEngine {
    /// Modular exponentiation over a prime field
    FiniteField(FiniteFieldDh),
    /// Scalar multiplication on a named curve
    EllipticCurve(EllipticCurveDh),
}

impl KeyAgreementEngine {
    /// Build the engine matching `params`, with default secret encoding
    pub fn new(params: DomainParameters) -> Result<Self> {
        Self::with_secret_encoding(params, SecretEncoding::default())
    }

    /// Build the engine matching `params`
    ///
    /// `secret_encoding` only affects finite-field parameters; curve secrets
    /// are always 32 bytes.
    pub fn with_secret_encoding(params: DomainParameters, secret_encoding: SecretEncoding) -> Result<Self> {
        let engine = match params {
            DomainParameters::FiniteField { .. } => {
                KeyAgreementEngine::FiniteField(FiniteFieldDh::new(params, secret_encoding)?)
            }
            DomainParameters::EllipticCurve(_) => {
                KeyAgreementEngine::EllipticCurve(EllipticCurveDh::new(params)?)
            }
        };

        tracing::debug!(params = %engine.parameters().label(), "key agreement engine ready");
        Ok(engine)
    }

    fn inner(&self) -> &dyn KeyAgreement {
        match self {
            KeyAgreementEngine::FiniteField(dh) => dh,
            KeyAgreementEngine::EllipticCurve(dh) => dh,
        }
    }
}

impl KeyAgreement for KeyAgreementEngine {
    fn parameters(&self) -> &DomainParameters {
        self.inner().parameters()
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        self.inner().generate_key_pair()
    }

    fn compute_shared_secret(&self, local: &KeyPair, peer_public: &[u8]) -> Result<SharedSecret> {
        self.inner().compute_shared_secret(local, peer_public)
    }
}

/// Compute the secret from both sides and confirm they agree
///
/// Returns the agreed secret. A disagreement means the two key pairs were
/// not generated under the same parameters.
pub fn cross_check<A: KeyAgreement + ?Sized>(engine: &A, a: &KeyPair, b: &KeyPair) -> Result<SharedSecret> {
    let from_a = engine.compute_shared_secret(a, b.public_bytes())?;
    let from_b = engine.compute_shared_secret(b, a.public_bytes())?;

    if from_a != from_b {
        tracing::warn!(
            params = %engine.parameters().label(),
            "shared secrets differ between the two sides"
        );
        return Err(Error::SecretMismatch);
    }

    Ok(from_a)
}

// ============================================================================
// TESTS
// ============================================================================
