//! # Domain Parameters
//!
//! The public setup both parties must agree on before key agreement.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       DOMAIN PARAMETERS                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  FiniteField { modulus p, generator g }                                 │
//! │  • p: safe prime 2q + 1 ≥ 5 (p and q checked with Miller–Rabin)         │
//! │  • g: in [2, p − 2]                                                     │
//! │  • One party generates, sends (p, g) to the other                       │
//! │                                                                         │
//! │  EllipticCurve(NamedCurve)                                              │
//! │  • secp256k1 | P-256 | X25519                                           │
//! │  • Agreed by name; field, equation and base point are standard         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::primes::{is_probable_prime, is_safe_prime, random_safe_prime};
use crate::error::{Error, Result};

/// Generator used when a modulus is generated rather than supplied
pub const DEFAULT_GENERATOR: u32 = 2;

/// Smallest modulus that leaves room for a non-degenerate exchange
const MIN_MODULUS: u32 = 5;

/// Standard curves supported for elliptic-curve Diffie-Hellman
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedCurve {
    /// secp256k1 (Koblitz curve)
    Secp256k1,
    /// NIST P-256, also known as prime256v1 / secp256r1
    P256,
    /// Curve25519 in Montgomery form
    X25519,
}

impl NamedCurve {
    /// Every supported curve
    pub const ALL: [NamedCurve; 3] = [NamedCurve::Secp256k1, NamedCurve::P256, NamedCurve::X25519];

    /// Canonical name of the curve
    pub fn name(&self) -> &'static str {
        match self {
            NamedCurve::Secp256k1 => "secp256k1",
            NamedCurve::P256 => "prime256v1",
            NamedCurve::X25519 => "x25519",
        }
    }

    /// Length of an encoded public value
    ///
    /// Weierstrass curves use uncompressed SEC1 points (`0x04 ∥ x ∥ y`).
    pub fn public_value_len(&self) -> usize {
        match self {
            NamedCurve::Secp256k1 | NamedCurve::P256 => 65,
            NamedCurve::X25519 => 32,
        }
    }

    /// Length of the shared secret, fixed by the field size
    pub fn shared_secret_len(&self) -> usize {
        32
    }
}

impl fmt::Display for NamedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "secp256k1" => Ok(NamedCurve::Secp256k1),
            "prime256v1" | "secp256r1" | "p-256" | "p256" => Ok(NamedCurve::P256),
            "x25519" | "curve25519" => Ok(NamedCurve::X25519),
            other => Err(Error::InvalidDomainParameters(format!(
                "unsupported curve '{}'",
                other
            ))),
        }
    }
}

/// Public parameters of a key agreement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainParameters {
    /// Finite-field (modular exponentiation) Diffie-Hellman
    FiniteField {
        /// Prime modulus p
        modulus: BigUint,
        /// Generator g
        generator: BigUint,
    },
    /// Elliptic-curve Diffie-Hellman over a standard curve
    EllipticCurve(NamedCurve),
}

impl DomainParameters {
    /// Build and validate finite-field parameters
    pub fn finite_field(modulus: BigUint, generator: BigUint) -> Result<Self> {
        let params = DomainParameters::FiniteField { modulus, generator };
        params.validate()?;
        Ok(params)
    }

    /// Build finite-field parameters from big-endian byte buffers
    pub fn finite_field_from_bytes(modulus: &[u8], generator: &[u8]) -> Result<Self> {
        Self::finite_field(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(generator),
        )
    }

    /// Generate a fresh safe-prime modulus of exactly `prime_bits` bits
    ///
    /// The generator is [`DEFAULT_GENERATOR`]. The other party must receive
    /// the resulting modulus and generator before generating its key pair.
    /// Widths below 3 bits have no safe prime and fail.
    pub fn generate_finite_field(prime_bits: u64) -> Result<Self> {
        let modulus = random_safe_prime(prime_bits)?;
        Self::finite_field(modulus, BigUint::from(DEFAULT_GENERATOR))
    }

    /// Parameters for a named curve
    pub fn curve(name: &str) -> Result<Self> {
        Ok(DomainParameters::EllipticCurve(name.parse()?))
    }

    /// Check the parameters are usable for key agreement
    pub fn validate(&self) -> Result<()> {
        match self {
            DomainParameters::FiniteField { modulus, generator } => {
                if *modulus < BigUint::from(MIN_MODULUS) {
                    return Err(Error::InvalidDomainParameters(format!(
                        "modulus {} is too small",
                        modulus
                    )));
                }
                if !is_probable_prime(modulus) {
                    return Err(Error::InvalidDomainParameters(
                        "modulus is not prime".into(),
                    ));
                }
                // p − 1 with small odd factors admits small subgroups that a
                // range check cannot see
                if !is_safe_prime(modulus) {
                    return Err(Error::InvalidDomainParameters(
                        "modulus is not a safe prime".into(),
                    ));
                }
                let upper = modulus - BigUint::from(2u32);
                if *generator < BigUint::from(2u32) || *generator > upper {
                    return Err(Error::InvalidDomainParameters(format!(
                        "generator must lie in [2, p - 2], got {}",
                        generator
                    )));
                }
                Ok(())
            }
            DomainParameters::EllipticCurve(_) => Ok(()),
        }
    }

    /// Bit length of the finite-field modulus, `None` for curves
    pub fn modulus_bits(&self) -> Option<u64> {
        match self {
            DomainParameters::FiniteField { modulus, .. } => Some(modulus.bits()),
            DomainParameters::EllipticCurve(_) => None,
        }
    }

    /// Short human-readable label for logs
    pub fn label(&self) -> String {
        match self {
            DomainParameters::FiniteField { modulus, .. } => {
                format!("ffdh-{}", modulus.bits())
            }
            DomainParameters::EllipticCurve(curve) => format!("ecdh-{}", curve),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
