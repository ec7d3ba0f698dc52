//! # Finite-Field Diffie-Hellman
//!
//! Classic modular-exponentiation key agreement over a prime field.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     FINITE-FIELD EXCHANGE                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Alice                                   Bob                           │
//! │  ─────                                   ───                           │
//! │  a ← random [2, p − 2]                   b ← random [2, p − 2]         │
//! │  A = g^a mod p      ───── A ─────►                                     │
//! │                     ◄──── B ─────        B = g^b mod p                 │
//! │  z = B^a mod p                           z = A^b mod p                 │
//! │                                                                         │
//! │  Both sides hold g^(ab) mod p                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shared integer is smaller than the modulus but its magnitude varies,
//! so the byte form depends on [`SecretEncoding`].
//!
//! The modulus is a safe prime `p = 2q + 1`. Peer values outside `[2, p − 2]`
//! have order 1 or 2 and are refused. When `g` generates the order-`q`
//! subgroup, peer values must also satisfy `y^q ≡ 1 (mod p)`.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::agreement::KeyAgreement;
use super::encryption::SharedSecret;
use super::keys::{KeyKind, KeyPair};
use super::params::DomainParameters;
use crate::error::{Error, Result};

/// Attempts at drawing a private exponent whose public value is usable
const MAX_KEYGEN_ATTEMPTS: usize = 64;

/// How a finite-field shared integer is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretEncoding {
    /// Shortest big-endian form; length varies with the integer's magnitude
    Minimal,
    /// Big-endian, left-padded to `ceil(bits(p) / 8)` bytes
    #[default]
    ModulusWidth,
}

impl SecretEncoding {
    fn encode(&self, value: &BigUint, width: usize) -> Vec<u8> {
        let bytes = value.to_bytes_be();
        match self {
            SecretEncoding::Minimal => bytes,
            SecretEncoding::ModulusWidth => {
                let mut padded = vec![0u8; width.saturating_sub(bytes.len())];
                padded.extend_from_slice(&bytes);
                padded
            }
        }
    }
}

/// Finite-field Diffie-Hellman engine bound to one `(p, g)` pair
#[derive(Debug, Clone)]
pub struct FiniteFieldDh {
    params: DomainParameters,
    modulus: BigUint,
    generator: BigUint,
    /// `q = (p − 1) / 2` when `g` lies in the order-`q` subgroup
    subgroup_order: Option<BigUint>,
    secret_encoding: SecretEncoding,
}

impl FiniteFieldDh {
    /// Create an engine, validating the parameters
    pub fn new(params: DomainParameters, secret_encoding: SecretEncoding) -> Result<Self> {
        params.validate()?;
        let (modulus, generator) = match &params {
            DomainParameters::FiniteField { modulus, generator } => {
                (modulus.clone(), generator.clone())
            }
            DomainParameters::EllipticCurve(curve) => {
                return Err(Error::InvalidDomainParameters(format!(
                    "{} is not a finite-field group",
                    curve
                )))
            }
        };

        let q: BigUint = (&modulus - BigUint::one()) >> 1u32;
        let subgroup_order = if generator.modpow(&q, &modulus).is_one() {
            Some(q)
        } else {
            None
        };

        Ok(Self {
            params,
            modulus,
            generator,
            subgroup_order,
            secret_encoding,
        })
    }

    /// Encoding applied to computed secrets
    pub fn secret_encoding(&self) -> SecretEncoding {
        self.secret_encoding
    }

    /// Byte width of the modulus, the fixed secret length under `ModulusWidth`
    pub fn modulus_width(&self) -> usize {
        ((self.modulus.bits() + 7) / 8) as usize
    }

    /// Order of the subgroup generated by `g`, when it is the prime-order one
    pub fn subgroup_order(&self) -> Option<&BigUint> {
        self.subgroup_order.as_ref()
    }

    /// Values in `[2, p − 2]`; excludes 0, 1 and p − 1, which leak the secret
    fn in_safe_range(&self, value: &BigUint) -> bool {
        *value >= BigUint::from(2u32) && *value <= &self.modulus - BigUint::from(2u32)
    }

    /// Range check, then subgroup membership when `g` has order `q`
    fn check_peer(&self, peer: &BigUint) -> Result<()> {
        if !self.in_safe_range(peer) {
            return Err(Error::KeyAgreementFailure(
                "peer public value outside [2, p - 2]".into(),
            ));
        }
        if let Some(q) = &self.subgroup_order {
            if !peer.modpow(q, &self.modulus).is_one() {
                return Err(Error::KeyAgreementFailure(
                    "peer public value is not in the generator's subgroup".into(),
                ));
            }
        }
        Ok(())
    }
}

impl KeyAgreement for FiniteFieldDh {
    fn parameters(&self) -> &DomainParameters {
        &self.params
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let low = BigUint::from(2u32);
        let high = &self.modulus - BigUint::one();
        let mut rng = OsRng;

        // A generator of small order can map an exponent onto 1 or p − 1;
        // draw again rather than publish a value the peer must reject.
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            let private = rng.gen_biguint_range(&low, &high);
            let public = self.generator.modpow(&private, &self.modulus);
            if self.in_safe_range(&public) {
                return Ok(KeyPair::new(
                    KeyKind::FiniteField,
                    Zeroizing::new(private.to_bytes_be()),
                    public.to_bytes_be(),
                ));
            }
        }

        Err(Error::KeyGenerationFailed(format!(
            "no usable public value after {} attempts for {}",
            MAX_KEYGEN_ATTEMPTS,
            self.params.label()
        )))
    }

    fn compute_shared_secret(&self, local: &KeyPair, peer_public: &[u8]) -> Result<SharedSecret> {
        local.expect_kind(KeyKind::FiniteField)?;

        let peer = BigUint::from_bytes_be(peer_public);
        self.check_peer(&peer)?;

        let private = BigUint::from_bytes_be(local.private_bytes());
        let shared = peer.modpow(&private, &self.modulus);
        if !self.in_safe_range(&shared) {
            return Err(Error::KeyAgreementFailure(
                "shared value is degenerate".into(),
            ));
        }

        let bytes = self.secret_encoding.encode(&shared, self.modulus_width());
        Ok(SharedSecret::from_bytes(bytes))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn engine(bits: u64, encoding: SecretEncoding) -> FiniteFieldDh {
        FiniteFieldDh::new(DomainParameters::generate_finite_field(bits).unwrap(), encoding).unwrap()
    }

    #[test]
    fn test_shared_secret_symmetry() {
        let dh = engine(256, SecretEncoding::ModulusWidth);

        let alice = dh.generate_key_pair().unwrap();
        let bob = dh.generate_key_pair().unwrap();

        let alice_secret = dh.compute_shared_secret(&alice, bob.public_bytes()).unwrap();
        let bob_secret = dh.compute_shared_secret(&bob, alice.public_bytes()).unwrap();

        assert_eq!(alice_secret, bob_secret);
        assert_eq!(alice_secret.len(), 32);
    }

    #[test]
    fn test_modulus_width_is_fixed_across_trials() {
        let dh = engine(251, SecretEncoding::ModulusWidth);

        for _ in 0..20 {
            let a = dh.generate_key_pair().unwrap();
            let b = dh.generate_key_pair().unwrap();
            let secret = dh.compute_shared_secret(&a, b.public_bytes()).unwrap();
            assert_eq!(secret.len(), 32);
        }
    }

    #[test]
    fn test_minimal_encoding_never_exceeds_width() {
        let dh = engine(64, SecretEncoding::Minimal);

        for _ in 0..20 {
            let a = dh.generate_key_pair().unwrap();
            let b = dh.generate_key_pair().unwrap();
            let secret = dh.compute_shared_secret(&a, b.public_bytes()).unwrap();
            assert!(secret.len() <= 8);
            assert_ne!(secret.as_bytes()[0], 0);
        }
    }

    #[test]
    fn test_small_known_group() {
        // p = 23, g = 5: the textbook exchange
        let params = DomainParameters::finite_field(BigUint::from(23u32), BigUint::from(5u32)).unwrap();
        let dh = FiniteFieldDh::new(params, SecretEncoding::ModulusWidth).unwrap();

        let alice = KeyPair::new(KeyKind::FiniteField, Zeroizing::new(vec![6]), vec![8]);
        let bob = KeyPair::new(KeyKind::FiniteField, Zeroizing::new(vec![15]), vec![19]);

        let s1 = dh.compute_shared_secret(&alice, bob.public_bytes()).unwrap();
        let s2 = dh.compute_shared_secret(&bob, alice.public_bytes()).unwrap();

        assert_eq!(s1.as_bytes(), &[2]);
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_generated_values_in_range() {
        let params = DomainParameters::finite_field(BigUint::from(23u32), BigUint::from(5u32)).unwrap();
        let dh = FiniteFieldDh::new(params, SecretEncoding::ModulusWidth).unwrap();

        for _ in 0..50 {
            let kp = dh.generate_key_pair().unwrap();
            let public = BigUint::from_bytes_be(kp.public_bytes());
            assert!(public >= BigUint::from(2u32) && public <= BigUint::from(21u32));
        }
    }

    #[test]
    fn test_rejects_degenerate_peer_values() {
        let dh = engine(128, SecretEncoding::ModulusWidth);
        let local = dh.generate_key_pair().unwrap();

        let modulus = match dh.parameters() {
            DomainParameters::FiniteField { modulus, .. } => modulus.clone(),
            _ => unreachable!(),
        };

        let p_minus_one = (&modulus - BigUint::one()).to_bytes_be();
        for bad in [vec![], vec![0], vec![1], p_minus_one, modulus.to_bytes_be()] {
            let result = dh.compute_shared_secret(&local, &bad);
            assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));
        }
    }

    #[test]
    fn test_subgroup_membership_enforced() {
        // p = 23 = 2 * 11 + 1; 2^11 ≡ 1, so g = 2 generates the order-11 subgroup
        let params = DomainParameters::finite_field(BigUint::from(23u32), BigUint::from(2u32)).unwrap();
        let dh = FiniteFieldDh::new(params, SecretEncoding::ModulusWidth).unwrap();
        assert_eq!(dh.subgroup_order(), Some(&BigUint::from(11u32)));

        let local = KeyPair::new(KeyKind::FiniteField, Zeroizing::new(vec![3]), vec![8]);

        // 5 generates all of Z_23*, order 22
        let result = dh.compute_shared_secret(&local, &[5]);
        assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));

        // 4 = 2^2 lies in the subgroup
        let secret = dh.compute_shared_secret(&local, &[4]).unwrap();
        // 4^3 = 64 ≡ 18
        assert_eq!(secret.as_bytes(), &[18]);
    }

    #[test]
    fn test_generated_group_has_no_small_subgroups() {
        let dh = engine(128, SecretEncoding::ModulusWidth);
        let modulus = match dh.parameters() {
            DomainParameters::FiniteField { modulus, .. } => modulus.clone(),
            _ => unreachable!(),
        };
        let local = dh.generate_key_pair().unwrap();

        // An element of order r exists only for r dividing p − 1 = 2q
        let p_minus_one = &modulus - BigUint::one();
        for r in [3u32, 5, 7, 11, 13] {
            assert!(!(&p_minus_one % r).is_zero(), "{} divides p - 1", r);
        }

        // The order-2 element is the only small-order value left
        let result = dh.compute_shared_secret(&local, &p_minus_one.to_bytes_be());
        assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));

        // Every honest peer passes the membership check
        for _ in 0..10 {
            let peer = dh.generate_key_pair().unwrap();
            assert!(dh.compute_shared_secret(&local, peer.public_bytes()).is_ok());
        }
    }

    #[test]
    fn test_rejects_shared_value_p_minus_one() {
        // g = 5 generates Z_23*, so 5^11 ≡ 22 = p − 1
        let params = DomainParameters::finite_field(BigUint::from(23u32), BigUint::from(5u32)).unwrap();
        let dh = FiniteFieldDh::new(params, SecretEncoding::ModulusWidth).unwrap();
        assert_eq!(dh.subgroup_order(), None);

        let local = KeyPair::new(KeyKind::FiniteField, Zeroizing::new(vec![11]), vec![22]);
        let result = dh.compute_shared_secret(&local, &[5]);
        assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));
    }

    #[test]
    fn test_rejects_curve_parameters() {
        let params = DomainParameters::curve("x25519").unwrap();
        assert!(matches!(
            FiniteFieldDh::new(params, SecretEncoding::ModulusWidth),
            Err(Error::InvalidDomainParameters(_))
        ));
    }

    #[test]
    fn test_rejects_foreign_key_pair() {
        use crate::crypto::params::NamedCurve;

        let dh = engine(64, SecretEncoding::ModulusWidth);
        let peer = dh.generate_key_pair().unwrap();
        let foreign = KeyPair::new(
            KeyKind::Curve(NamedCurve::X25519),
            Zeroizing::new(vec![1; 32]),
            vec![9; 32],
        );

        let result = dh.compute_shared_secret(&foreign, peer.public_bytes());
        assert!(matches!(result, Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_secret_encoding_padding() {
        let value = BigUint::from(0x01_02u32);

        assert_eq!(SecretEncoding::Minimal.encode(&value, 4), vec![1, 2]);
        assert_eq!(SecretEncoding::ModulusWidth.encode(&value, 4), vec![0, 0, 1, 2]);
    }
}
