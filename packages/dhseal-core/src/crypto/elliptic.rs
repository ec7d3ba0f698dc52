//! # Elliptic-Curve Diffie-Hellman
//!
//! ECDH over the supported named curves.
//!
//! | Curve | Crate | Public value | Secret |
//! |-------|-------|--------------|--------|
//! | secp256k1 | `k256` | SEC1 uncompressed, 65 bytes | x-coordinate, 32 bytes |
//! | P-256 | `p256` | SEC1 uncompressed, 65 bytes | x-coordinate, 32 bytes |
//! | X25519 | `x25519-dalek` | u-coordinate, 32 bytes | 32 bytes |
//!
//! Peer points are decoded with full validation: the identity, points off the
//! curve and malformed encodings are refused. For X25519, where every 32-byte
//! string decodes, a low-order peer is caught by the non-contributory check.

use super::agreement::KeyAgreement;
use super::encryption::SharedSecret;
use super::keys::{KeyKind, KeyPair};
use super::params::{DomainParameters, NamedCurve};
use crate::error::{Error, Result};

/// Weierstrass-curve helpers; both RustCrypto crates share one API shape.
macro_rules! weierstrass_curve {
    ($module:ident, $krate:ident) => {
        mod $module {
            use $krate::ecdh::diffie_hellman;
            use $krate::elliptic_curve::sec1::ToEncodedPoint;
            use $krate::{PublicKey, SecretKey};
            use rand::rngs::OsRng;
            use zeroize::Zeroizing;

            use crate::error::{Error, Result};

            pub(super) fn generate() -> (Zeroizing<Vec<u8>>, Vec<u8>) {
                let secret = SecretKey::random(&mut OsRng);
                let public = secret.public_key().to_encoded_point(false);
                (
                    Zeroizing::new(secret.to_bytes().to_vec()),
                    public.as_bytes().to_vec(),
                )
            }

            pub(super) fn agree(private: &[u8], peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
                let secret = SecretKey::from_slice(private)
                    .map_err(|_| Error::InvalidKey("malformed private scalar".into()))?;
                let peer = PublicKey::from_sec1_bytes(peer_public).map_err(|_| {
                    Error::KeyAgreementFailure(format!(
                        "peer value is not a valid {} point",
                        stringify!($module)
                    ))
                })?;

                let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
        }
    };
}

weierstrass_curve!(secp256k1, k256);
weierstrass_curve!(prime256v1, p256);

mod x25519 {
    use rand::rngs::OsRng;
    use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
    use zeroize::Zeroizing;

    use crate::error::{Error, Result};

    pub(super) fn generate() -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        (Zeroizing::new(secret.to_bytes().to_vec()), public.as_bytes().to_vec())
    }

    pub(super) fn agree(private: &[u8], peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let private: [u8; 32] = private
            .try_into()
            .map_err(|_| Error::InvalidKey("X25519 private key must be 32 bytes".into()))?;
        let peer: [u8; 32] = peer_public.try_into().map_err(|_| {
            Error::KeyAgreementFailure(format!(
                "X25519 public value must be 32 bytes, got {}",
                peer_public.len()
            ))
        })?;

        let secret = StaticSecret::from(private);
        let shared = secret.diffie_hellman(&X25519PublicKey::from(peer));
        if !shared.was_contributory() {
            return Err(Error::KeyAgreementFailure(
                "X25519 peer value has low order".into(),
            ));
        }

        Ok(Zeroizing::new(shared.as_bytes().to_vec()))
    }
}

/// ECDH engine for one named curve
#[derive(Debug, Clone)]
pub struct EllipticCurveDh {
    params: DomainParameters,
    curve: NamedCurve,
}

impl EllipticCurveDh {
    /// Create an engine for curve parameters
    pub fn new(params: DomainParameters) -> Result<Self> {
        let curve = match &params {
            DomainParameters::EllipticCurve(curve) => *curve,
            DomainParameters::FiniteField { .. } => {
                return Err(Error::InvalidDomainParameters(
                    "finite-field parameters given to the elliptic-curve engine".into(),
                ))
            }
        };
        Ok(Self { params, curve })
    }

    /// Curve this engine operates on
    pub fn curve(&self) -> NamedCurve {
        self.curve
    }
}

impl KeyAgreement for EllipticCurveDh {
    fn parameters(&self) -> &DomainParameters {
        &self.params
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let (private, public) = match self.curve {
            NamedCurve::Secp256k1 => secp256k1::generate(),
            NamedCurve::P256 => prime256v1::generate(),
            NamedCurve::X25519 => x25519::generate(),
        };
        Ok(KeyPair::new(KeyKind::Curve(self.curve), private, public))
    }

    fn compute_shared_secret(&self, local: &KeyPair, peer_public: &[u8]) -> Result<SharedSecret> {
        local.expect_kind(KeyKind::Curve(self.curve))?;

        let private = local.private_bytes();
        let shared = match self.curve {
            NamedCurve::Secp256k1 => secp256k1::agree(private, peer_public)?,
            NamedCurve::P256 => prime256v1::agree(private, peer_public)?,
            NamedCurve::X25519 => x25519::agree(private, peer_public)?,
        };

        Ok(SharedSecret::from_bytes(shared.to_vec()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn engine(curve: NamedCurve) -> EllipticCurveDh {
        EllipticCurveDh::new(DomainParameters::EllipticCurve(curve)).unwrap()
    }

    #[test]
    fn test_symmetry_on_every_curve() {
        for curve in NamedCurve::ALL {
            let dh = engine(curve);

            for _ in 0..5 {
                let alice = dh.generate_key_pair().unwrap();
                let bob = dh.generate_key_pair().unwrap();

                let s1 = dh.compute_shared_secret(&alice, bob.public_bytes()).unwrap();
                let s2 = dh.compute_shared_secret(&bob, alice.public_bytes()).unwrap();

                assert_eq!(s1, s2, "asymmetric secret on {}", curve);
                assert_eq!(s1.len(), curve.shared_secret_len());
            }
        }
    }

    #[test]
    fn test_public_value_lengths() {
        for curve in NamedCurve::ALL {
            let kp = engine(curve).generate_key_pair().unwrap();
            assert_eq!(kp.public_bytes().len(), curve.public_value_len());
            assert_eq!(kp.kind(), KeyKind::Curve(curve));
        }

        let kp = engine(NamedCurve::P256).generate_key_pair().unwrap();
        assert_eq!(kp.public_bytes()[0], 0x04);
    }

    #[test]
    fn test_x25519_rfc7748_vector() {
        // RFC 7748 section 6.1
        let alice_private =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a").unwrap();
        let bob_public =
            hex::decode("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f").unwrap();

        let dh = engine(NamedCurve::X25519);
        let alice = KeyPair::new(
            KeyKind::Curve(NamedCurve::X25519),
            Zeroizing::new(alice_private),
            Vec::new(),
        );

        let shared = dh.compute_shared_secret(&alice, &bob_public).unwrap();
        assert_eq!(
            hex::encode(shared.as_bytes()),
            "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742"
        );
    }

    #[test]
    fn test_rejects_invalid_points() {
        for curve in [NamedCurve::Secp256k1, NamedCurve::P256] {
            let dh = engine(curve);
            let local = dh.generate_key_pair().unwrap();

            // Identity encoding, truncated point, point off the curve
            let mut off_curve = local.public_bytes().to_vec();
            off_curve[64] ^= 0x01;

            for bad in [vec![0x00], local.public_bytes()[..33].to_vec(), off_curve] {
                let result = dh.compute_shared_secret(&local, &bad);
                assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));
            }
        }
    }

    #[test]
    fn test_x25519_rejects_low_order_and_bad_length() {
        let dh = engine(NamedCurve::X25519);
        let local = dh.generate_key_pair().unwrap();

        let result = dh.compute_shared_secret(&local, &[0u8; 32]);
        assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));

        let result = dh.compute_shared_secret(&local, &[9u8; 31]);
        assert!(matches!(result, Err(Error::KeyAgreementFailure(_))));
    }

    #[test]
    fn test_cross_curve_key_pair_rejected() {
        let k1 = engine(NamedCurve::Secp256k1);
        let p1 = engine(NamedCurve::P256);

        let k1_pair = k1.generate_key_pair().unwrap();
        let p1_pair = p1.generate_key_pair().unwrap();

        let result = p1.compute_shared_secret(&k1_pair, p1_pair.public_bytes());
        assert!(matches!(result, Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_rejects_finite_field_parameters() {
        let params = DomainParameters::generate_finite_field(64).unwrap();
        assert!(matches!(
            EllipticCurveDh::new(params),
            Err(Error::InvalidDomainParameters(_))
        ));
    }
}
