//! # Encryption Module
//!
//! Provides AES-256-GCM encryption for payload confidentiality and integrity.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PAYLOAD ENCRYPTION FLOW                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Shared Secret (from key agreement)                            │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  FFDH: peer_public^x mod p   |   ECDH: x-coordinate of x·Q   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 2: Encryption Key (32 bytes)                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Direct: secret must already be 32 bytes                     │       │
//! │  │  HKDF-SHA256(ikm = secret, info = "dhseal-payload-key-v1")   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Nonce (fresh per payload, 12 / 16 / 24 bytes from OsRng)      │
//! │                                                                         │
//! │  Step 4: AES-256-GCM → ciphertext (same length) + 16-byte tag          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nonces other than 96 bits are run through GHASH to form the initial
//! counter block, exactly as GCM specifies; the 24-byte size exists for
//! interoperability with peers that use long IVs.

use aes_gcm::{
    aead::{
        self,
        consts::{U12, U16, U24},
        AeadCore, AeadInPlace, KeyInit,
    },
    aes::Aes256,
    AesGcm,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::kdf;
use crate::error::{Error, Result};

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Largest plaintext accepted by [`encrypt`]
pub const MAX_PLAINTEXT_SIZE: usize = 64 * 1024 * 1024;

type Aes256Gcm12 = AesGcm<Aes256, U12>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;
type Aes256Gcm24 = AesGcm<Aes256, U24>;

/// Nonce lengths supported by the payload codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceSize {
    /// 96-bit nonce, the GCM fast path
    #[default]
    Standard,
    /// 128-bit nonce
    Extended,
    /// 192-bit nonce
    Wide,
}

impl NonceSize {
    /// Length in bytes
    pub fn len(&self) -> usize {
        match self {
            NonceSize::Standard => 12,
            NonceSize::Extended => 16,
            NonceSize::Wide => 24,
        }
    }

    /// Map a byte length back to a supported size
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            12 => Ok(NonceSize::Standard),
            16 => Ok(NonceSize::Extended),
            24 => Ok(NonceSize::Wide),
            other => Err(Error::UnsupportedConfiguration(format!(
                "nonce length {} is not one of 12, 16, 24",
                other
            ))),
        }
    }
}

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Nonce reuse completely breaks AES-GCM security:
/// - Allows recovering the authentication key
/// - Allows forging messages
/// - May allow recovering plaintext
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce {
    size: NonceSize,
    bytes: Vec<u8>,
}

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random(size: NonceSize) -> Self {
        let mut bytes = vec![0u8; size.len()];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { size, bytes }
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let size = NonceSize::from_len(bytes.len())?;
        Ok(Self {
            size,
            bytes: bytes.to_vec(),
        })
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size class of this nonce
    pub fn size(&self) -> NonceSize {
        self.size
    }
}

/// A shared secret derived from key agreement
///
/// Length depends on the variant: fixed 32 bytes for the supported curves,
/// modulus-dependent for finite-field Diffie-Hellman. Zeroized on drop and
/// compared in constant time.
pub struct SharedSecret {
    bytes: Zeroizing<Vec<u8>>,
}

impl SharedSecret {
    /// Create from raw agreement output
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the secret holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Use the secret itself as the AES-256 key
    ///
    /// Only valid when the agreement already produced exactly 32 bytes.
    pub fn to_encryption_key(&self) -> Result<EncryptionKey> {
        EncryptionKey::from_slice(&self.bytes)
    }

    /// Derive a fixed-length encryption key with HKDF-SHA256
    pub fn derive_key(&self, salt: Option<&[u8]>, info: &[u8]) -> Result<EncryptionKey> {
        kdf::derive_encryption_key(&self.bytes, salt, info)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.as_slice().ct_eq(other.bytes.as_slice()).into()
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// An AES-256-GCM encryption key
///
/// Zeroized when dropped for security.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice that must be exactly [`KEY_SIZE`] bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            Error::UnsupportedConfiguration(format!(
                "AES-256 needs a {}-byte key, got {} bytes; derive one with HKDF",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Short fingerprint safe to log or compare out of band
    pub fn fingerprint(&self) -> String {
        kdf::key_fingerprint(&self.0)
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for EncryptionKey {}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EncryptionKey").field(&self.fingerprint()).finish()
    }
}

/// Ciphertext and detached authentication tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sealed {
    /// Encrypted bytes, same length as the plaintext
    pub ciphertext: Vec<u8>,
    /// GCM authentication tag
    pub tag: [u8; TAG_SIZE],
}

/// Encrypt with AES-256-GCM under a caller-supplied nonce
///
/// ## Parameters
///
/// - `key`: 256-bit encryption key
/// - `nonce`: fresh nonce, never reused under `key`
/// - `plaintext`: data to encrypt
/// - `aad`: additional authenticated data (not encrypted, but authenticated)
pub fn encrypt(key: &EncryptionKey, nonce: &Nonce, plaintext: &[u8], aad: &[u8]) -> Result<Sealed> {
    if plaintext.len() > MAX_PLAINTEXT_SIZE {
        return Err(Error::EncryptionFailed(format!(
            "plaintext of {} bytes exceeds the {} byte limit",
            plaintext.len(),
            MAX_PLAINTEXT_SIZE
        )));
    }

    match nonce.size() {
        NonceSize::Standard => seal_detached::<Aes256Gcm12>(key, nonce.as_bytes(), plaintext, aad),
        NonceSize::Extended => seal_detached::<Aes256Gcm16>(key, nonce.as_bytes(), plaintext, aad),
        NonceSize::Wide => seal_detached::<Aes256Gcm24>(key, nonce.as_bytes(), plaintext, aad),
    }
}

/// Decrypt with AES-256-GCM, verifying the detached tag first
///
/// ## Errors
///
/// Returns `AuthenticationFailure` if:
/// - The ciphertext or tag was tampered with
/// - The AAD doesn't match
/// - The key or nonce is wrong
///
/// No plaintext is ever returned on failure.
pub fn decrypt(
    key: &EncryptionKey,
    nonce: &Nonce,
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    if tag.len() != TAG_SIZE {
        return Err(Error::UnsupportedConfiguration(format!(
            "tag length {} is not {}",
            tag.len(),
            TAG_SIZE
        )));
    }

    match nonce.size() {
        NonceSize::Standard => open_detached::<Aes256Gcm12>(key, nonce.as_bytes(), ciphertext, tag, aad),
        NonceSize::Extended => open_detached::<Aes256Gcm16>(key, nonce.as_bytes(), ciphertext, tag, aad),
        NonceSize::Wide => open_detached::<Aes256Gcm24>(key, nonce.as_bytes(), ciphertext, tag, aad),
    }
}

fn seal_detached<C>(key: &EncryptionKey, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Sealed>
where
    C: KeyInit + AeadInPlace + AeadCore<TagSize = U16>,
{
    let cipher = C::new_from_slice(&key.0)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(aead::Nonce::<C>::from_slice(nonce), aad, &mut buffer)
        .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(Sealed {
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

fn open_detached<C>(
    key: &EncryptionKey,
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace + AeadCore<TagSize = U16>,
{
    let cipher = C::new_from_slice(&key.0)
        .map_err(|e| Error::InvalidKey(format!("Invalid key: {}", e)))?;

    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        aead::Nonce::<C>::from_slice(nonce),
        aad,
        &mut buffer,
        aead::Tag::<C>::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            tracing::debug!(ciphertext_len = ciphertext.len(), "authentication tag mismatch");
            Err(Error::AuthenticationFailure)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
