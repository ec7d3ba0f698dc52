//! # Payload Codec
//!
//! Packs an AES-256-GCM encryption into one opaque buffer and back.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PAYLOAD LAYOUT                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────┬────────────────────────────┬──────────────┐          │
//! │  │    nonce     │        ciphertext          │     tag      │          │
//! │  │  enc(N)      │  enc(len(plaintext))       │   enc(16)    │          │
//! │  └──────────────┴────────────────────────────┴──────────────┘          │
//! │  0            enc(N)                     len − enc(16)       len       │
//! │                                                                         │
//! │  Each part is encoded on its own (raw, hex or base64) and the         │
//! │  three are concatenated. Lengths are not written: both ends must      │
//! │  agree on the nonce size and encoding out of band.                    │
//! │                                                                         │
//! │  Decoding is canonical: lowercase hex only, padded base64 with zero   │
//! │  trailing bits. Any change to the ciphertext or tag region, even one  │
//! │  that breaks the encoding, is reported as AuthenticationFailure.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```text
//! 24-byte nonce, hex, plaintext "Data to be encrypted." (21 bytes)
//!
//!   nonce       48 hex chars
//!   ciphertext  42 hex chars
//!   tag         32 hex chars
//!   ─────────────────────────
//!   payload    122 chars
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::crypto::{self, EncryptionKey, Nonce, NonceSize, TAG_SIZE};
use crate::error::{Error, Result};

/// Text or binary representation applied to every payload part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    /// Bytes as they are
    #[default]
    Raw,
    /// Lowercase hexadecimal, two characters per byte
    Hex,
    /// Standard base64 with padding
    Base64,
}

impl PayloadEncoding {
    /// Encoded length of `raw_len` bytes
    pub fn encoded_len(&self, raw_len: usize) -> usize {
        match self {
            PayloadEncoding::Raw => raw_len,
            PayloadEncoding::Hex => raw_len * 2,
            PayloadEncoding::Base64 => (raw_len + 2) / 3 * 4,
        }
    }

    fn encode_into(&self, bytes: &[u8], out: &mut Vec<u8>) {
        match self {
            PayloadEncoding::Raw => out.extend_from_slice(bytes),
            PayloadEncoding::Hex => out.extend_from_slice(hex::encode(bytes).as_bytes()),
            PayloadEncoding::Base64 => out.extend_from_slice(STANDARD.encode(bytes).as_bytes()),
        }
    }

    /// Decode one part; only the encoding's canonical form is accepted
    fn decode(&self, part: &[u8], what: &str) -> Result<Vec<u8>> {
        match self {
            PayloadEncoding::Raw => Ok(part.to_vec()),
            PayloadEncoding::Hex => {
                // `hex` also takes uppercase, which would give two spellings of one byte
                if let Some(pos) = part.iter().position(|&b| !matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
                    return Err(Error::MalformedPayload(format!(
                        "{} is not lowercase hex at offset {}",
                        what, pos
                    )));
                }
                hex::decode(part)
                    .map_err(|e| Error::MalformedPayload(format!("{} is not valid hex: {}", what, e)))
            }
            PayloadEncoding::Base64 => STANDARD
                .decode(part)
                .map_err(|e| Error::MalformedPayload(format!("{} is not valid base64: {}", what, e))),
        }
    }
}

/// An encoded `nonce ∥ ciphertext ∥ tag` buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap bytes received from a peer
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// View as text; `None` for raw payloads that are not UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Total encoded length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length buffer
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The three still-encoded regions of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadParts<'a> {
    /// `[0, nonce_len)`
    pub nonce: &'a [u8],
    /// `[nonce_len, len − tag_len)`
    pub ciphertext: &'a [u8],
    /// `[len − tag_len, len)`
    pub tag: &'a [u8],
}

/// Split a payload at fixed encoded lengths
///
/// The ciphertext region may be empty. A payload shorter than
/// `nonce_len + tag_len` is `MalformedPayload`.
pub fn split_payload(payload: &[u8], nonce_len: usize, tag_len: usize) -> Result<PayloadParts<'_>> {
    let framing = nonce_len
        .checked_add(tag_len)
        .ok_or_else(|| Error::UnsupportedConfiguration("framing lengths overflow".into()))?;

    if payload.len() < framing {
        return Err(Error::MalformedPayload(format!(
            "payload is {} bytes, framing alone needs {}",
            payload.len(),
            framing
        )));
    }

    let tag_start = payload.len() - tag_len;
    Ok(PayloadParts {
        nonce: &payload[..nonce_len],
        ciphertext: &payload[nonce_len..tag_start],
        tag: &payload[tag_start..],
    })
}

/// Split, decode and authenticate a payload with explicit framing
///
/// `nonce_len` and `tag_len` are lengths in the payload's encoding (for hex,
/// a 24-byte nonce is 48). They must be the encoded lengths of a 12, 16 or
/// 24-byte nonce and a 16-byte tag, otherwise `UnsupportedConfiguration`.
/// An undecodable nonce is `MalformedPayload`; an undecodable ciphertext or
/// tag is `AuthenticationFailure`, like any other change to those regions.
pub fn decrypt_payload(
    key: &EncryptionKey,
    payload: &[u8],
    nonce_len: usize,
    tag_len: usize,
    encoding: PayloadEncoding,
) -> Result<Vec<u8>> {
    open_parts(key, payload, nonce_len, tag_len, encoding, &[])
}

fn open_parts(
    key: &EncryptionKey,
    payload: &[u8],
    nonce_len: usize,
    tag_len: usize,
    encoding: PayloadEncoding,
    aad: &[u8],
) -> Result<Vec<u8>> {
    check_framing(nonce_len, tag_len, encoding)?;
    let parts = split_payload(payload, nonce_len, tag_len)?;

    let nonce_bytes = encoding.decode(parts.nonce, "nonce")?;
    let nonce = Nonce::from_bytes(&nonce_bytes)
        .map_err(|_| Error::MalformedPayload(format!("nonce decodes to {} bytes", nonce_bytes.len())))?;

    let tag = encoding.decode(parts.tag, "tag").map_err(altered_region)?;
    if tag.len() != TAG_SIZE {
        return Err(altered_region(Error::MalformedPayload(format!(
            "tag decodes to {} bytes",
            tag.len()
        ))));
    }
    let ciphertext = encoding.decode(parts.ciphertext, "ciphertext").map_err(altered_region)?;

    let plaintext = crypto::decrypt(key, &nonce, &ciphertext, &tag, aad)?;
    tracing::trace!(payload_len = payload.len(), plaintext_len = plaintext.len(), "payload opened");
    Ok(plaintext)
}

fn check_framing(nonce_len: usize, tag_len: usize, encoding: PayloadEncoding) -> Result<()> {
    let nonce_ok = [NonceSize::Standard, NonceSize::Extended, NonceSize::Wide]
        .iter()
        .any(|size| encoding.encoded_len(size.len()) == nonce_len);
    if !nonce_ok {
        return Err(Error::UnsupportedConfiguration(format!(
            "nonce region of {} is not a supported nonce size in {:?}",
            nonce_len, encoding
        )));
    }
    if encoding.encoded_len(TAG_SIZE) != tag_len {
        return Err(Error::UnsupportedConfiguration(format!(
            "tag region of {} is not a {}-byte tag in {:?}",
            tag_len, TAG_SIZE, encoding
        )));
    }
    Ok(())
}

/// The framing was agreed, so a region that no longer decodes was altered
fn altered_region(err: Error) -> Error {
    tracing::debug!(error = %err, "authenticated region does not decode");
    Error::AuthenticationFailure
}

/// Seals and opens payloads with one nonce size and encoding
///
/// ## Example
///
/// ```
/// use dhseal_core::crypto::{EncryptionKey, NonceSize};
/// use dhseal_core::payload::{PayloadCodec, PayloadEncoding};
///
/// let key = EncryptionKey::from_bytes([7u8; 32]);
/// let codec = PayloadCodec::new(NonceSize::Wide, PayloadEncoding::Hex);
///
/// let payload = codec.encrypt(&key, b"Data to be encrypted.").unwrap();
/// assert_eq!(payload.len(), 122);
/// assert_eq!(codec.decrypt(&key, &payload).unwrap(), b"Data to be encrypted.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PayloadCodec {
    nonce_size: NonceSize,
    encoding: PayloadEncoding,
}

impl PayloadCodec {
    /// Create a codec
    pub fn new(nonce_size: NonceSize, encoding: PayloadEncoding) -> Self {
        Self {
            nonce_size,
            encoding,
        }
    }

    /// Nonce size used for new payloads
    pub fn nonce_size(&self) -> NonceSize {
        self.nonce_size
    }

    /// Encoding applied to every part
    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    /// Encoded length of the nonce region
    pub fn nonce_len(&self) -> usize {
        self.encoding.encoded_len(self.nonce_size.len())
    }

    /// Encoded length of the tag region
    pub fn tag_len(&self) -> usize {
        self.encoding.encoded_len(TAG_SIZE)
    }

    /// Encoded payload length for a plaintext of `plaintext_len` bytes
    pub fn payload_len(&self, plaintext_len: usize) -> usize {
        self.nonce_len() + self.encoding.encoded_len(plaintext_len) + self.tag_len()
    }

    /// Encrypt under a fresh random nonce
    pub fn encrypt(&self, key: &EncryptionKey, plaintext: &[u8]) -> Result<Payload> {
        self.encrypt_with_aad(key, plaintext, &[])
    }

    /// Encrypt, binding `aad` into the tag without including it in the payload
    pub fn encrypt_with_aad(&self, key: &EncryptionKey, plaintext: &[u8], aad: &[u8]) -> Result<Payload> {
        let nonce = Nonce::random(self.nonce_size);
        let sealed = crypto::encrypt(key, &nonce, plaintext, aad)?;

        let mut out = Vec::with_capacity(self.payload_len(plaintext.len()));
        self.encoding.encode_into(nonce.as_bytes(), &mut out);
        self.encoding.encode_into(&sealed.ciphertext, &mut out);
        self.encoding.encode_into(&sealed.tag, &mut out);

        tracing::trace!(plaintext_len = plaintext.len(), payload_len = out.len(), "payload sealed");
        Ok(Payload(out))
    }

    /// Split, authenticate and decrypt
    pub fn decrypt(&self, key: &EncryptionKey, payload: &Payload) -> Result<Vec<u8>> {
        self.decrypt_with_aad(key, payload, &[])
    }

    /// Decrypt a payload sealed with [`encrypt_with_aad`](Self::encrypt_with_aad)
    pub fn decrypt_with_aad(&self, key: &EncryptionKey, payload: &Payload, aad: &[u8]) -> Result<Vec<u8>> {
        open_parts(
            key,
            payload.as_bytes(),
            self.nonce_len(),
            self.tag_len(),
            self.encoding,
            aad,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
