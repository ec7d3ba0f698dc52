//! # Channel Configuration
//!
//! Everything both parties must agree on besides the domain parameters.
//!
//! ```json
//! {
//!   "nonce_size": "wide",
//!   "encoding": "hex",
//!   "secret_encoding": "modulus_width",
//!   "key_derivation": { "mode": "hkdf", "info": "dhseal-payload-key-v1" }
//! }
//! ```
//!
//! Missing fields take their defaults, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::crypto::{domain, EncryptionKey, NonceSize, SecretEncoding, SharedSecret};
use crate::error::{Error, Result};
use crate::payload::{PayloadCodec, PayloadEncoding};

/// How the AES-256 key is obtained from the shared secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum KeyDerivation {
    /// Use the shared secret itself; it must be exactly 32 bytes
    Direct,
    /// HKDF-SHA256 with no salt and the given `info`
    Hkdf {
        /// Context string; both parties must use the same one
        info: String,
    },
}

impl Default for KeyDerivation {
    fn default() -> Self {
        KeyDerivation::Hkdf {
            info: domain::PAYLOAD_KEY.to_string(),
        }
    }
}

impl KeyDerivation {
    /// Turn a shared secret into the payload key
    pub fn derive(&self, secret: &SharedSecret) -> Result<EncryptionKey> {
        match self {
            KeyDerivation::Direct => secret.to_encryption_key(),
            KeyDerivation::Hkdf { info } => secret.derive_key(None, info.as_bytes()),
        }
    }
}

/// Configuration for a secure channel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Nonce length for new payloads
    pub nonce_size: NonceSize,
    /// Encoding applied to every payload part
    pub encoding: PayloadEncoding,
    /// Byte form of finite-field shared secrets
    pub secret_encoding: SecretEncoding,
    /// Key derivation from the shared secret
    pub key_derivation: KeyDerivation,
}

impl ChannelConfig {
    /// Layout interoperable with peers that send a 24-byte IV and hex parts
    /// and key AES directly with a 32-byte shared secret
    pub fn interop() -> Self {
        Self {
            nonce_size: NonceSize::Wide,
            encoding: PayloadEncoding::Hex,
            secret_encoding: SecretEncoding::ModulusWidth,
            key_derivation: KeyDerivation::Direct,
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations that cannot produce a working channel
    pub fn validate(&self) -> Result<()> {
        if let KeyDerivation::Hkdf { info } = &self.key_derivation {
            if info.is_empty() {
                return Err(Error::ConfigError(
                    "HKDF info must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Payload codec for this configuration
    pub fn codec(&self) -> PayloadCodec {
        PayloadCodec::new(self.nonce_size, self.encoding)
    }
}

// ============================================================================
// TESTS
// ============================================================================
