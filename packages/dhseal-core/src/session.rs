//! # Sessions and Channels
//!
//! A [`Session`] owns one side's key pair until the peer's public value
//! arrives; [`Session::establish`] consumes it and yields a keyed
//! [`Channel`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SESSION LIFECYCLE                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Session::new(params, config)                                          │
//! │      │  engine + fresh key pair                                        │
//! │      ▼                                                                  │
//! │  public_value() ──────────────► peer                                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  establish(peer_public)                                                │
//! │      │  shared secret → encryption key; secret and private scalar     │
//! │      │  are dropped (and zeroized) here                               │
//! │      ▼                                                                  │
//! │  Channel::seal / Channel::open                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no shared key ring: every value lives in the session that
//! created it.

use crate::config::ChannelConfig;
use crate::crypto::{DomainParameters, EncryptionKey, KeyAgreement, KeyAgreementEngine, KeyPair};
use crate::error::Result;
use crate::payload::{Payload, PayloadCodec};

/// One party's side of a key agreement
pub struct Session {
    engine: KeyAgreementEngine,
    key_pair: KeyPair,
    config: ChannelConfig,
}

impl Session {
    /// Build the engine for `params` and generate this party's key pair
    pub fn new(params: DomainParameters, config: &ChannelConfig) -> Result<Self> {
        config.validate()?;

        let engine = KeyAgreementEngine::with_secret_encoding(params, config.secret_encoding)?;
        let key_pair = engine.generate_key_pair()?;

        tracing::debug!(
            params = %engine.parameters().label(),
            public_len = key_pair.public_bytes().len(),
            "session key pair generated"
        );

        Ok(Self {
            engine,
            key_pair,
            config: config.clone(),
        })
    }

    /// Domain parameters of this session
    pub fn parameters(&self) -> &DomainParameters {
        self.engine.parameters()
    }

    /// Public value to send to the peer
    pub fn public_value(&self) -> &[u8] {
        self.key_pair.public_bytes()
    }

    /// Complete the agreement and derive the channel key
    pub fn establish(self, peer_public: &[u8]) -> Result<Channel> {
        let secret = self.engine.compute_shared_secret(&self.key_pair, peer_public)?;
        let key = self.config.key_derivation.derive(&secret)?;
        let channel = Channel::new(key, self.config.codec());

        tracing::info!(
            params = %self.engine.parameters().label(),
            secret_len = secret.len(),
            fingerprint = %channel.fingerprint(),
            "channel established"
        );
        Ok(channel)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("params", &self.engine.parameters().label())
            .field("key_pair", &self.key_pair)
            .finish()
    }
}

/// A keyed payload codec shared by both parties after agreement
#[derive(Debug)]
pub struct Channel {
    key: EncryptionKey,
    codec: PayloadCodec,
}

impl Channel {
    /// Build a channel from an already agreed key
    pub fn new(key: EncryptionKey, codec: PayloadCodec) -> Self {
        Self { key, codec }
    }

    /// Codec (nonce size and encoding) this channel uses
    pub fn codec(&self) -> PayloadCodec {
        self.codec
    }

    /// Key fingerprint; equal on both ends of a working channel
    pub fn fingerprint(&self) -> String {
        self.key.fingerprint()
    }

    /// Encrypt a message under a fresh nonce
    pub fn seal(&self, plaintext: &[u8]) -> Result<Payload> {
        self.codec.encrypt(&self.key, plaintext)
    }

    /// Authenticate and decrypt a payload from the peer
    pub fn open(&self, payload: &Payload) -> Result<Vec<u8>> {
        self.codec.decrypt(&self.key, payload)
    }

    /// Encrypt with associated data bound into the tag
    pub fn seal_with_aad(&self, plaintext: &[u8], aad: &[u8]) -> Result<Payload> {
        self.codec.encrypt_with_aad(&self.key, plaintext, aad)
    }

    /// Decrypt a payload sealed with [`seal_with_aad`](Self::seal_with_aad)
    pub fn open_with_aad(&self, payload: &Payload, aad: &[u8]) -> Result<Vec<u8>> {
        self.codec.decrypt_with_aad(&self.key, payload, aad)
    }
}

// ============================================================================
// TESTS
// ============================================================================
