//! # Error Handling
//!
//! This module provides the error type shared by every dhseal component.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Domain Errors (construction time)                                 │
//! │  │   ├── InvalidDomainParameters - Bad modulus, generator or curve     │
//! │  │   └── KeyGenerationFailed     - No usable key pair                  │
//! │  │                                                                      │
//! │  ├── Agreement Errors (compute time)                                   │
//! │  │   ├── KeyAgreementFailure     - Peer value outside the group        │
//! │  │   ├── InvalidKey              - Key material of the wrong kind      │
//! │  │   ├── SecretMismatch          - Both sides disagree (logic bug)     │
//! │  │   └── KeyDerivationFailed     - HKDF expansion failed               │
//! │  │                                                                      │
//! │  ├── Payload Errors                                                    │
//! │  │   ├── AuthenticationFailure   - Tag did not verify                  │
//! │  │   ├── EncryptionFailed        - AEAD seal failed                    │
//! │  │   └── MalformedPayload        - Payload cannot be split/decoded     │
//! │  │                                                                      │
//! │  └── Configuration Errors                                              │
//! │      ├── UnsupportedConfiguration - Lengths the primitives can't meet  │
//! │      └── ConfigError              - Configuration could not be parsed  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure reaches the immediate caller as an `Err`. The parameter
//! search is the single place where errors are absorbed: a candidate that
//! fails to build or agree is simply left out of the results.

use thiserror::Error;

/// Result type alias for dhseal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dhseal
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Domain Errors (100-199)
    // ========================================================================

    /// Modulus, generator or curve name is unusable
    #[error("Invalid domain parameters: {0}")]
    InvalidDomainParameters(String),

    /// Key pair generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    // ========================================================================
    // Agreement Errors (200-299)
    // ========================================================================

    /// Peer public value is outside the valid range or group
    #[error("Key agreement failed: {0}")]
    KeyAgreementFailure(String),

    /// Key material has the wrong length or belongs to another variant
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The two sides of an exchange derived different secrets.
    ///
    /// Never a runtime condition under correct usage; it means the
    /// parameters or public values were mixed up by the caller.
    #[error("Shared secrets do not match")]
    SecretMismatch,

    /// Key derivation failed
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    // ========================================================================
    // Payload Errors (300-399)
    // ========================================================================

    /// Authentication tag verification failed; no plaintext is released
    #[error("Authentication failed: payload was tampered with or keyed differently")]
    AuthenticationFailure,

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Payload is too short or one of its parts could not be decoded
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // ========================================================================
    // Configuration Errors (400-499)
    // ========================================================================

    /// Requested key/nonce/tag lengths cannot be satisfied
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Domain parameters and key generation
    /// - 200-299: Key agreement
    /// - 300-399: Payload sealing and opening
    /// - 400-499: Configuration
    pub fn code(&self) -> i32 {
        match self {
            // Domain (100-199)
            Error::InvalidDomainParameters(_) => 100,
            Error::KeyGenerationFailed(_) => 101,

            // Agreement (200-299)
            Error::KeyAgreementFailure(_) => 200,
            Error::InvalidKey(_) => 201,
            Error::SecretMismatch => 202,
            Error::KeyDerivationFailed(_) => 203,

            // Payload (300-399)
            Error::AuthenticationFailure => 300,
            Error::EncryptionFailed(_) => 301,
            Error::MalformedPayload(_) => 302,

            // Configuration (400-499)
            Error::UnsupportedConfiguration(_) => 400,
            Error::ConfigError(_) => 401,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Payload errors can be retried with a corrected payload. Everything
    /// else is fatal to the session that produced it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailure | Error::MalformedPayload(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
