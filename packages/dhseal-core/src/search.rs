//! # Parameter Search
//!
//! Finds finite-field modulus sizes whose shared secret has an exact byte
//! length.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SEARCH PIPELINE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  start..range_end                                                      │
//! │      │ is_prime                                                        │
//! │      ▼                                                                  │
//! │  prime candidates ──► (rayon) one trial per candidate                  │
//! │                          │  modulus of `candidate` bits, g = 2          │
//! │                          │  two key pairs, secret from both sides       │
//! │                          ▼                                              │
//! │               len(secret) == target ? ──► BTreeMap { candidate: len }  │
//! │                                                                         │
//! │  Failed trials (modulus too small, degenerate values) are skipped.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A candidate is the bit length of a freshly generated prime modulus. Under
//! [`SecretEncoding::ModulusWidth`] the secret length is `ceil(bits / 8)`, so
//! the result is exact; under [`SecretEncoding::Minimal`] it reflects one
//! random trial and may differ between runs.
//!
//! This is a way to pick parameters for a direct-key channel. Deriving the key
//! with HKDF removes the need for it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::crypto::{
    cross_check, is_prime, DomainParameters, KeyAgreement, KeyAgreementEngine, SecretEncoding,
};
use crate::error::{Error, Result};

/// Default first candidate
pub const DEFAULT_START: u64 = 2;

/// Default exclusive end of the candidate range
pub const DEFAULT_RANGE_END: u64 = 300;

/// Knobs for a parameter search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// First candidate (inclusive)
    pub start: u64,
    /// End of the candidate range (exclusive)
    pub range_end: u64,
    /// Byte form of the computed secrets
    pub secret_encoding: SecretEncoding,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            range_end: DEFAULT_RANGE_END,
            secret_encoding: SecretEncoding::ModulusWidth,
        }
    }
}

/// Outcome of a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Matching candidates mapped to the observed secret length
    pub matches: BTreeMap<u64, usize>,
    /// Prime candidates that were tried
    pub candidates: usize,
    /// Trials that failed and were left out
    pub skipped: usize,
}

/// Every prime in `[start, range_end)` whose shared secret is `target_length` bytes
///
/// Uses the default [`SecretEncoding::ModulusWidth`]. An empty map means no
/// candidate matched; that is not an error.
pub fn find_prime_for_secret_length(
    target_length: usize,
    start: u64,
    range_end: u64,
) -> BTreeMap<u64, usize> {
    let options = SearchOptions {
        start,
        range_end,
        ..SearchOptions::default()
    };
    search_with(target_length, &options).matches
}

/// Run a search with explicit options
pub fn search_with(target_length: usize, options: &SearchOptions) -> SearchReport {
    let candidates: Vec<u64> = (options.start..options.range_end)
        .filter(|&n| is_prime(n))
        .collect();
    let skipped = AtomicUsize::new(0);

    let matches: BTreeMap<u64, usize> = candidates
        .par_iter()
        .filter_map(|&candidate| match trial(candidate, options.secret_encoding) {
            Ok(len) if len == target_length => Some((candidate, len)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(candidate, error = %e, "candidate skipped");
                skipped.fetch_add(1, Ordering::Relaxed);
                None
            }
        })
        .collect();

    let report = SearchReport {
        matches,
        candidates: candidates.len(),
        skipped: skipped.load(Ordering::Relaxed),
    };

    tracing::info!(
        target_length,
        candidates = report.candidates,
        skipped = report.skipped,
        found = report.matches.len(),
        "parameter search complete"
    );
    report
}

/// Generate parameters for the smallest matching candidate
///
/// ## Errors
///
/// `UnsupportedConfiguration` when no candidate in range matches.
pub fn select_modulus(target_length: usize, options: &SearchOptions) -> Result<DomainParameters> {
    let report = search_with(target_length, options);
    let (&bits, _) = report.matches.iter().next().ok_or_else(|| {
        Error::UnsupportedConfiguration(format!(
            "no modulus in [{}, {}) yields a {}-byte secret",
            options.start, options.range_end, target_length
        ))
    })?;

    DomainParameters::generate_finite_field(bits)
}

fn trial(candidate: u64, secret_encoding: SecretEncoding) -> Result<usize> {
    let params = DomainParameters::generate_finite_field(candidate)?;

    // Two independent engines over the same parameters, as two parties would
    let alice = KeyAgreementEngine::with_secret_encoding(params.clone(), secret_encoding)?;
    let bob = KeyAgreementEngine::with_secret_encoding(params, secret_encoding)?;

    let alice_pair = alice.generate_key_pair()?;
    let bob_pair = bob.generate_key_pair()?;

    let secret = cross_check(&alice, &alice_pair, &bob_pair)?;
    Ok(secret.len())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_32_finds_251() {
        let found = find_prime_for_secret_length(32, DEFAULT_START, DEFAULT_RANGE_END);

        let expected: BTreeMap<u64, usize> = [(251, 32)].into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_unreachable_target_is_empty() {
        assert!(find_prime_for_secret_length(100, DEFAULT_START, DEFAULT_RANGE_END).is_empty());
        assert!(find_prime_for_secret_length(0, DEFAULT_START, 50).is_empty());
    }

    #[test]
    fn test_empty_range() {
        assert!(find_prime_for_secret_length(32, 300, 300).is_empty());
        assert!(find_prime_for_secret_length(32, 252, 256).is_empty());
    }

    #[test]
    fn test_every_match_has_target_length() {
        let report = search_with(8, &SearchOptions::default());

        // Primes in (56, 64]: 59, 61
        let keys: Vec<u64> = report.matches.keys().copied().collect();
        assert_eq!(keys, vec![59, 61]);
        assert!(report.matches.values().all(|&len| len == 8));
        assert_eq!(report.candidates, 62);
    }

    #[test]
    fn test_tiny_candidates_are_skipped() {
        let report = search_with(1, &SearchOptions { start: 2, range_end: 3, ..Default::default() });

        // The only 2-bit prime is 3, and no 2-bit safe prime exists
        assert!(report.matches.is_empty());
        assert_eq!(report.candidates, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_minimal_encoding_never_overshoots() {
        let options = SearchOptions {
            start: 40,
            range_end: 100,
            secret_encoding: SecretEncoding::Minimal,
        };
        let report = search_with(8, &options);

        for &bits in report.matches.keys() {
            assert!((bits + 7) / 8 >= 8, "{} bits cannot give 8 bytes", bits);
        }
    }

    #[test]
    fn test_select_modulus() {
        let params = select_modulus(16, &SearchOptions::default()).unwrap();
        // Smallest prime in (120, 128] is 127
        assert_eq!(params.modulus_bits(), Some(127));

        let result = select_modulus(100, &SearchOptions::default());
        assert!(matches!(result, Err(Error::UnsupportedConfiguration(_))));
    }

    #[test]
    fn test_options_from_json() {
        let options: SearchOptions = serde_json::from_str(r#"{ "range_end": 64 }"#).unwrap();

        assert_eq!(options.start, DEFAULT_START);
        assert_eq!(options.range_end, 64);
        assert_eq!(options.secret_encoding, SecretEncoding::ModulusWidth);
    }
}
