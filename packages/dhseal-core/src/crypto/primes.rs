//! # Primality
//!
//! Exact trial division for machine-sized candidates and Miller–Rabin for
//! big moduli, plus random prime generation of a fixed bit length.
//!
//! Finite-field moduli are safe primes `p = 2q + 1` with `q` prime, so the
//! only subgroups of `Z_p*` are `{1}`, `{1, p − 1}`, the order-`q` subgroup
//! and the whole group.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive, Zero};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Number of Miller–Rabin witnesses tried per big candidate.
///
/// Error probability is at most 4^-32 for a composite.
pub const MILLER_RABIN_ROUNDS: usize = 32;

/// Odd primes below 256, used to discard most composites before Miller–Rabin.
const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Decide whether `n` is prime by 6k±1 trial division up to √n.
///
/// Returns `false` for every `n < 2`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    let mut i: u64 = 5;
    while i.checked_mul(i).map_or(false, |square| square <= n) {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Probabilistic primality test for arbitrary-size candidates.
///
/// Values that fit in 32 bits are answered exactly by [`is_prime`].
pub fn is_probable_prime(n: &BigUint) -> bool {
    if let Some(small) = n.to_u32() {
        return is_prime(u64::from(small));
    }
    if !n.bit(0) {
        return false;
    }
    for p in SMALL_PRIMES {
        if (n % p).is_zero() {
            return false;
        }
    }

    miller_rabin(n, MILLER_RABIN_ROUNDS)
}

/// Generate a random prime with exactly `bits` bits.
///
/// The top bit is always set so the modulus width is exact; candidates are
/// drawn from the operating system RNG.
pub fn random_prime(bits: u64) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::InvalidDomainParameters(format!(
            "cannot generate a {}-bit prime",
            bits
        )));
    }

    let mut rng = OsRng;
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);

        if is_probable_prime(&candidate) {
            return Ok(candidate);
        }
    }
}

/// Whether `p` is a safe prime, i.e. `p` and `(p − 1) / 2` are both prime.
pub fn is_safe_prime(p: &BigUint) -> bool {
    if p < &BigUint::from(5u32) || !is_probable_prime(p) {
        return false;
    }
    let q: BigUint = (p - BigUint::one()) >> 1u32;
    is_probable_prime(&q)
}

/// Generate a random safe prime `p = 2q + 1` with exactly `bits` bits.
///
/// Needs `bits ≥ 3`; 5 and 7 are the only 3-bit safe primes.
pub fn random_safe_prime(bits: u64) -> Result<BigUint> {
    if bits < 3 {
        return Err(Error::InvalidDomainParameters(format!(
            "no safe prime has {} bits",
            bits
        )));
    }

    let mut rng = OsRng;
    loop {
        // q has bits − 1 bits, so 2q + 1 has exactly `bits`
        let mut q = rng.gen_biguint(bits - 1);
        q.set_bit(bits - 2, true);
        if bits > 3 {
            q.set_bit(0, true);
        }

        if q.bits() > 32 && !survives_safe_sieve(&q) {
            continue;
        }
        if !is_probable_prime(&q) {
            continue;
        }

        let p: BigUint = (&q << 1u32) + BigUint::one();
        if is_probable_prime(&p) {
            return Ok(p);
        }
    }
}

/// Cheap rejection before Miller–Rabin: neither `q` nor `2q + 1` may have a
/// small odd factor. `2q + 1 ≡ 0 (mod s)` exactly when `q ≡ (s − 1) / 2`.
fn survives_safe_sieve(q: &BigUint) -> bool {
    SMALL_PRIMES.iter().all(|&s| {
        let r = (q % s).to_u32().unwrap_or(0);
        r != 0 && r != (s - 1) / 2
    })
}

fn miller_rabin(n: &BigUint, rounds: usize) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;

    // n - 1 = d * 2^s with d odd
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let mut rng = OsRng;
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(5));
        assert!(!is_prime(9));
        assert!(!is_prime(25));
        assert!(!is_prime(49));
    }

    #[test]
    fn test_primes_below_300() {
        let primes: Vec<u64> = (0..300).filter(|&n| is_prime(n)).collect();

        assert_eq!(primes.len(), 62);
        assert_eq!(primes.first(), Some(&2));
        assert_eq!(primes.last(), Some(&293));
        assert!(primes.contains(&251));
        assert!(!primes.contains(&253)); // 11 * 23
    }

    #[test]
    fn test_matches_sieve_into_thousands() {
        const LIMIT: usize = 5000;
        let mut sieve = vec![true; LIMIT];
        sieve[0] = false;
        sieve[1] = false;
        for i in 2..LIMIT {
            if sieve[i] {
                for j in (i * i..LIMIT).step_by(i) {
                    sieve[j] = false;
                }
            }
        }

        for (n, &expected) in sieve.iter().enumerate() {
            assert_eq!(is_prime(n as u64), expected, "mismatch at {}", n);
        }
    }

    #[test]
    fn test_large_u64_values() {
        assert!(is_prime(1_000_000_007));
        assert!(!is_prime(1_000_000_007 * 3));
        assert!(!is_prime(u64::MAX));
    }

    #[test]
    fn test_probable_prime_agrees_with_trial_division() {
        for n in 0u32..3000 {
            assert_eq!(
                is_probable_prime(&BigUint::from(n)),
                is_prime(u64::from(n)),
                "mismatch at {}",
                n
            );
        }
    }

    #[test]
    fn test_probable_prime_big_values() {
        // 2^127 - 1 is a Mersenne prime
        let mersenne = (BigUint::one() << 127u32) - BigUint::one();
        assert!(is_probable_prime(&mersenne));

        // Carmichael number above the 32-bit fast path: 1171 * 2341 * 3511
        let carmichael = BigUint::from(9_624_742_921u64);
        assert!(!is_probable_prime(&carmichael));

        let composite = &mersenne * BigUint::from(3u32);
        assert!(!is_probable_prime(&composite));
    }

    #[test]
    fn test_random_prime_has_exact_width() {
        for bits in [8u64, 17, 64, 127, 251] {
            let p = random_prime(bits).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&p));
        }
    }

    #[test]
    fn test_random_prime_rejects_tiny_widths() {
        assert!(matches!(
            random_prime(1),
            Err(Error::InvalidDomainParameters(_))
        ));
        assert_eq!(random_prime(2).unwrap(), BigUint::from(3u32));
    }

    #[test]
    fn test_safe_prime_recognition() {
        for p in [5u32, 7, 11, 23, 47, 59, 83, 107, 167] {
            assert!(is_safe_prime(&BigUint::from(p)), "{} is safe", p);
        }
        // 13 = 2 * 6 + 1, 29 = 2 * 14 + 1, 31 = 2 * 15 + 1
        for p in [2u32, 3, 13, 29, 31, 21] {
            assert!(!is_safe_prime(&BigUint::from(p)), "{} is not safe", p);
        }
    }

    #[test]
    fn test_random_safe_prime_has_exact_width() {
        for bits in [3u64, 4, 5, 8, 17, 64, 128] {
            let p = random_safe_prime(bits).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_safe_prime(&p), "{} is not a safe prime", p);
        }
    }

    #[test]
    fn test_safe_prime_minus_one_has_no_small_odd_factor() {
        let p = random_safe_prime(96).unwrap();
        let p_minus_one = &p - BigUint::one();

        for s in SMALL_PRIMES {
            assert!(!(&p_minus_one % s).is_zero(), "{} divides p - 1", s);
        }
    }

    #[test]
    fn test_random_safe_prime_rejects_tiny_widths() {
        for bits in [0u64, 1, 2] {
            assert!(matches!(
                random_safe_prime(bits),
                Err(Error::InvalidDomainParameters(_))
            ));
        }
    }
}
