//! # Channel Demo
//!
//! Walks through a full exchange between two parties:
//! 1. Search for a modulus size that yields a 32-byte secret
//! 2. Agree on a key over that modulus and seal a payload
//! 3. Do the same over X25519 with HKDF key derivation
//! 4. Show that tampering is detected
//!
//! ## Run
//!
//! ```bash
//! cargo run --example channel_demo
//! ```

use dhseal_core::crypto::KeyAgreement;
use dhseal_core::search::DEFAULT_START;
use dhseal_core::{
    find_prime_for_secret_length, ChannelConfig, DomainParameters, Error, KeyAgreementEngine,
    Payload, Session,
};

fn main() {
    println!("=== dhseal Core: Channel Demo ===\n");

    // =========================================================================
    // STEP 1: Parameter search
    // =========================================================================
    println!("Step 1: Searching prime lengths in [2, 300) for a 32-byte secret...");

    let found = find_prime_for_secret_length(32, DEFAULT_START, 300);
    for (bits, len) in &found {
        println!("  {}-bit modulus -> {}-byte secret", bits, len);
    }
    let bits = *found.keys().next().expect("no modulus found");
    println!();

    // =========================================================================
    // STEP 2: Finite-field exchange, secret used directly as the AES key
    // =========================================================================
    println!("Step 2: Finite-field exchange over a {}-bit prime...", bits);

    let params = DomainParameters::generate_finite_field(bits).expect("Failed to generate modulus");
    let engine = KeyAgreementEngine::new(params.clone()).expect("Failed to build engine");
    let sample = engine.generate_key_pair().expect("Failed to generate key pair");
    println!("  Sample public value: {}...", &sample.public_hex()[..16]);

    let config = ChannelConfig::interop();
    let alice = Session::new(params.clone(), &config).expect("Failed to create Alice's session");
    let bob = Session::new(params, &config).expect("Failed to create Bob's session");

    let alice_public = alice.public_value().to_vec();
    let alice_channel = alice.establish(bob.public_value()).expect("Alice failed to agree");
    let bob_channel = bob.establish(&alice_public).expect("Bob failed to agree");

    println!("  Alice key fingerprint: {}", alice_channel.fingerprint());
    println!("  Bob key fingerprint:   {}", bob_channel.fingerprint());

    let payload = alice_channel
        .seal(b"Data to be encrypted.")
        .expect("Encryption failed");
    println!("  Payload ({} chars): {}", payload.len(), payload.as_str().unwrap_or("<binary>"));

    let opened = bob_channel.open(&payload).expect("Decryption failed");
    println!("  Bob reads: {}", String::from_utf8_lossy(&opened));
    println!();

    // =========================================================================
    // STEP 3: X25519 with HKDF
    // =========================================================================
    println!("Step 3: X25519 exchange with HKDF-SHA256 key derivation...");

    let params = DomainParameters::curve("x25519").expect("Unknown curve");
    let config = ChannelConfig::default();
    let alice = Session::new(params.clone(), &config).expect("Failed to create Alice's session");
    let bob = Session::new(params, &config).expect("Failed to create Bob's session");

    let alice_public = alice.public_value().to_vec();
    let alice_channel = alice.establish(bob.public_value()).expect("Alice failed to agree");
    let bob_channel = bob.establish(&alice_public).expect("Bob failed to agree");

    let payload = bob_channel.seal(b"Hello over X25519").expect("Encryption failed");
    let opened = alice_channel.open(&payload).expect("Decryption failed");
    println!("  Alice reads: {}", String::from_utf8_lossy(&opened));
    println!();

    // =========================================================================
    // STEP 4: Tampering
    // =========================================================================
    println!("Step 4: Flipping one ciphertext byte...");

    let mut bytes = payload.into_bytes();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x01;

    match alice_channel.open(&Payload::from(bytes)) {
        Err(Error::AuthenticationFailure) => println!("  Rejected: authentication failed"),
        other => println!("  Unexpected result: {:?}", other),
    }

    println!("\n=== Demo Complete ===");
}
