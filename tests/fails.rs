//! Highlights validation opportunities: malformed keys, tampered ciphertexts, tampered signatures.

use pqc_core::codec::{Class, ParameterSet, Primitive};
use pqc_core::kem::Kem;
use pqc_core::signer::Signer;
use pqc_core::types::{AsymmetricKey, CipherText};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_core::RngCore;

#[test]
fn malformed_public_key_length_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut bad = vec![0u8; ParameterSet::KyberK2.sizes().public_key_len - 1];
    rng.fill_bytes(&mut bad);
    assert!(AsymmetricKey::new(Primitive::Kyber, Class::Public, ParameterSet::KyberK2, bad).is_err());
}

#[test]
fn key_with_mismatched_primitive_is_rejected() {
    let bytes = vec![0u8; ParameterSet::KyberK2.sizes().public_key_len];
    let bad = AsymmetricKey::new(Primitive::Dilithium, Class::Public, ParameterSet::KyberK2, bytes);
    assert!(bad.is_err());
}

#[test]
fn tampered_ciphertext_does_not_decapsulate_to_the_original_secret() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let pair = Kem::generate(ParameterSet::KyberK3, &mut rng).unwrap();
    let (ct, ss) = Kem::encapsulate(&pair.public, &mut rng).unwrap();

    let mut tampered = ct.as_bytes().to_vec();
    tampered[0] ^= 0xFF;
    let tampered_ct = CipherText::new(tampered);

    // Implicit rejection (Sec 4.16): a tampered ciphertext is never reported as an error, it
    // silently decapsulates to a different, unusable secret.
    let bad_ss = Kem::decapsulate(&pair.private, &tampered_ct).unwrap();
    assert_ne!(ss, bad_ss);
}

#[test]
fn wrong_length_ciphertext_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let pair = Kem::generate(ParameterSet::KyberK3, &mut rng).unwrap();
    let short = CipherText::new(vec![0u8; 4]);
    assert!(Kem::decapsulate(&pair.private, &short).is_err());
}

#[test]
fn tampered_signature_fails_verification() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let pair = Signer::generate(ParameterSet::DilithiumS2, &mut rng).unwrap();
    let message = b"sign me";
    let mut sig = Signer::sign(&pair.private, message, &mut rng).unwrap().as_bytes().to_vec();
    sig[0] ^= 0x01;
    let tampered = pqc_core::types::Signature::new(sig);
    assert!(Signer::verify(&pair.public, message, &tampered).is_err());
}

#[test]
fn signature_does_not_verify_under_the_wrong_key() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let signer_a = Signer::generate(ParameterSet::DilithiumS1, &mut rng).unwrap();
    let signer_b = Signer::generate(ParameterSet::DilithiumS1, &mut rng).unwrap();
    let message = b"attributed to a";
    let sig = Signer::sign(&signer_a.private, message, &mut rng).unwrap();
    assert!(Signer::verify(&signer_b.public, message, &sig).is_err());
}
