use pqc_core::codec::ParameterSet;
use pqc_core::kem::Kem;
use pqc_core::signer::Signer;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn kem_round_trip_matches_for_every_kyber_parameter_set() {
    let mut rng = ChaCha8Rng::seed_from_u64(123);
    for ps in [ParameterSet::KyberK2, ParameterSet::KyberK3, ParameterSet::KyberK4] {
        for _ in 0..10 {
            let pair = Kem::generate(ps, &mut rng).unwrap();
            let (ct, bob_ss) = Kem::encapsulate(&pair.public, &mut rng).unwrap();
            let alice_ss = Kem::decapsulate(&pair.private, &ct).unwrap();
            assert_eq!(bob_ss, alice_ss);
        }
    }
}

#[test]
fn kem_round_trip_matches_for_every_ntru_prime_parameter_set() {
    let mut rng = ChaCha8Rng::seed_from_u64(456);
    for ps in [ParameterSet::NtruPrime653, ParameterSet::NtruPrime761, ParameterSet::NtruPrime857] {
        let pair = Kem::generate(ps, &mut rng).unwrap();
        let (ct, ss1) = Kem::encapsulate(&pair.public, &mut rng).unwrap();
        let ss2 = Kem::decapsulate(&pair.private, &ct).unwrap();
        assert_eq!(ss1, ss2);
    }
}

#[test]
fn signer_round_trip_matches_for_every_dilithium_parameter_set() {
    let mut rng = ChaCha8Rng::seed_from_u64(789);
    for ps in [ParameterSet::DilithiumS1, ParameterSet::DilithiumS2, ParameterSet::DilithiumS3] {
        let pair = Signer::generate(ps, &mut rng).unwrap();
        let message = b"the quick brown fox jumps over the lazy dog";
        let sig = Signer::sign(&pair.private, message, &mut rng).unwrap();
        assert!(Signer::verify(&pair.public, message, &sig).is_ok());
    }
}

#[test]
fn signer_round_trip_matches_for_sphincs_s128() {
    let mut rng = ChaCha8Rng::seed_from_u64(101_112);
    let pair = Signer::generate(ParameterSet::SphincsS128Shake, &mut rng).unwrap();
    let message = b"sphincs integration message";
    let sig = Signer::sign(&pair.private, message, &mut rng).unwrap();
    assert!(Signer::verify(&pair.public, message, &sig).is_ok());
}

#[test]
fn wrong_party_ciphertext_never_authenticates_the_wrong_secret() {
    let mut rng = ChaCha8Rng::seed_from_u64(222);
    let alice = Kem::generate(ParameterSet::KyberK3, &mut rng).unwrap();
    let mallory = Kem::generate(ParameterSet::KyberK3, &mut rng).unwrap();

    let (ct, alice_ss) = Kem::encapsulate(&alice.public, &mut rng).unwrap();
    let mallory_ss = Kem::decapsulate(&mallory.private, &ct).unwrap();

    assert_ne!(alice_ss, mallory_ss);
}
