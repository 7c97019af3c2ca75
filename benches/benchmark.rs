use criterion::{criterion_group, criterion_main, Criterion};
use pqc_core::codec::ParameterSet;
use pqc_core::kem::Kem;
use pqc_core::signer::Signer;
use rand_core::{CryptoRng, RngCore};

/// Test RNG to regurgitate incremented values when 'asked'.
struct TestRng {
    value: u32,
}

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        out.iter_mut().for_each(|b| *b = 0);
        out[0..4].copy_from_slice(&self.value.to_be_bytes());
        self.value = self.value.wrapping_add(1);
        Ok(())
    }
}

impl CryptoRng for TestRng {}

#[allow(clippy::redundant_closure)]
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = TestRng { value: 0 };

    for (label, ps) in [
        ("kyber-k2", ParameterSet::KyberK2),
        ("kyber-k3", ParameterSet::KyberK3),
        ("kyber-k4", ParameterSet::KyberK4),
        ("ntrup653", ParameterSet::NtruPrime653),
        ("ntrup761", ParameterSet::NtruPrime761),
        ("ntrup857", ParameterSet::NtruPrime857),
    ] {
        let pair = Kem::generate(ps, &mut rng).unwrap();
        let (ct, _) = Kem::encapsulate(&pair.public, &mut rng).unwrap();

        c.bench_function(&format!("{label} KeyGen"), |b| b.iter(|| Kem::generate(ps, &mut rng)));
        c.bench_function(&format!("{label} Encaps"), |b| {
            b.iter(|| Kem::encapsulate(&pair.public, &mut rng))
        });
        c.bench_function(&format!("{label} Decaps"), |b| {
            b.iter(|| Kem::decapsulate(&pair.private, &ct))
        });
    }

    for (label, ps) in [
        ("dilithium-s1", ParameterSet::DilithiumS1),
        ("dilithium-s2", ParameterSet::DilithiumS2),
        ("dilithium-s3", ParameterSet::DilithiumS3),
    ] {
        let pair = Signer::generate(ps, &mut rng).unwrap();
        let message = b"benchmark message";
        let sig = Signer::sign(&pair.private, message, &mut rng).unwrap();

        c.bench_function(&format!("{label} KeyGen"), |b| b.iter(|| Signer::generate(ps, &mut rng)));
        c.bench_function(&format!("{label} Sign"), |b| {
            b.iter(|| Signer::sign(&pair.private, message, &mut rng))
        });
        c.bench_function(&format!("{label} Verify"), |b| {
            b.iter(|| Signer::verify(&pair.public, message, &sig))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
