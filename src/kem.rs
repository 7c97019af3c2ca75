//! `Kem` façade (§4.13): the single entry point external callers use for the three KEM
//! primitives (Kyber, NTRU Prime Streamlined, Classic McEliece), dispatching by
//! `ParameterSet::primitive()` and validating every key against its declared
//! `(primitive, parameters, class)` before forwarding to the scheme module.

use crate::codec::{Class, ParameterSet, Primitive};
use crate::error::{Error, Result};
use crate::kyber;
use crate::mceliece;
use crate::ntru_prime;
use crate::types::{AsymmetricKey, CipherText, KeyPair, SharedSecret};
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};

/// Key-encapsulation operations, dispatched over [`ParameterSet::primitive()`].
pub struct Kem;

impl Kem {
    /// Generate a fresh key pair for `ps`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `ps` does not belong to a KEM primitive, or
    /// [`Error::InternalInvariant`] if a bounded-retry scheme (Classic McEliece) exhausts its
    /// retry budget.
    pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> Result<KeyPair> {
        let (pk, sk) = match ps.primitive() {
            Primitive::Kyber => kyber::generate(ps, rng),
            Primitive::NtruPrime => ntru_prime::generate(ps, rng),
            Primitive::McEliece => mceliece::generate(ps, rng)?,
            Primitive::Sphincs | Primitive::Dilithium => return Err(Error::InvalidParameter),
        };
        Ok(KeyPair {
            public: AsymmetricKey::new(ps.primitive(), Class::Public, ps, pk)?,
            private: AsymmetricKey::new(ps.primitive(), Class::Private, ps, sk)?,
        })
    }

    /// Encapsulate a fresh shared secret to `pk`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] if `pk` is not a public key of a KEM primitive.
    pub fn encapsulate(
        pk: &AsymmetricKey, rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(CipherText, SharedSecret)> {
        pk.expect(pk.primitive(), pk.parameters(), Class::Public)?;
        let ps = pk.parameters();
        let (ct, ss) = match ps.primitive() {
            Primitive::Kyber => kyber::encapsulate(ps, pk.as_bytes(), rng)?,
            Primitive::NtruPrime => ntru_prime::encapsulate(ps, pk.as_bytes(), rng)?,
            Primitive::McEliece => mceliece::encapsulate(ps, pk.as_bytes(), rng)?,
            Primitive::Sphincs | Primitive::Dilithium => return Err(Error::InvalidKey),
        };
        Ok((CipherText::new(ct), SharedSecret::new(ss)))
    }

    /// Decapsulate `ct` under `sk`, recovering the shared secret that [`Kem::encapsulate`]
    /// produced. Implicit rejection (§4.16) means a tampered ciphertext never surfaces as an
    /// error here - it silently yields an unusable secret, by construction of the underlying
    /// scheme.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] if `sk` is not a private key of a KEM primitive, or
    /// [`Error::InvalidCiphertext`] if `ct`'s length does not match the parameter set.
    pub fn decapsulate(sk: &AsymmetricKey, ct: &CipherText) -> Result<SharedSecret> {
        sk.expect(sk.primitive(), sk.parameters(), Class::Private)?;
        let ps = sk.parameters();
        let ss: Vec<u8> = match ps.primitive() {
            Primitive::Kyber => kyber::decapsulate(ps, sk.as_bytes(), ct.as_bytes())?,
            Primitive::NtruPrime => ntru_prime::decapsulate(ps, sk.as_bytes(), ct.as_bytes())?,
            Primitive::McEliece => mceliece::decapsulate(ps, sk.as_bytes(), ct.as_bytes())?,
            Primitive::Sphincs | Primitive::Dilithium => return Err(Error::InvalidKey),
        };
        Ok(SharedSecret::new(ss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn round_trip(ps: ParameterSet) {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let pair = Kem::generate(ps, &mut rng).unwrap();
        let (ct, ss1) = Kem::encapsulate(&pair.public, &mut rng).unwrap();
        let ss2 = Kem::decapsulate(&pair.private, &ct).unwrap();
        assert_eq!(ss1, ss2);
    }

    #[test]
    fn round_trips_for_every_kem_parameter_set() {
        for ps in [
            ParameterSet::KyberK2,
            ParameterSet::KyberK3,
            ParameterSet::KyberK4,
            ParameterSet::NtruPrime653,
            ParameterSet::NtruPrime761,
            ParameterSet::NtruPrime857,
        ] {
            round_trip(ps);
        }
    }

    #[test]
    fn rejects_signature_parameter_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(Kem::generate(ParameterSet::DilithiumS1, &mut rng).is_err());
    }
}
