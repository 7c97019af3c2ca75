//! `Signer` façade (§4.13): the single entry point for the two signature primitives
//! (SPHINCS+-SHAKE, Dilithium), dispatching by `ParameterSet::primitive()` and validating every
//! key against its declared `(primitive, parameters, class)` before forwarding.

use crate::codec::{Class, ParameterSet, Primitive};
use crate::dilithium;
use crate::error::{Error, Result};
use crate::sphincs;
use crate::types::{AsymmetricKey, KeyPair, Signature};
use rand_core::{CryptoRng, RngCore};

/// Signature operations, dispatched over [`ParameterSet::primitive()`].
pub struct Signer;

impl Signer {
    /// Generate a fresh key pair for `ps`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `ps` does not belong to a signature primitive.
    pub fn generate(ps: ParameterSet, rng: &mut (impl RngCore + CryptoRng)) -> Result<KeyPair> {
        let (pk, sk) = match ps.primitive() {
            Primitive::Sphincs => sphincs::generate(ps, rng)?,
            Primitive::Dilithium => dilithium::generate(ps, rng)?,
            Primitive::Kyber | Primitive::NtruPrime | Primitive::McEliece => {
                return Err(Error::InvalidParameter)
            }
        };
        Ok(KeyPair {
            public: AsymmetricKey::new(ps.primitive(), Class::Public, ps, pk)?,
            private: AsymmetricKey::new(ps.primitive(), Class::Private, ps, sk)?,
        })
    }

    /// Sign `message` under `sk`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] if `sk` is not a private key of a signature primitive.
    pub fn sign(
        sk: &AsymmetricKey, message: &[u8], rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Signature> {
        sk.expect(sk.primitive(), sk.parameters(), Class::Private)?;
        let ps = sk.parameters();
        let sig = match ps.primitive() {
            Primitive::Sphincs => sphincs::sign(ps, sk.as_bytes(), message, rng)?,
            Primitive::Dilithium => dilithium::sign(ps, sk.as_bytes(), message, rng)?,
            Primitive::Kyber | Primitive::NtruPrime | Primitive::McEliece => {
                return Err(Error::InvalidKey)
            }
        };
        Ok(Signature::new(sig))
    }

    /// Verify `sig` over `message` under `pk`. The only observable outcome of a mismatch is
    /// [`Error::VerifyFailed`] - no sub-reason is ever surfaced (§4.16).
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] if `pk` is not a public key of a signature primitive, or
    /// [`Error::VerifyFailed`] if the signature does not authenticate.
    pub fn verify(pk: &AsymmetricKey, message: &[u8], sig: &Signature) -> Result<()> {
        pk.expect(pk.primitive(), pk.parameters(), Class::Public)?;
        let ps = pk.parameters();
        match ps.primitive() {
            Primitive::Sphincs => sphincs::verify(ps, pk.as_bytes(), message, sig.as_bytes()),
            Primitive::Dilithium => dilithium::verify(ps, pk.as_bytes(), message, sig.as_bytes()),
            Primitive::Kyber | Primitive::NtruPrime | Primitive::McEliece => Err(Error::InvalidKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn round_trips_for_dilithium() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for ps in [ParameterSet::DilithiumS1, ParameterSet::DilithiumS2, ParameterSet::DilithiumS3] {
            let pair = Signer::generate(ps, &mut rng).unwrap();
            let sig = Signer::sign(&pair.private, b"message", &mut rng).unwrap();
            assert!(Signer::verify(&pair.public, b"message", &sig).is_ok());
            assert!(Signer::verify(&pair.public, b"tampered", &sig).is_err());
        }
    }

    #[test]
    fn round_trips_for_sphincs() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let pair = Signer::generate(ParameterSet::SphincsS128Shake, &mut rng).unwrap();
        let sig = Signer::sign(&pair.private, b"message", &mut rng).unwrap();
        assert!(Signer::verify(&pair.public, b"message", &sig).is_ok());
    }

    #[test]
    fn rejects_kem_parameter_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(Signer::generate(ParameterSet::KyberK2, &mut rng).is_err());
    }
}
