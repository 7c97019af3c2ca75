//! The crate's top-level data model (§3): tagged keys, key pairs, ciphertexts and shared
//! secrets. Scheme modules work with fixed-size arrays internally; this layer is where those
//! arrays get boxed into a uniform, enum-dispatchable shape for the `Kem`/`Signer` façades.

use crate::codec::{Class, ParameterSet, Primitive};
use crate::error::{Error, Result};
use alloc::vec::Vec;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A tagged polynomial bundle: the scheme, which half of the key pair, the parameter set, and
/// the opaque key bytes themselves. Zeroises its bytes on drop regardless of `class`, since the
/// cost of doing so for a public key is negligible and it removes a class of "forgot to check"
/// bugs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AsymmetricKey {
    #[zeroize(skip)]
    primitive: Primitive,
    #[zeroize(skip)]
    class: Class,
    #[zeroize(skip)]
    parameters: ParameterSet,
    bytes: Vec<u8>,
}

impl AsymmetricKey {
    /// Construct a key, validating that `bytes.len()` matches the parameter set's declared size
    /// for `(primitive, parameters, class)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] on a length mismatch.
    pub fn new(
        primitive: Primitive, class: Class, parameters: ParameterSet, bytes: Vec<u8>,
    ) -> Result<Self> {
        let sizes = parameters.sizes();
        let expected = match class {
            Class::Public => sizes.public_key_len,
            Class::Private => sizes.private_key_len,
        };
        if bytes.len() != expected || parameters.primitive() != primitive {
            return Err(Error::InvalidKey);
        }
        Ok(AsymmetricKey { primitive, class, parameters, bytes })
    }

    #[must_use]
    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    #[must_use]
    pub fn class(&self) -> Class {
        self.class
    }

    #[must_use]
    pub fn parameters(&self) -> ParameterSet {
        self.parameters
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check this key's `(primitive, parameters, class)` against what an operation expects.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] on any mismatch.
    pub fn expect(&self, primitive: Primitive, parameters: ParameterSet, class: Class) -> Result<()> {
        if self.primitive != primitive || self.parameters != parameters || self.class != class {
            return Err(Error::InvalidKey);
        }
        Ok(())
    }
}

/// A pair of keys sharing one primitive and parameter set. The public half may be distributed;
/// the private half never is.
pub struct KeyPair {
    pub public: AsymmetricKey,
    pub private: AsymmetricKey,
}

/// Fixed-length opaque secret output of a KEM. Constant-time equality; zeroises on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        SharedSecret(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && bool::from(self.0.ct_eq(&other.0))
    }
}
impl Eq for SharedSecret {}

/// Opaque ciphertext. Its internal structure is scheme-specific and never exposed (§3).
#[derive(Clone)]
pub struct CipherText(Vec<u8>);

impl CipherText {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        CipherText(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A signature over some message. Opaque bytes; scheme-specific internal structure.
#[derive(Clone)]
pub struct Signature(Vec<u8>);

impl Signature {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Signature(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn key_length_mismatch_is_rejected() {
        let bad = AsymmetricKey::new(Primitive::Kyber, Class::Public, ParameterSet::KyberK2, vec![0u8; 3]);
        assert!(bad.is_err());
    }

    #[test]
    fn key_of_correct_length_is_accepted() {
        let ok = AsymmetricKey::new(
            Primitive::Kyber,
            Class::Public,
            ParameterSet::KyberK2,
            vec![0u8; ParameterSet::KyberK2.sizes().public_key_len],
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn shared_secret_constant_time_eq() {
        let a = SharedSecret::new(vec![1, 2, 3]);
        let b = SharedSecret::new(vec![1, 2, 3]);
        let c = SharedSecret::new(vec![1, 2, 4]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
