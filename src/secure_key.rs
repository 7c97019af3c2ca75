//! Secure key container (§4.15): a polynomial held encrypted at rest, decrypted only
//! transiently into a caller-supplied scoped buffer.
//!
//! The process-local "system key" is derived by cSHAKE over stable process identifiers plus a
//! caller-supplied salt. Under `std` this draws on `std::process::id()` and environment
//! variables; under `alloc`-only builds no such identifiers exist, so the derivation falls back
//! to the salt alone (see DESIGN.md's Open Question resolution for this module). Unlike every
//! other primitive in this crate, the stream cipher here is `chacha20`, not the sponge — the
//! one deliberate exception the distilled specification already calls out.

use crate::codec::{Class, ParameterSet, Primitive};
use crate::domain::ct_eq;
use crate::error::{Error, Result};
use crate::sponge::cshake;
use crate::types::AsymmetricKey;
use alloc::vec::Vec;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use zeroize::Zeroize;

/// Selects the cSHAKE absorption rate used to derive the system key, and whether an integrity
/// tag is appended. Higher rates cost more permutation calls per derivation; callers with no
/// particular threat model should use [`SecurityPolicy::Standard`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecurityPolicy {
    /// cSHAKE at the 256-bit-security rate, no integrity tag.
    Standard,
    /// cSHAKE at the 512-bit-security rate, with an appended integrity tag.
    High,
}

impl SecurityPolicy {
    fn rate(self) -> usize {
        match self {
            SecurityPolicy::Standard => 136,
            SecurityPolicy::High => 72,
        }
    }

    fn append_tag(self) -> bool {
        matches!(self, SecurityPolicy::High)
    }
}

#[cfg(feature = "std")]
fn process_identity() -> Vec<u8> {
    let mut ident = Vec::new();
    ident.extend_from_slice(&std::process::id().to_le_bytes());
    if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("COMPUTERNAME")) {
        ident.extend_from_slice(user.as_bytes());
    }
    ident.extend_from_slice(std::env::consts::OS.as_bytes());
    ident
}

#[cfg(not(feature = "std"))]
fn process_identity() -> Vec<u8> {
    Vec::new()
}

fn derive_key_nonce(salt: &[u8], rate: usize) -> ([u8; 32], [u8; 12]) {
    let ident = process_identity();
    let mut xof = cshake(rate, b"AsymmetricSecureKey", salt, &ident);
    let mut out = [0u8; 44];
    xof.read(&mut out);
    let mut key = [0u8; 32];
    let mut nonce = [0u8; 12];
    key.copy_from_slice(&out[..32]);
    nonce.copy_from_slice(&out[32..44]);
    (key, nonce)
}

fn compute_tag(key: &[u8; 32], ciphertext: &[u8]) -> [u8; 16] {
    let mut xof = cshake(136, b"AsymmetricSecureKeyTag", &[], &[key.as_slice(), ciphertext].concat());
    let mut tag = [0u8; 16];
    xof.read(&mut tag);
    tag
}

/// A polynomial sealed under a process-derived key. The plaintext never exists except
/// momentarily inside [`AsymmetricSecureKey::secure_polynomial`]'s output buffer.
#[derive(Clone)]
pub struct AsymmetricSecureKey {
    primitive: Primitive,
    class: Class,
    parameters: ParameterSet,
    policy: SecurityPolicy,
    salt: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Option<[u8; 16]>,
}

impl Drop for AsymmetricSecureKey {
    fn drop(&mut self) {
        self.ciphertext.zeroize();
    }
}

impl AsymmetricSecureKey {
    /// Encrypt `key`'s polynomial under the system key derived with `policy` and `salt`.
    #[must_use]
    pub fn seal(key: &AsymmetricKey, policy: SecurityPolicy, salt: &[u8]) -> Self {
        let (k, n) = derive_key_nonce(salt, policy.rate());
        let mut cipher = ChaCha20::new(&k.into(), &n.into());
        let mut ciphertext = key.as_bytes().to_vec();
        cipher.apply_keystream(&mut ciphertext);
        let tag = policy.append_tag().then(|| compute_tag(&k, &ciphertext));
        AsymmetricSecureKey {
            primitive: key.primitive(),
            class: key.class(),
            parameters: key.parameters(),
            policy,
            salt: salt.to_vec(),
            ciphertext,
            tag,
        }
    }

    /// Decrypt the polynomial into `out`, which is cleared and resized to fit.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] if a policy-mandated integrity tag does not verify.
    pub fn secure_polynomial(&self, out: &mut Vec<u8>) -> Result<()> {
        let (k, n) = derive_key_nonce(&self.salt, self.policy.rate());
        if let Some(expected) = self.tag {
            let actual = compute_tag(&k, &self.ciphertext);
            if !ct_eq(&expected, &actual) {
                return Err(Error::InvalidKey);
            }
        }
        out.clear();
        out.extend_from_slice(&self.ciphertext);
        let mut cipher = ChaCha20::new(&k.into(), &n.into());
        cipher.apply_keystream(out);
        Ok(())
    }

    /// Recover a plain [`AsymmetricKey`], consuming this container.
    ///
    /// # Errors
    /// Returns [`Error::InvalidKey`] if the integrity tag does not verify, or if the decrypted
    /// length disagrees with the parameter set's declared size.
    pub fn unseal(&self) -> Result<AsymmetricKey> {
        let mut plaintext = Vec::new();
        self.secure_polynomial(&mut plaintext)?;
        AsymmetricKey::new(self.primitive, self.class, self.parameters, plaintext)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn seal_and_unseal_round_trips() {
        let len = ParameterSet::KyberK2.sizes().public_key_len;
        let key =
            AsymmetricKey::new(Primitive::Kyber, Class::Public, ParameterSet::KyberK2, vec![9u8; len])
                .unwrap();
        let sealed = AsymmetricSecureKey::seal(&key, SecurityPolicy::Standard, b"salt");
        let recovered = sealed.unseal().unwrap();
        assert_eq!(recovered.as_bytes(), key.as_bytes());
    }

    #[test]
    fn high_policy_detects_tampering() {
        let len = ParameterSet::KyberK2.sizes().public_key_len;
        let key =
            AsymmetricKey::new(Primitive::Kyber, Class::Public, ParameterSet::KyberK2, vec![3u8; len])
                .unwrap();
        let mut sealed = AsymmetricSecureKey::seal(&key, SecurityPolicy::High, b"salt");
        sealed.ciphertext[0] ^= 1;
        assert!(sealed.unseal().is_err());
    }

    #[test]
    fn different_salts_give_different_ciphertexts() {
        let len = ParameterSet::KyberK2.sizes().public_key_len;
        let key =
            AsymmetricKey::new(Primitive::Kyber, Class::Public, ParameterSet::KyberK2, vec![5u8; len])
                .unwrap();
        let a = AsymmetricSecureKey::seal(&key, SecurityPolicy::Standard, b"salt-a");
        let b = AsymmetricSecureKey::seal(&key, SecurityPolicy::Standard, b"salt-b");
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
