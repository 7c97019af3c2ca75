//! A deterministic, SHAKE-expanded random source seeded from OS entropy.
//!
//! This is the crate's one environment dependency (§6): everything else is pure computation
//! over caller-supplied bytes. `Prng` is never rekeyed mid-generation — callers wanting two
//! independent draws reseed explicitly, matching the one-shot nature of `rand_core::CryptoRng`.

use crate::error::{Error, Result};
use crate::sponge::{shake256, Xof};
use rand_core::{CryptoRng, RngCore};

/// A SHAKE256 stream keyed from a 32-byte seed, exposed as an `rand_core::RngCore`.
pub struct Prng {
    xof: Xof,
}

impl Prng {
    /// Seed directly from a caller-supplied 32-byte value (used by deterministic tests and by
    /// KATs that pin the seed literally — see scenarios S-1..S-5).
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Prng { xof: shake256(&seed) }
    }

    /// Draw a fresh 32-byte seed from `rng` (expected to be OS-backed) and key a new stream.
    ///
    /// # Errors
    /// Returns [`Error::EntropyUnavailable`] if the source cannot fill the seed buffer.
    pub fn from_os_rng(rng: &mut (impl RngCore + CryptoRng)) -> Result<Self> {
        let mut seed = [0u8; 32];
        rng.try_fill_bytes(&mut seed).map_err(|_| Error::EntropyUnavailable)?;
        Ok(Self::from_seed(seed))
    }

    /// Fill `buf` with the next `buf.len()` pseudorandom bytes.
    pub fn fill(&mut self, buf: &mut [u8]) {
        self.xof.read(buf);
    }

    /// Draw the next 4 bytes as a little-endian `u32`.
    #[must_use]
    pub fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::from_seed([7u8; 32]);
        let mut b = Prng::from_seed([7u8; 32]);
        let (mut oa, mut ob) = ([0u8; 40], [0u8; 40]);
        a.fill(&mut oa);
        b.fill(&mut ob);
        assert_eq!(oa, ob);
    }

    #[test]
    fn different_seed_different_stream() {
        let mut a = Prng::from_seed([7u8; 32]);
        let mut b = Prng::from_seed([8u8; 32]);
        let (mut oa, mut ob) = ([0u8; 40], [0u8; 40]);
        a.fill(&mut oa);
        b.fill(&mut ob);
        assert_ne!(oa, ob);
    }
}
